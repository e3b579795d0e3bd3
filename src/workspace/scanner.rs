//! GOPATH scanning.
//!
//! Walks every `$GOPATH/src` tree and reports each directory that holds at
//! least one `.go` file as a package. Anything under `$GOROOT` is skipped.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::{import_path_for, PackageSource};
use crate::domain::Package;
use crate::error::EnumerateError;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["testdata", "node_modules"];

/// All packages installed under the GOPATH source roots.
#[derive(Debug, Clone)]
pub struct GopathScan {
    roots: Vec<PathBuf>,
    goroot: Option<PathBuf>,
}

impl GopathScan {
    pub fn new(roots: Vec<PathBuf>, goroot: Option<PathBuf>) -> Self {
        Self { roots, goroot }
    }
}

impl PackageSource for GopathScan {
    fn describe(&self) -> String {
        "all Go packages in GOPATH".to_string()
    }

    fn list(&self) -> Result<Vec<Package>, EnumerateError> {
        let mut seen = HashSet::new();
        let mut packages = Vec::new();

        for root in &self.roots {
            for package in scan_root(root, self.goroot.as_deref())? {
                // Earlier GOPATH entries shadow later ones.
                if seen.insert(package.import_path().to_string()) {
                    packages.push(package);
                }
            }
        }

        debug!("Found {} packages in GOPATH", packages.len());
        Ok(packages)
    }

    fn supports_update(&self) -> bool {
        true
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.starts_with('_') || SKIPPED_DIRS.contains(&name.as_ref())
}

/// Scan one `src` directory.
pub fn scan_root(root: &Path, goroot: Option<&Path>) -> Result<Vec<Package>, EnumerateError> {
    std::fs::read_dir(root).map_err(|source| EnumerateError::UnreadableRoot {
        path: root.to_path_buf(),
        source,
    })?;

    debug!("Scanning GOPATH root: {}", root.display());

    let mut dirs = BTreeSet::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_skipped(e) && !goroot.is_some_and(|g| e.path().starts_with(g)));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(EnumerateError::Walk {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                warn!("Error walking directory: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "go") {
            if let Some(parent) = path.parent() {
                dirs.insert(parent.to_path_buf());
            }
        }
    }

    Ok(dirs
        .into_iter()
        .filter_map(|dir| {
            let import_path = import_path_for(root, &dir)?;
            Some(Package::new(import_path, Some(dir)))
        })
        .collect())
}
