//! Package sources other than a full GOPATH scan: a newline separated list
//! read from a stream, and the `Godeps.json` / govendor `vendor.json`
//! dependency manifests.

use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use super::{resolve_dir, PackageSource};
use crate::domain::Package;
use crate::error::EnumerateError;

/// A fixed package list, read once up front (stdin can only be read once).
#[derive(Debug, Clone)]
pub struct PackageList {
    packages: Vec<Package>,
}

impl PackageList {
    /// Read newline separated import paths, resolving each against the
    /// GOPATH source roots. Blank lines and `#` comments are ignored.
    pub fn from_reader<R: Read>(reader: R, roots: &[PathBuf]) -> Result<Self, EnumerateError> {
        let mut packages = Vec::new();
        for line in BufReader::new(reader).lines() {
            let line = line?;
            let import_path = line.trim();
            if import_path.is_empty() || import_path.starts_with('#') {
                continue;
            }
            packages.push(Package::new(import_path, resolve_dir(roots, import_path)));
        }
        debug!("Read {} packages from input", packages.len());
        Ok(Self { packages })
    }
}

impl PackageSource for PackageList {
    fn describe(&self) -> String {
        "newline separated Go packages from stdin".to_string()
    }

    fn list(&self) -> Result<Vec<Package>, EnumerateError> {
        Ok(self.packages.clone())
    }

    fn supports_update(&self) -> bool {
        true
    }
}

/// `Godeps.json` as written by godep.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Godeps {
    #[serde(default)]
    deps: Vec<GodepsDependency>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GodepsDependency {
    import_path: String,
    rev: Option<String>,
}

/// `vendor.json` as written by govendor.
#[derive(Debug, Deserialize)]
struct Govendor {
    #[serde(default)]
    package: Vec<GovendorPackage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GovendorPackage {
    path: String,
    revision: Option<String>,
}

/// Which manifest format a [`ManifestSource`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Godeps,
    Govendor,
}

/// Packages listed in a dependency manifest, with their pinned revisions.
///
/// Manifest-driven workspaces are not updated through the package manager,
/// so this source reports no update support.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    kind: ManifestKind,
    path: PathBuf,
    roots: Vec<PathBuf>,
}

impl ManifestSource {
    pub fn new(kind: ManifestKind, path: impl Into<PathBuf>, roots: Vec<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            roots,
        }
    }
}

impl PackageSource for ManifestSource {
    fn describe(&self) -> String {
        let name = match self.kind {
            ManifestKind::Godeps => "Godeps.json",
            ManifestKind::Govendor => "vendor.json",
        };
        format!("Go packages from {} file {}", name, self.path.display())
    }

    fn list(&self) -> Result<Vec<Package>, EnumerateError> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|source| EnumerateError::ManifestIo {
                path: self.path.clone(),
                source,
            })?;

        let entries = parse_manifest(self.kind, &content).map_err(|source| {
            EnumerateError::Manifest {
                path: self.path.clone(),
                source,
            }
        })?;

        Ok(entries
            .into_iter()
            .map(|(import_path, rev)| {
                let dir = resolve_dir(&self.roots, &import_path);
                let package = Package::new(import_path, dir);
                match rev {
                    Some(rev) if !rev.is_empty() => package.with_pinned_rev(rev),
                    _ => package,
                }
            })
            .collect())
    }

    fn supports_update(&self) -> bool {
        false
    }
}

/// Import paths and pinned revisions listed in a manifest.
fn parse_manifest(
    kind: ManifestKind,
    content: &str,
) -> Result<Vec<(String, Option<String>)>, serde_json::Error> {
    match kind {
        ManifestKind::Godeps => {
            let godeps: Godeps = serde_json::from_str(content)?;
            Ok(godeps
                .deps
                .into_iter()
                .map(|d| (d.import_path, d.rev))
                .collect())
        }
        ManifestKind::Govendor => {
            let govendor: Govendor = serde_json::from_str(content)?;
            Ok(govendor
                .package
                .into_iter()
                .map(|p| (p.path, p.revision))
                .collect())
        }
    }
}
