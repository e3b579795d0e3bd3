//! Domain types shared across modules.
//!
//! Packages come out of the enumerator, repositories out of the grouper,
//! and both flow through the status pass and into the presenters.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Version-control state of a checkout, filled in once per status pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcsState {
    /// Currently checked-out branch (`HEAD` when detached)
    pub branch: String,
    /// Branch the remote considers its default
    pub default_branch: String,
    /// Working tree has uncommitted changes
    pub dirty: bool,
    pub local_rev: String,
    pub remote_rev: String,
    /// URL of the `origin` remote, if any
    pub remote_url: Option<String>,
}

impl VcsState {
    pub fn on_default_branch(&self) -> bool {
        !self.branch.is_empty() && self.branch == self.default_branch
    }
}

/// A single installed package.
#[derive(Debug, Clone)]
pub struct Package {
    import_path: String,
    /// Directory holding the package sources, when it exists locally
    pub dir: Option<PathBuf>,
    /// Revision pinned by a dependency manifest; replaces the checked-out
    /// revision during the status pass
    pub pinned_rev: Option<String>,
    /// `None` until the first status pass
    pub vcs: Option<VcsState>,
}

impl Package {
    pub fn new(import_path: impl Into<String>, dir: Option<PathBuf>) -> Self {
        Self {
            import_path: import_path.into(),
            dir,
            pinned_rev: None,
            vcs: None,
        }
    }

    pub fn with_pinned_rev(mut self, rev: impl Into<String>) -> Self {
        self.pinned_rev = Some(rev.into());
        self
    }

    pub fn import_path(&self) -> &str {
        &self.import_path
    }
}

/// A repository root and the packages that live beneath it.
///
/// Never empty; the first package is the representative whose VCS state
/// stands for the whole repository.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    packages: Vec<Package>,
}

impl Repository {
    /// Returns `None` when `packages` is empty.
    pub fn new(root: PathBuf, packages: Vec<Package>) -> Option<Self> {
        if packages.is_empty() {
            return None;
        }
        Some(Self { root, packages })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn representative(&self) -> &Package {
        &self.packages[0]
    }

    pub fn representative_mut(&mut self) -> &mut Package {
        &mut self.packages[0]
    }

    pub fn vcs(&self) -> Option<&VcsState> {
        self.representative().vcs.as_ref()
    }

    /// The (local, remote) revision pair the comparison cache keys on.
    pub fn revisions(&self) -> Option<(&str, &str)> {
        self.vcs()
            .map(|v| (v.local_rev.as_str(), v.remote_rev.as_str()))
    }

    /// Import path pattern that covers every package in the repository,
    /// e.g. `github.com/owner/repo/...`.
    pub fn import_path_pattern(&self) -> String {
        let paths: Vec<&str> = self.packages.iter().map(|p| p.import_path()).collect();
        let prefix = common_import_prefix(&paths);
        if prefix.is_empty() {
            paths[0].to_string()
        } else {
            format!("{}/...", prefix)
        }
    }
}

/// Longest shared leading run of `/`-separated path elements.
fn common_import_prefix(paths: &[&str]) -> String {
    let mut iter = paths.iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let mut common: Vec<&str> = first.split('/').collect();
    for path in iter {
        let shared = common
            .iter()
            .zip(path.split('/'))
            .take_while(|(a, b)| *a == b)
            .count();
        common.truncate(shared);
    }
    common.join("/")
}

/// Packages grouped by repository root.
pub type RepoMap = HashMap<PathBuf, Repository>;

/// Whether `repo` should be presented as having an available update.
///
/// The working tree must be clean, the checkout must be on the default
/// branch, and the local revision must differ from the remote one.
pub fn should_present(repo: &Repository) -> bool {
    match repo.vcs() {
        Some(vcs) => {
            !vcs.dirty
                && vcs.on_default_branch()
                && !vcs.remote_rev.is_empty()
                && vcs.local_rev != vcs.remote_rev
        }
        None => false,
    }
}

/// A single pending change between the local and the remote revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub sha: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Change {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}
