//! Version-control query capability.
//!
//! The pipeline only needs to know the state of a checkout; how that state
//! is read is up to the implementation. [`GitVcs`] shells out to `git`.

mod git;

pub use git::GitVcs;

use std::path::Path;

use futures_util::future::BoxFuture;

use crate::domain::VcsState;
use crate::error::VcsError;

/// Names of the metadata directories that mark a repository root.
pub const VCS_DIRS: &[&str] = &[".git", ".hg", ".bzr", ".svn"];

/// Reads the state of a local checkout and its upstream.
pub trait Vcs: Send + Sync {
    /// Current branch, default branch, dirtiness, local and remote revision.
    fn status<'a>(&'a self, root: &'a Path) -> BoxFuture<'a, Result<VcsState, VcsError>>;
}

/// Nearest ancestor of `dir` (inclusive) that holds a VCS metadata
/// directory, not climbing above `boundary`.
///
/// Pure function of the filesystem; safe to call from any number of tasks.
pub fn find_root(dir: &Path, boundary: &Path) -> Option<std::path::PathBuf> {
    let mut current = dir;
    loop {
        if !current.starts_with(boundary) || current == boundary {
            return None;
        }
        if VCS_DIRS.iter().any(|name| current.join(name).exists()) {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_root_walks_up_to_checkout() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let repo = src.join("github.com/o/r");
        fs::create_dir_all(repo.join(".git")).unwrap();
        fs::create_dir_all(repo.join("sub/pkg")).unwrap();

        assert_eq!(find_root(&repo.join("sub/pkg"), &src), Some(repo.clone()));
        assert_eq!(find_root(&repo, &src), Some(repo));
    }

    #[test]
    fn test_find_root_stops_at_boundary() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        // A checkout above the boundary must not be picked up.
        fs::create_dir_all(temp_dir.path().join(".git")).unwrap();
        fs::create_dir_all(src.join("example.com/plain")).unwrap();

        assert_eq!(find_root(&src.join("example.com/plain"), &src), None);
    }

    #[test]
    fn test_find_root_outside_boundary() {
        let temp_dir = TempDir::new().unwrap();
        let other = temp_dir.path().join("other");
        fs::create_dir_all(other.join(".git")).unwrap();

        assert_eq!(find_root(&other, &temp_dir.path().join("src")), None);
    }
}
