//! Workspace package discovery.
//!
//! A [`PackageSource`] produces the flat list of installed packages; the
//! grouper then partitions them by repository root. Sources:
//! - [`GopathScan`]: every package under the GOPATH source roots
//! - [`PackageList`]: newline separated import paths from a stream
//! - [`ManifestSource`]: `Godeps.json` or govendor `vendor.json`

mod grouper;
mod scanner;
mod sources;

pub use grouper::group_packages;
pub use scanner::GopathScan;
pub use sources::{ManifestKind, ManifestSource, PackageList};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::Package;
use crate::error::EnumerateError;

/// Produces the full list of packages for a workspace. All or nothing: an
/// error means no packages at all.
pub trait PackageSource: Send + Sync {
    /// Human readable description, for logs.
    fn describe(&self) -> String;

    fn list(&self) -> Result<Vec<Package>, EnumerateError>;

    /// Whether packages from this source may be updated through the
    /// package manager.
    fn supports_update(&self) -> bool;
}

/// Run a (blocking) enumeration off the async runtime.
pub async fn enumerate(source: Arc<dyn PackageSource>) -> Result<Vec<Package>, EnumerateError> {
    tokio::task::spawn_blocking(move || source.list())
        .await
        .map_err(|e| EnumerateError::Join(e.to_string()))?
}

/// Import path of `dir` relative to a GOPATH `src` root.
pub fn import_path_for(root: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(root).ok()?;
    let import_path = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    (!import_path.is_empty()).then_some(import_path)
}

/// First GOPATH source root that has a directory for `import_path`.
pub fn resolve_dir(roots: &[PathBuf], import_path: &str) -> Option<PathBuf> {
    roots
        .iter()
        .map(|root| root.join(import_path))
        .find(|dir| dir.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_import_path_for() {
        let root = Path::new("/go/src");
        assert_eq!(
            import_path_for(root, Path::new("/go/src/github.com/o/r")),
            Some("github.com/o/r".to_string())
        );
        assert_eq!(import_path_for(root, root), None);
        assert_eq!(import_path_for(root, Path::new("/elsewhere")), None);
    }

    #[test]
    fn test_resolve_dir_searches_roots_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("one/src");
        let second = temp_dir.path().join("two/src");
        fs::create_dir_all(second.join("example.com/a")).unwrap();

        let roots = vec![first, second.clone()];
        assert_eq!(
            resolve_dir(&roots, "example.com/a"),
            Some(second.join("example.com/a"))
        );
        assert_eq!(resolve_dir(&roots, "example.com/b"), None);
    }

    #[tokio::test]
    async fn test_enumerate_propagates_errors() {
        let source: Arc<dyn PackageSource> =
            Arc::new(GopathScan::new(vec![PathBuf::from("/nonexistent/src")], None));
        assert!(enumerate(source).await.is_err());
    }
}
