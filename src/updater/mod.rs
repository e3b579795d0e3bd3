//! Package updates.
//!
//! An [`Updater`] runs the package manager for one import path pattern.
//! Updates touch the shared workspace, so every request goes through a
//! single [`UpdateService`] worker that runs them one at a time.

mod serializer;

pub use serializer::{UpdateHandle, UpdateOutcome, UpdateService};

use std::path::PathBuf;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::UpdateError;

/// Runs the package manager for an import path pattern such as
/// `github.com/owner/repo/...`.
pub trait Updater: Send + Sync {
    fn update<'a>(&'a self, pattern: &'a str) -> BoxFuture<'a, Result<(), UpdateError>>;
}

/// `go get -u -d <pattern>` against the configured GOPATH.
#[derive(Debug, Clone)]
pub struct GoGetUpdater {
    go: String,
    gopath: Vec<PathBuf>,
}

impl GoGetUpdater {
    pub fn new(gopath: Vec<PathBuf>) -> Self {
        Self {
            go: "go".to_string(),
            gopath,
        }
    }
}

impl Updater for GoGetUpdater {
    fn update<'a>(&'a self, pattern: &'a str) -> BoxFuture<'a, Result<(), UpdateError>> {
        Box::pin(async move {
            let mut command = Command::new(&self.go);
            command.args(["get", "-u", "-d", pattern]);
            if !self.gopath.is_empty() {
                if let Ok(joined) = std::env::join_paths(&self.gopath) {
                    command.env("GOPATH", joined);
                }
            }

            debug!("Running {} get -u -d {}", self.go, pattern);
            let output = command.output().await.map_err(|e| UpdateError::Spawn {
                command: format!("{} get", self.go),
                message: e.to_string(),
            })?;

            if !output.status.success() {
                return Err(UpdateError::Failed {
                    pattern: pattern.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }
            Ok(())
        })
    }
}

/// Pretends to update; used for `--dry-run`.
#[derive(Debug, Clone)]
pub struct MockUpdater {
    delay: Duration,
}

impl MockUpdater {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Updater for MockUpdater {
    fn update<'a>(&'a self, pattern: &'a str) -> BoxFuture<'a, Result<(), UpdateError>> {
        Box::pin(async move {
            info!("(dry run) would update {}", pattern);
            tokio::time::sleep(self.delay).await;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_updater_succeeds() {
        let updater = MockUpdater::new(Duration::ZERO);
        assert_eq!(updater.update("example.com/o/r/...").await, Ok(()));
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_spawn_error() {
        let updater = GoGetUpdater {
            go: "pkgstore-definitely-not-a-go-binary".to_string(),
            gopath: Vec::new(),
        };
        let err = updater.update("example.com/o/r/...").await.unwrap_err();
        assert!(matches!(err, UpdateError::Spawn { .. }));
    }
}
