//! Git implementation of the [`Vcs`] capability, using the system `git`.
//!
//! Going through the `git` binary picks up the user's SSH keys, credential
//! helpers and `~/.gitconfig` without any extra setup.

use std::path::Path;

use futures_util::future::BoxFuture;
use tokio::process::Command;
use tracing::debug;

use super::Vcs;
use crate::domain::VcsState;
use crate::error::VcsError;

/// Branch assumed to be the default when the remote does not say.
const FALLBACK_DEFAULT_BRANCH: &str = "master";

#[derive(Debug, Clone)]
pub struct GitVcs {
    binary: String,
}

impl GitVcs {
    pub fn new() -> Self {
        Self {
            binary: "git".to_string(),
        }
    }

    async fn git(&self, root: &Path, args: &[&str]) -> Result<String, VcsError> {
        let command = format!("git {}", args.join(" "));
        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|source| VcsError::Spawn {
                command: command.clone(),
                dir: root.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            return Err(VcsError::Command {
                command,
                dir: root.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn remote_url(&self, root: &Path) -> Option<String> {
        // A missing `origin` makes `git config --get` exit with status 1.
        self.git(root, &["config", "--get", "remote.origin.url"])
            .await
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl Default for GitVcs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vcs for GitVcs {
    fn status<'a>(&'a self, root: &'a Path) -> BoxFuture<'a, Result<VcsState, VcsError>> {
        Box::pin(async move {
            let local_rev = self.git(root, &["rev-parse", "HEAD"]).await?.trim().to_string();
            let branch = self
                .git(root, &["rev-parse", "--abbrev-ref", "HEAD"])
                .await?
                .trim()
                .to_string();
            let dirty = !self
                .git(root, &["status", "--porcelain"])
                .await?
                .trim()
                .is_empty();
            let remote_url = self.remote_url(root).await;

            let (default_branch, remote_rev) = match remote_url {
                Some(_) => {
                    let listing = self
                        .git(root, &["ls-remote", "--symref", "origin", "HEAD"])
                        .await?;
                    parse_symref_listing(&listing).ok_or_else(|| VcsError::Parse {
                        command: "git ls-remote --symref origin HEAD".to_string(),
                        output: listing.clone(),
                    })?
                }
                None => (FALLBACK_DEFAULT_BRANCH.to_string(), String::new()),
            };

            debug!(
                "{}: branch={} default={} dirty={} local={} remote={}",
                root.display(),
                branch,
                default_branch,
                dirty,
                local_rev,
                remote_rev
            );

            Ok(VcsState {
                branch,
                default_branch,
                dirty,
                local_rev,
                remote_rev,
                remote_url,
            })
        })
    }
}

/// Parse the output of `git ls-remote --symref origin HEAD` into the
/// default branch name and the revision it points at.
///
/// ```text
/// ref: refs/heads/main	HEAD
/// 3f0c...e1	HEAD
/// ```
fn parse_symref_listing(listing: &str) -> Option<(String, String)> {
    let mut default_branch = None;
    let mut rev = None;

    for line in listing.lines() {
        let mut fields = line.split('\t');
        let first = fields.next()?.trim();
        let name = fields.next().map(str::trim);
        if name != Some("HEAD") {
            continue;
        }
        if let Some(target) = first.strip_prefix("ref:") {
            let target = target.trim();
            default_branch = Some(
                target
                    .strip_prefix("refs/heads/")
                    .unwrap_or(target)
                    .to_string(),
            );
        } else if !first.is_empty() {
            rev = Some(first.to_string());
        }
    }

    let rev = rev?;
    Some((
        default_branch.unwrap_or_else(|| FALLBACK_DEFAULT_BRANCH.to_string()),
        rev,
    ))
}
