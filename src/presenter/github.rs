use futures_util::future::BoxFuture;
use tracing::debug;
use url::Url;

use super::{ComparisonProvider, RemoteLocation, PLACEHOLDER_IMAGE};
use crate::api::{ApiError, GitHubClient, RepositoryCommit};
use crate::domain::Change;
use crate::error::CompareError;

/// Comparison provider for repositories hosted on GitHub.
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    client: GitHubClient,
    host: String,
    owner: String,
    repo: String,
}

impl GitHubProvider {
    pub fn new(client: GitHubClient, host: &str, owner: &str, repo: &str) -> Self {
        Self {
            client,
            host: host.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    /// `None` unless the remote path is exactly `owner/repo`.
    pub fn for_location(client: GitHubClient, location: &RemoteLocation) -> Option<Self> {
        let (owner, repo) = location.owner_and_repo()?;
        let host = location.host.trim_start_matches("www.");
        Some(Self::new(client, host, owner, repo))
    }

    async fn fetch_changes(&self, local_rev: &str, remote_rev: &str) -> Result<Vec<Change>, ApiError> {
        let comparison = self
            .client
            .compare_commits(&self.owner, &self.repo, local_rev, remote_rev)
            .await?;
        debug!(
            "{}/{}: {} commits ahead ({})",
            self.owner,
            self.repo,
            comparison.ahead_by,
            comparison.status.as_deref().unwrap_or("unknown")
        );
        Ok(comparison.commits.into_iter().rev().map(to_change).collect())
    }
}

fn to_change(commit: RepositoryCommit) -> Change {
    Change {
        sha: commit.sha,
        message: commit.commit.message,
        date: commit.commit.committer.and_then(|c| c.date),
        url: commit.html_url,
    }
}

impl ComparisonProvider for GitHubProvider {
    fn home_page(&self) -> Option<Url> {
        Url::parse(&format!("https://{}/{}/{}", self.host, self.owner, self.repo)).ok()
    }

    fn image(&self) -> BoxFuture<'_, String> {
        Box::pin(async move {
            match self.client.user(&self.owner).await {
                Ok(user) => user
                    .avatar_url
                    .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
                Err(err) => {
                    debug!("No avatar for {}: {}", self.owner, err);
                    PLACEHOLDER_IMAGE.to_string()
                }
            }
        })
    }

    fn compare<'a>(
        &'a self,
        local_rev: &'a str,
        remote_rev: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Change>, CompareError>> {
        Box::pin(async move {
            self.fetch_changes(local_rev, remote_rev)
                .await
                .map_err(|e| CompareError::Provider(e.to_string()))
        })
    }
}
