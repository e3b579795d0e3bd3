use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::http::send_with_retry;
use super::types::{ApiError, CommitsComparison, User};
use crate::config::Config;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Client for the GitHub REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    user_agent: String,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_base_url(
            config.github_api.clone(),
            config.github_token.clone(),
            config.user_agent.clone(),
            config.compare_timeout,
        )
    }

    pub fn with_base_url(
        base_url: Url,
        token: Option<String>,
        user_agent: String,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            token,
            user_agent,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, ApiError> {
        let url = self.base_url.join(endpoint)?;
        debug!("GitHub GET {}", url);

        let response = send_with_retry(|| {
            let mut request = self
                .client
                .get(url.clone())
                .header("Accept", ACCEPT)
                .header("User-Agent", &self.user_agent)
                .header("X-GitHub-Api-Version", API_VERSION);
            if let Some(token) = &self.token {
                request = request.header("Authorization", format!("Bearer {}", token));
            }
            request
        })
        .await?;

        let status = response.status();
        if !status.is_success() {
            let remaining = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned);
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(
                status.as_u16(),
                remaining.as_deref(),
                &body,
            ));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Commits reachable from `head` but not from `base`, oldest first.
    pub async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<CommitsComparison, ApiError> {
        self.get_json(&format!(
            "repos/{}/{}/compare/{}...{}",
            owner, repo, base, head
        ))
        .await
    }

    pub async fn user(&self, login: &str) -> Result<User, ApiError> {
        self.get_json(&format!("users/{}", login)).await
    }
}
