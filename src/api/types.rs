//! GitHub REST API response types.
//!
//! Only the fields the package store reads are modelled; everything else in
//! the payloads is ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Response of `GET /repos/{owner}/{repo}/compare/{base}...{head}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitsComparison {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ahead_by: u64,
    #[serde(default)]
    pub behind_by: u64,
    /// Oldest first
    #[serde(default)]
    pub commits: Vec<RepositoryCommit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryCommit {
    pub sha: String,
    pub commit: CommitDetail,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    #[serde(default)]
    pub committer: Option<CommitSignature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitSignature {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Response of `GET /users/{owner}`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// GitHub error payload (`{"message": "...", "documentation_url": "..."}`).
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ErrorBody {
    pub message: String,
}

/// Failure talking to the GitHub API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("GitHub API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    #[error("GitHub API rate limit exceeded (HTTP {status}); set GITHUB_TOKEN to raise the limit")]
    RateLimited { status: u16 },

    #[error("GitHub request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse GitHub response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid GitHub API URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Build an error from a non-success response.
    pub fn from_response(status: u16, rate_limit_remaining: Option<&str>, body: &str) -> Self {
        let exhausted = rate_limit_remaining.is_some_and(|r| r.trim() == "0");
        if status == 429 || (status == 403 && exhausted) {
            return ApiError::RateLimited { status };
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.message)
            .unwrap_or_else(|_| {
                if body.is_empty() {
                    "no response body".to_string()
                } else {
                    body.to_string()
                }
            });
        ApiError::Http { status, message }
    }
}
