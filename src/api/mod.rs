//! GitHub REST API client.
//!
//! Used by the GitHub comparison provider to list the commits between two
//! revisions and to look up repository owner avatars.

mod client;
mod http;
mod types;

pub use client::GitHubClient;
pub use types::{ApiError, CommitsComparison, RepositoryCommit, User};

#[cfg(test)]
pub(crate) use client::tests::serve_once;
