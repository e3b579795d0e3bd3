//! Repository presenters.
//!
//! A [`ComparisonProvider`] knows how to list the changes between two
//! revisions of a repository hosted on a particular service. The
//! [`ProviderRegistry`] picks a provider from the remote URL, and a
//! [`RepoPresenter`] bundles a repository with everything the renderer shows
//! for it.

mod github;
mod registry;
mod remote;

pub use github::GitHubProvider;
pub use registry::{ProviderFactory, ProviderRegistry};
pub use remote::RemoteLocation;

use std::sync::Arc;

use futures_util::future::BoxFuture;
use url::Url;

use crate::domain::{Change, Repository};
use crate::pipeline::Comparison;

/// Image shown when a provider has no better one.
pub const PLACEHOLDER_IMAGE: &str = "https://github.com/images/gravatars/gravatar-user-420.png";

/// Hosting-service specific access to a repository.
pub trait ComparisonProvider: Send + Sync {
    /// Web page of the repository, if known.
    fn home_page(&self) -> Option<Url>;

    /// Image URL for the repository owner. Never fails; falls back to
    /// [`PLACEHOLDER_IMAGE`].
    fn image(&self) -> BoxFuture<'_, String>;

    /// Changes reachable from `remote_rev` but not from `local_rev`,
    /// newest first.
    fn compare<'a>(
        &'a self,
        local_rev: &'a str,
        remote_rev: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Change>, crate::error::CompareError>>;
}

/// What the renderer shows for one repository with an available update.
#[derive(Debug, Clone)]
pub struct RepoPresenter {
    repo: Repository,
    home_page: Option<Url>,
    image: String,
    comparison: Arc<Comparison>,
}

impl RepoPresenter {
    /// Build the presenter for `repo`. The provider, when there is one,
    /// supplies the home page and image; otherwise both are derived from
    /// the remote URL.
    pub async fn build(
        repo: Repository,
        provider: Option<Arc<dyn ComparisonProvider>>,
        comparison: Arc<Comparison>,
    ) -> Self {
        let (home_page, image) = match provider {
            Some(provider) => (provider.home_page(), provider.image().await),
            None => {
                let home_page = repo
                    .vcs()
                    .and_then(|v| v.remote_url.as_deref())
                    .and_then(RemoteLocation::parse)
                    .and_then(|l| l.web_url());
                (home_page, PLACEHOLDER_IMAGE.to_string())
            }
        };

        Self {
            repo,
            home_page,
            image,
            comparison,
        }
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn home_page(&self) -> Option<&Url> {
        self.home_page.as_ref()
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn comparison(&self) -> &Arc<Comparison> {
        &self.comparison
    }

    /// Pending changes, newest first. `None` when the comparison could not
    /// be computed.
    pub fn changes(&self) -> Option<impl Iterator<Item = &Change> + '_> {
        self.comparison.changes().map(|c| c.iter())
    }
}
