//! Application wiring shared by the CLI commands and the MCP server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::api::GitHubClient;
use crate::config::Config;
use crate::error::EnumerateError;
use crate::pipeline::{PassSummary, Pipeline, Renderer, Survey, Universe};
use crate::presenter::ProviderRegistry;
use crate::updater::{GoGetUpdater, MockUpdater, UpdateService, Updater};
use crate::vcs::GitVcs;
use crate::workspace::{enumerate, PackageSource};

/// Simulated duration of a dry-run update.
const DRY_RUN_DELAY: Duration = Duration::from_millis(250);

/// A package source together with the pipeline and update service that
/// operate on it. The comparison cache lives as long as the app.
pub struct App {
    source: Arc<dyn PackageSource>,
    pipeline: Pipeline,
    updates: UpdateService,
}

impl App {
    pub fn new(source: Arc<dyn PackageSource>, pipeline: Pipeline, updates: UpdateService) -> Self {
        Self {
            source,
            pipeline,
            updates,
        }
    }

    /// Wire up the production stack: `git` for status, GitHub for
    /// comparisons, `go get` (or a mock, for `dry_run`) for updates.
    pub fn from_config(config: &Config, source: Arc<dyn PackageSource>, dry_run: bool) -> Result<Self> {
        let client = GitHubClient::new(config).context("Failed to create GitHub client")?;
        let universe = Arc::new(Universe::new(
            ProviderRegistry::with_github(client),
            config.compare_timeout,
        ));
        let pipeline = Pipeline::new(
            Arc::new(GitVcs::new()),
            universe,
            config.source_roots(),
            config.group_workers,
            config.status_workers,
        );

        let updater: Option<Arc<dyn Updater>> = match (source.supports_update(), dry_run) {
            (false, _) => None,
            (true, true) => Some(Arc::new(MockUpdater::new(DRY_RUN_DELAY))),
            (true, false) => Some(Arc::new(GoGetUpdater::new(config.gopath.clone()))),
        };

        info!(
            "Package source: {} (updates {})",
            source.describe(),
            if updater.is_some() { "enabled" } else { "disabled" }
        );
        Ok(Self::new(source, pipeline, UpdateService::new(updater)))
    }

    pub fn updates(&self) -> &UpdateService {
        &self.updates
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Enumerate the packages and run a full pass into `renderer`.
    pub async fn check<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        limit: Option<usize>,
    ) -> Result<PassSummary, EnumerateError> {
        let packages = enumerate(Arc::clone(&self.source)).await?;
        Ok(self
            .pipeline
            .run(packages, renderer, self.updates.is_supported(), limit)
            .await)
    }

    /// Enumerate the packages and survey them.
    pub async fn survey(&self) -> Result<Survey, EnumerateError> {
        let packages = enumerate(Arc::clone(&self.source)).await?;
        Ok(self.pipeline.survey(packages).await)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::workspace::PackageList;
    use std::path::PathBuf;

    /// App over an empty package list, with no reachable remotes.
    pub(crate) fn empty_app(updater: Option<Arc<dyn Updater>>) -> App {
        let source = PackageList::from_reader("".as_bytes(), &[]).unwrap();
        let universe = Arc::new(Universe::new(ProviderRegistry::new(), Duration::from_secs(1)));
        let pipeline = Pipeline::new(
            Arc::new(GitVcs::new()),
            universe,
            vec![PathBuf::from("/nonexistent/src")],
            2,
            2,
        );
        App::new(Arc::new(source), pipeline, UpdateService::new(updater))
    }

    #[tokio::test]
    async fn test_check_on_empty_source() {
        let app = empty_app(None);
        let mut report = crate::render::TextReport::default();
        let summary = app.check(&mut report, None).await.unwrap();
        assert_eq!(summary.packages, 0);
        assert!(report.into_text().contains("No updates available."));
    }

    #[tokio::test]
    async fn test_dry_run_source_supports_updates() {
        let mut config = Config::default();
        config.gopath = vec![PathBuf::from("/nonexistent")];
        let source = PackageList::from_reader("".as_bytes(), &config.source_roots()).unwrap();

        let app = App::from_config(&config, Arc::new(source), true).unwrap();
        assert!(app.updates().is_supported());
    }
}
