//! The read pass: group packages into repositories, query their status,
//! compare revisions and hand presenters to a renderer.

mod emit;
pub mod mapper;
mod universe;

#[cfg(test)]
mod tests;

pub use emit::{emit, Renderer};
pub use universe::{Comparison, Universe};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::domain::{should_present, Package, RepoMap, Repository};
use crate::error::VcsError;
use crate::presenter::RepoPresenter;
use crate::vcs::Vcs;
use crate::workspace::group_packages;
use mapper::{bounded_map, bounded_map_cancellable};

/// Counts from one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub packages: usize,
    pub repositories: usize,
    pub presented: usize,
    pub elapsed: Duration,
}

/// Counts from a survey of the workspace, without presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Survey {
    pub packages: usize,
    pub repositories: usize,
    pub with_updates: usize,
    pub dirty: usize,
    pub off_default_branch: usize,
    pub status_failures: usize,
    pub comparisons: usize,
}

/// Everything a pass needs besides the packages themselves.
pub struct Pipeline {
    vcs: Arc<dyn Vcs>,
    universe: Arc<Universe>,
    boundaries: Vec<PathBuf>,
    group_workers: usize,
    status_workers: usize,
}

impl Pipeline {
    pub fn new(
        vcs: Arc<dyn Vcs>,
        universe: Arc<Universe>,
        boundaries: Vec<PathBuf>,
        group_workers: usize,
        status_workers: usize,
    ) -> Self {
        Self {
            vcs,
            universe,
            boundaries,
            group_workers,
            status_workers,
        }
    }

    pub fn universe(&self) -> &Arc<Universe> {
        &self.universe
    }

    pub async fn group(&self, packages: Vec<Package>) -> RepoMap {
        group_packages(packages, self.boundaries.clone(), self.group_workers).await
    }

    /// Refresh, filter and compare every repository on the status workers.
    /// Presenters arrive in completion order.
    pub fn status_pass(&self, repos: RepoMap) -> mpsc::Receiver<RepoPresenter> {
        let (vcs, universe) = (Arc::clone(&self.vcs), Arc::clone(&self.universe));
        bounded_map(repos.into_values(), self.status_workers, move |repo: Repository| {
            present(Arc::clone(&vcs), Arc::clone(&universe), repo)
        })
    }

    /// Like [`Pipeline::status_pass`], but stops picking up repositories
    /// once `cancel` turns `true`.
    pub fn status_pass_cancellable(
        &self,
        repos: RepoMap,
        cancel: watch::Receiver<bool>,
    ) -> mpsc::Receiver<RepoPresenter> {
        let (vcs, universe) = (Arc::clone(&self.vcs), Arc::clone(&self.universe));
        bounded_map_cancellable(repos.into_values(), self.status_workers, cancel, move |repo: Repository| {
            present(Arc::clone(&vcs), Arc::clone(&universe), repo)
        })
    }

    /// Run a full pass over `packages` and render the results.
    pub async fn run<R: Renderer + ?Sized>(
        &self,
        packages: Vec<Package>,
        renderer: &mut R,
        update_supported: bool,
        limit: Option<usize>,
    ) -> PassSummary {
        let started = Instant::now();
        let package_count = packages.len();

        let repos = self.group(packages).await;
        let repositories = repos.len();
        debug!(
            "Grouped {} packages into {} repositories in {:?}",
            package_count,
            repositories,
            started.elapsed()
        );

        let presented = match limit {
            Some(max) => {
                let (cancel_tx, cancel_rx) = watch::channel(false);
                let rx = self.status_pass_cancellable(repos, cancel_rx);
                let presented = emit(rx, renderer, update_supported, Some(max)).await;
                let _ = cancel_tx.send(true);
                presented
            }
            None => emit(self.status_pass(repos), renderer, update_supported, None).await,
        };

        let summary = PassSummary {
            packages: package_count,
            repositories,
            presented,
            elapsed: started.elapsed(),
        };
        info!(
            "Checked {} repositories ({} packages) in {:?}",
            summary.repositories, summary.packages, summary.elapsed
        );
        summary
    }

    /// Group and query every repository, then compare every one whose
    /// status came back, presentable or not.
    pub async fn survey(&self, packages: Vec<Package>) -> Survey {
        let mut survey = Survey {
            packages: packages.len(),
            ..Survey::default()
        };

        let repos = self.group(packages).await;
        survey.repositories = repos.len();

        let vcs = Arc::clone(&self.vcs);
        let mut rx = bounded_map(repos.into_values(), self.status_workers, move |mut repo: Repository| {
            let vcs = Arc::clone(&vcs);
            async move {
                let refreshed = refresh(vcs.as_ref(), &mut repo).await;
                if let Err(err) = &refreshed {
                    warn!("No status for {}: {}", repo.root().display(), err);
                }
                Some((repo, refreshed.is_ok()))
            }
        });

        let mut queried = Vec::new();
        while let Some((repo, refreshed)) = rx.recv().await {
            let Some(state) = repo.vcs().filter(|_| refreshed) else {
                survey.status_failures += 1;
                continue;
            };
            if state.dirty {
                survey.dirty += 1;
            }
            if !state.on_default_branch() {
                survey.off_default_branch += 1;
            }
            if should_present(&repo) {
                survey.with_updates += 1;
            }
            queried.push(repo);
        }

        survey.comparisons = self.universe.wait(queried, self.status_workers).await;
        survey
    }
}

/// Query the VCS state of the repository's representative package. A
/// pinned revision replaces the checked-out one.
async fn refresh(vcs: &dyn Vcs, repo: &mut Repository) -> Result<(), VcsError> {
    let mut state = vcs.status(repo.root()).await?;
    let representative = repo.representative_mut();
    if let Some(pinned) = &representative.pinned_rev {
        state.local_rev = pinned.clone();
    }
    representative.vcs = Some(state);
    Ok(())
}

async fn present(
    vcs: Arc<dyn Vcs>,
    universe: Arc<Universe>,
    mut repo: Repository,
) -> Option<RepoPresenter> {
    if let Err(err) = refresh(vcs.as_ref(), &mut repo).await {
        warn!("Skipping {}: {}", repo.root().display(), err);
        return None;
    }
    if !should_present(&repo) {
        return None;
    }

    let comparison = universe.get(&repo).await;
    let provider = universe.provider(&repo);
    Some(RepoPresenter::build(repo, provider, comparison).await)
}
