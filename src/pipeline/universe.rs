//! Comparison cache keyed by repository root.
//!
//! The universe remembers, for every repository it has seen, the revision
//! pair it last compared and the result. A lookup with an unchanged pair
//! returns the cached comparison; a changed pair triggers a new one.
//! Concurrent lookups for the same root share a single computation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use super::mapper::{bounded_map, collect};
use crate::domain::{Change, Repository};
use crate::error::CompareError;
use crate::presenter::{ComparisonProvider, ProviderRegistry};

/// Result of comparing a repository's local revision with its remote one.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub local_rev: String,
    pub remote_rev: String,
    pub outcome: Result<Vec<Change>, CompareError>,
}

impl Comparison {
    /// Changes newest first, or `None` when the comparison failed.
    pub fn changes(&self) -> Option<&[Change]> {
        self.outcome.as_ref().ok().map(Vec::as_slice)
    }

    fn failed(local_rev: &str, remote_rev: &str, err: CompareError) -> Self {
        Self {
            local_rev: local_rev.to_string(),
            remote_rev: remote_rev.to_string(),
            outcome: Err(err),
        }
    }
}

type Slot = Arc<AsyncMutex<Option<Arc<Comparison>>>>;

/// Process-wide comparison cache.
pub struct Universe {
    registry: ProviderRegistry,
    compare_timeout: Duration,
    slots: std::sync::Mutex<HashMap<PathBuf, Slot>>,
    provider_calls: AtomicUsize,
}

impl Universe {
    pub fn new(registry: ProviderRegistry, compare_timeout: Duration) -> Self {
        Self {
            registry,
            compare_timeout,
            slots: std::sync::Mutex::new(HashMap::new()),
            provider_calls: AtomicUsize::new(0),
        }
    }

    /// Provider serving the repository's remote, if any.
    pub fn provider(&self, repo: &Repository) -> Option<Arc<dyn ComparisonProvider>> {
        let remote = repo.vcs()?.remote_url.as_deref()?;
        self.registry.provider_for(remote)
    }

    fn slot(&self, repo: &Repository) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(slots.entry(repo.root().to_path_buf()).or_default())
    }

    /// Comparison for the repository's current revision pair.
    ///
    /// Calling this twice with an unchanged pair returns the same `Arc`
    /// without contacting the provider again.
    pub async fn get(&self, repo: &Repository) -> Arc<Comparison> {
        let slot = self.slot(repo);
        let mut cached = slot.lock().await;

        let (local, remote) = repo.revisions().unwrap_or(("", ""));
        if let Some(existing) = cached.as_ref() {
            if existing.local_rev == local && existing.remote_rev == remote {
                return Arc::clone(existing);
            }
            debug!(
                "{}: revisions moved, recomputing comparison",
                repo.root().display()
            );
        }

        let fresh = Arc::new(self.compute(repo).await);
        *cached = Some(Arc::clone(&fresh));
        fresh
    }

    /// Recompute the comparison regardless of what is cached.
    pub async fn force(&self, repo: &Repository) -> Arc<Comparison> {
        let slot = self.slot(repo);
        let mut cached = slot.lock().await;
        let fresh = Arc::new(self.compute(repo).await);
        *cached = Some(Arc::clone(&fresh));
        fresh
    }

    /// Warm the cache for every repository in `repos` on `workers` tasks
    /// and wait until each comparison is in, whether or not it would be
    /// presented. Returns the number of cached repositories.
    pub async fn wait(self: &Arc<Self>, repos: Vec<Repository>, workers: usize) -> usize {
        let universe = Arc::clone(self);
        let warmed = collect(bounded_map(repos, workers, move |repo: Repository| {
            let universe = Arc::clone(&universe);
            async move {
                universe.get(&repo).await;
                Some(())
            }
        }))
        .await;
        debug!("Warmed {} comparisons", warmed.len());
        self.len()
    }

    /// Number of repositories with a cache entry.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times a provider has been asked for a comparison.
    pub fn provider_calls(&self) -> usize {
        self.provider_calls.load(Ordering::Relaxed)
    }

    async fn compute(&self, repo: &Repository) -> Comparison {
        let (local, remote) = repo.revisions().unwrap_or(("", ""));
        if local.is_empty() || remote.is_empty() {
            return Comparison::failed(local, remote, CompareError::MissingRevision);
        }

        let Some(remote_url) = repo.vcs().and_then(|v| v.remote_url.as_deref()) else {
            return Comparison::failed(local, remote, CompareError::NoRemote);
        };
        let Some(provider) = self.registry.provider_for(remote_url) else {
            return Comparison::failed(
                local,
                remote,
                CompareError::Unsupported(remote_url.to_string()),
            );
        };

        self.provider_calls.fetch_add(1, Ordering::Relaxed);
        let outcome = match tokio::time::timeout(self.compare_timeout, provider.compare(local, remote)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CompareError::Timeout(self.compare_timeout.as_secs())),
        };
        if let Err(err) = &outcome {
            warn!("{}: {}", repo.root().display(), err);
        }

        Comparison {
            local_rev: local.to_string(),
            remote_rev: remote.to_string(),
            outcome,
        }
    }
}
