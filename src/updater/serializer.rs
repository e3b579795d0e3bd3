use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use super::Updater;
use crate::error::UpdateError;

struct UpdateRequest {
    pattern: String,
    respond: oneshot::Sender<Result<(), UpdateError>>,
}

/// Sending side of the update worker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UpdateHandle {
    tx: mpsc::UnboundedSender<UpdateRequest>,
}

impl UpdateHandle {
    /// Start the worker that owns `updater`. Requests are handled one at a
    /// time in submission order; the worker exits once every handle is
    /// dropped.
    pub fn spawn(updater: Arc<dyn Updater>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<UpdateRequest>();

        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                info!("Updating {}...", request.pattern);
                let result = updater.update(&request.pattern).await;
                match &result {
                    Ok(()) => info!("Done."),
                    Err(err) => warn!("{}", err),
                }
                // The requester may have given up waiting.
                let _ = request.respond.send(result);
            }
        });

        Self { tx }
    }

    /// Queue an update and wait for its result.
    pub async fn update(&self, pattern: &str) -> Result<(), UpdateError> {
        let (respond, response) = oneshot::channel();
        self.tx
            .send(UpdateRequest {
                pattern: pattern.to_string(),
                respond,
            })
            .map_err(|_| UpdateError::WorkerGone)?;
        response.await.map_err(|_| UpdateError::WorkerGone)?
    }
}

/// What happened to a submitted update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    Updated,
    /// The package source cannot be updated; nothing was run.
    Unsupported,
}

/// Front door for updates. Without an updater every request is reported as
/// [`UpdateOutcome::Unsupported`].
#[derive(Debug, Clone, Default)]
pub struct UpdateService {
    handle: Option<UpdateHandle>,
}

impl UpdateService {
    pub fn new(updater: Option<Arc<dyn Updater>>) -> Self {
        Self {
            handle: updater.map(UpdateHandle::spawn),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.handle.is_some()
    }

    pub async fn submit(&self, pattern: &str) -> Result<UpdateOutcome, UpdateError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(UpdateError::EmptyPattern);
        }
        let Some(handle) = &self.handle else {
            return Ok(UpdateOutcome::Unsupported);
        };
        handle.update(pattern).await?;
        Ok(UpdateOutcome::Updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::{join_all, BoxFuture};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records patterns in call order and notices overlapping calls.
    #[derive(Default)]
    struct RecordingUpdater {
        in_flight: AtomicUsize,
        overlaps: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl Updater for RecordingUpdater {
        fn update<'a>(&'a self, pattern: &'a str) -> BoxFuture<'a, Result<(), UpdateError>> {
            Box::pin(async move {
                if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
                    self.overlaps.fetch_add(1, Ordering::SeqCst);
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
                self.seen.lock().unwrap().push(pattern.to_string());
                self.in_flight.fetch_sub(1, Ordering::SeqCst);

                if pattern.contains("broken") {
                    return Err(UpdateError::Failed {
                        pattern: pattern.to_string(),
                        stderr: "cannot find package".to_string(),
                    });
                }
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_run_one_at_a_time_in_order() {
        let updater = Arc::new(RecordingUpdater::default());
        let service = UpdateService::new(Some(updater.clone() as Arc<dyn Updater>));

        let patterns: Vec<String> = (0..10).map(|i| format!("example.com/o/r{}/...", i)).collect();
        let results = join_all(patterns.iter().map(|p| service.submit(p))).await;

        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|r| *r == Ok(UpdateOutcome::Updated)));
        assert_eq!(updater.overlaps.load(Ordering::SeqCst), 0);
        assert_eq!(*updater.seen.lock().unwrap(), patterns);
    }

    #[tokio::test]
    async fn test_failure_reaches_only_its_requester() {
        let updater = Arc::new(RecordingUpdater::default());
        let service = UpdateService::new(Some(updater as Arc<dyn Updater>));

        let (ok, broken) = tokio::join!(
            service.submit("example.com/o/fine/..."),
            service.submit("example.com/o/broken/...")
        );
        assert_eq!(ok, Ok(UpdateOutcome::Updated));
        assert!(matches!(broken, Err(UpdateError::Failed { .. })));
    }

    #[tokio::test]
    async fn test_without_updater_nothing_runs() {
        let service = UpdateService::default();
        assert!(!service.is_supported());
        assert_eq!(
            service.submit("example.com/o/r/...").await,
            Ok(UpdateOutcome::Unsupported)
        );
    }

    #[tokio::test]
    async fn test_empty_pattern_is_rejected() {
        let service = UpdateService::new(Some(Arc::new(RecordingUpdater::default()) as Arc<dyn Updater>));
        assert_eq!(service.submit("  ").await, Err(UpdateError::EmptyPattern));
    }
}
