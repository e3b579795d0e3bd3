//! Bounded parallel map with completion-ordered output.
//!
//! Items are fed through a shared queue to a fixed number of worker tasks.
//! Every worker owns a clone of the output sender; the output closes once the
//! last worker drops its sender, which happens only after the input queue is
//! exhausted. Results therefore arrive in completion order, none are lost,
//! and no worker outlives the input.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tracing::debug;

/// Map `transform` over `items` on `workers` concurrent tasks.
///
/// Items for which `transform` yields `None` are dropped. The returned
/// receiver yields results as soon as each one is ready.
///
/// There is no early cancellation: if the receiver is dropped before it is
/// exhausted, workers keep draining the input and discard their results.
/// Use [`bounded_map_cancellable`] when the caller needs to stop early.
pub fn bounded_map<I, T, U, F, Fut>(items: I, workers: usize, transform: F) -> mpsc::Receiver<U>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<U>> + Send + 'static,
{
    spawn_pool(items, workers, transform, None)
}

/// Like [`bounded_map`], but workers stop taking new items once `cancel`
/// turns `true`. Items already in flight run to completion.
pub fn bounded_map_cancellable<I, T, U, F, Fut>(
    items: I,
    workers: usize,
    cancel: watch::Receiver<bool>,
    transform: F,
) -> mpsc::Receiver<U>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<U>> + Send + 'static,
{
    spawn_pool(items, workers, transform, Some(cancel))
}

fn spawn_pool<I, T, U, F, Fut>(
    items: I,
    workers: usize,
    transform: F,
    cancel: Option<watch::Receiver<bool>>,
) -> mpsc::Receiver<U>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<U>> + Send + 'static,
{
    let workers = workers.max(1);
    let (in_tx, in_rx) = mpsc::channel::<T>(workers);
    let (out_tx, out_rx) = mpsc::channel::<U>(workers);

    // Feeding happens in its own task since sending input blocks on workers
    // reading it, which in turn blocks on the consumer reading output.
    let iter = items.into_iter();
    tokio::spawn(async move {
        for item in iter {
            if in_tx.send(item).await.is_err() {
                break;
            }
        }
    });

    let in_rx = Arc::new(Mutex::new(in_rx));
    let transform = Arc::new(transform);

    for worker in 0..workers {
        let in_rx = Arc::clone(&in_rx);
        let out_tx = out_tx.clone();
        let transform = Arc::clone(&transform);
        let mut cancel = cancel.clone();

        tokio::spawn(async move {
            loop {
                if cancel.as_mut().is_some_and(|c| *c.borrow_and_update()) {
                    debug!("Mapper worker {} cancelled", worker);
                    break;
                }

                let next = in_rx.lock().await.recv().await;
                let Some(item) = next else {
                    break;
                };

                if let Some(out) = transform(item).await {
                    // A closed output only means nobody is listening any more;
                    // keep draining the input.
                    let _ = out_tx.send(out).await;
                }
            }
        });
    }

    out_rx
}

/// Drain a receiver into a `Vec`, in arrival order.
pub async fn collect<U>(mut rx: mpsc::Receiver<U>) -> Vec<U> {
    let mut out = Vec::new();
    while let Some(item) = rx.recv().await {
        out.push(item);
    }
    out
}
