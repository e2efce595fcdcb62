//! Periodic reconciliation of a shared quote store

use super::quote_store::{QuoteStore, ReconcileOutcome};
use super::remote::RemoteSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub type SharedStore = Arc<Mutex<QuoteStore>>;

pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Runs one reconciliation. The fetch runs without the store lock, so local
/// edits made meanwhile are merged against, not lost.
pub async fn sync_once(store: &SharedStore, source: &dyn RemoteSource) -> ReconcileOutcome {
    match source.fetch_quotes().await {
        Ok(remote) => {
            debug!("Fetched {} quotes from server", remote.len());
            store.lock().await.merge_remote(remote).await
        }
        Err(e) => {
            warn!("Sync error: {}", e);
            ReconcileOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// Handle to a running sync loop. Dropping it aborts the loop.
pub struct SyncHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    outcomes: mpsc::UnboundedReceiver<ReconcileOutcome>,
}

impl SyncHandle {
    /// Waits for the next reconciliation to finish. Returns `None` once the
    /// loop has stopped and every outcome has been read.
    pub async fn next_outcome(&mut self) -> Option<ReconcileOutcome> {
        self.outcomes.recv().await
    }

    /// Stops the loop and waits for an in-flight reconciliation to finish.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Loop may already be gone
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!("Sync task ended abnormally: {}", e);
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Reconciles immediately and then every `interval` until stopped.
pub fn schedule(
    store: SharedStore,
    source: Arc<dyn RemoteSource>,
    interval: Duration,
) -> SyncHandle {
    let interval = interval.max(MIN_INTERVAL);
    let (stop_tx, mut stop_rx) = oneshot::channel();
    let (outcome_tx, outcomes) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!("Sync scheduled every {:?}", interval);

        loop {
            tokio::select! {
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {
                    let outcome = sync_once(&store, source.as_ref()).await;
                    if outcome_tx.send(outcome).is_err() {
                        debug!("Sync outcome receiver dropped");
                    }
                }
            }
        }
        debug!("Sync loop stopped");
    });

    SyncHandle {
        stop_tx: Some(stop_tx),
        task: Some(task),
        outcomes,
    }
}
