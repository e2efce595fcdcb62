use super::ui;
use crate::core::sync::{self, SharedStore};
use crate::core::{ReconcileOutcome, RemoteSource};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Runs a single sync with a spinner. A failed sync is an error.
pub async fn sync_now(store: &SharedStore, source: &dyn RemoteSource) -> Result<()> {
    let pb = ui::new_spinner("Syncing with server...");
    let outcome = sync::sync_once(store, source).await;
    pb.finish_and_clear();

    println!("{}", ui::sync_notification(&outcome));
    if let ReconcileOutcome::Failed { reason } = outcome {
        anyhow::bail!("Sync failed: {reason}");
    }
    Ok(())
}

/// Keeps syncing on `interval` until interrupted with Ctrl-C.
pub async fn watch(
    store: SharedStore,
    source: Arc<dyn RemoteSource>,
    interval: Duration,
) -> Result<()> {
    println!(
        "{}",
        ui::style_text(
            &format!("Syncing every {}s. Press Ctrl-C to stop.", interval.as_secs()),
            ui::StyleType::Subtle
        )
    );
    let mut handle = sync::schedule(store, source, interval);

    loop {
        tokio::select! {
            outcome = handle.next_outcome() => match outcome {
                Some(outcome) => println!("{}", ui::sync_notification(&outcome)),
                None => break,
            },
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Interrupted, stopping sync");
                break;
            }
        }
    }

    handle.stop().await;
    Ok(())
}
