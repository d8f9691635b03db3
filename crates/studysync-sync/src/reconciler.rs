//! Sync reconciler - replays queued offline mutations against the network
//!
//! Each run takes one snapshot of the pending queue and walks it in FIFO
//! order. A confirmed success removes the entry and clears the matching
//! document's `sync_pending` flag; any failure leaves the entry queued for
//! the next run and moves on. A single failing operation never aborts the
//! run.
//!
//! ## Concurrency
//!
//! Only one run is active at a time: `drain()` holds an async mutex for
//! the whole run, so overlapping callers serialize and each entry is
//! submitted at most once per run. Triggers arriving mid-run are coalesced
//! through a [`Notify`] permit and start exactly one follow-up run once
//! the current one completes. In-flight replays are allowed to finish
//! rather than being aborted on shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use studysync_core::domain::SyncTag;
use studysync_core::ports::{IBackendGateway, IDocumentStore, IPlatformBridge, ReplayOutcome};

/// Summary of one reconciliation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Queue entries in the snapshot
    pub processed: usize,
    /// Entries confirmed and removed
    pub succeeded: usize,
    /// Entries left queued for the next run
    pub failed: usize,
}

/// Replays the pending-operation queue against the backend
pub struct Reconciler {
    store: Arc<dyn IDocumentStore>,
    gateway: Arc<dyn IBackendGateway>,
    /// Serializes runs; held for the duration of one drain
    run_gate: Mutex<()>,
    /// Coalesced trigger signal for the background task
    wakeup: Notify,
}

impl Reconciler {
    /// Creates a reconciler over the given store and gateway
    pub fn new(store: Arc<dyn IDocumentStore>, gateway: Arc<dyn IBackendGateway>) -> Self {
        Self {
            store,
            gateway,
            run_gate: Mutex::new(()),
            wakeup: Notify::new(),
        }
    }

    /// Requests a reconciliation run
    ///
    /// Safe to call from any context. Multiple triggers while a run is in
    /// progress coalesce into a single follow-up run.
    pub fn trigger(&self) {
        debug!("Reconciliation triggered");
        self.wakeup.notify_one();
    }

    /// Registers the named background-sync tags with the platform scheduler
    ///
    /// Best-effort: registration failures only cost timeliness, never
    /// correctness, so they are logged and ignored.
    pub async fn register_background_tags(bridge: &dyn IPlatformBridge) {
        for tag in SyncTag::ALL {
            match bridge.register_sync_tag(tag.name()).await {
                Ok(()) => debug!(tag = tag.name(), "Registered background sync tag"),
                Err(e) => warn!(tag = tag.name(), error = %e, "Background sync registration failed"),
            }
        }
    }

    /// Performs one reconciliation run over a snapshot of the queue
    ///
    /// Operations enqueued while the run is in progress are not part of
    /// the snapshot; they are processed on the next run.
    pub async fn drain(&self) -> anyhow::Result<DrainReport> {
        let _guard = self.run_gate.lock().await;

        let snapshot = self
            .store
            .list_pending()
            .await
            .context("Failed to read pending queue")?;

        if snapshot.is_empty() {
            debug!("Pending queue empty, nothing to reconcile");
            return Ok(DrainReport::default());
        }

        info!(count = snapshot.len(), "Starting reconciliation run");

        let mut succeeded = 0usize;
        let mut failed = 0usize;

        for operation in &snapshot {
            match self.gateway.replay(operation).await {
                Ok(ReplayOutcome::Confirmed) => {
                    // Removal is idempotent; a failure here only means the
                    // entry is retried (and re-confirmed) next run.
                    if let Err(e) = self.store.remove_pending(operation.id).await {
                        warn!(id = operation.id, error = %e, "Failed to remove confirmed operation");
                    }
                    if let Some((collection, key)) = operation.document_ref() {
                        if let Err(e) = self.store.mark_synced(collection, &key).await {
                            warn!(
                                collection = collection.name(),
                                key = %key,
                                error = %e,
                                "Failed to clear sync_pending flag"
                            );
                        }
                    }
                    debug!(id = operation.id, action = %operation.action, "Operation confirmed");
                    succeeded += 1;
                }
                Ok(ReplayOutcome::Retry(reason)) => {
                    debug!(
                        id = operation.id,
                        action = %operation.action,
                        reason = %reason,
                        "Operation not confirmed, left queued"
                    );
                    failed += 1;
                }
                Err(e) => {
                    debug!(
                        id = operation.id,
                        action = %operation.action,
                        error = %e,
                        "Replay failed, left queued"
                    );
                    failed += 1;
                }
            }
        }

        let report = DrainReport {
            processed: snapshot.len(),
            succeeded,
            failed,
        };

        info!(
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            "Reconciliation run complete"
        );

        Ok(report)
    }

    /// Background task: drains once per coalesced trigger until shutdown
    ///
    /// A trigger that arrives mid-drain is stored as a permit, so the loop
    /// immediately runs again after the current drain completes — exactly
    /// one follow-up run regardless of how many triggers arrived.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!("Reconciler task started");

        loop {
            tokio::select! {
                _ = self.wakeup.notified() => {
                    if let Err(e) = self.drain().await {
                        warn!(error = %e, "Reconciliation run failed");
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Reconciler task shutting down");
                    break;
                }
            }
        }
    }
}
