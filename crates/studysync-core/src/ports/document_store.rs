//! Document store port (driven/secondary port)
//!
//! This module defines the interface for the durable local store: the
//! mirrored document collections and the pending-operation queue.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, in-memory, etc.) and don't need domain-level classification;
//!   the one classified failure, `StorageUnavailable`, occurs at open time
//!   before any trait object exists.
//! - All operations are asynchronous but the backing engine serializes
//!   writes per partition, so callers need no extra locking.
//! - Deletes are idempotent throughout: removing a missing document or
//!   queue entry is not an error.

use serde_json::Value;

use crate::domain::{Collection, DocumentKey, LocalDocument, PendingOperation, SyncAction, UserId};

/// Port trait for the durable local store
///
/// Covers the mirrored document collections and the ordered
/// pending-operation queue. Writes are last-writer-wins with no conflict
/// detection; two actors editing the same record produce whichever write
/// lands last.
#[async_trait::async_trait]
pub trait IDocumentStore: Send + Sync {
    // --- Document operations ---

    /// Upserts a document by its primary key (silent overwrite)
    async fn put(&self, document: &LocalDocument) -> anyhow::Result<()>;

    /// Retrieves a single document, `None` when absent
    async fn get(
        &self,
        collection: Collection,
        key: &DocumentKey,
    ) -> anyhow::Result<Option<LocalDocument>>;

    /// Full or owner-filtered scan of a collection
    ///
    /// Returns an empty vector (not an error) when the collection is empty.
    async fn get_all(
        &self,
        collection: Collection,
        owner: Option<&UserId>,
    ) -> anyhow::Result<Vec<LocalDocument>>;

    /// Deletes a document; deleting a missing key is a no-op
    async fn delete(&self, collection: Collection, key: &DocumentKey) -> anyhow::Result<()>;

    /// Clears the `sync_pending` and `offline` flags after server confirmation
    async fn mark_synced(&self, collection: Collection, key: &DocumentKey) -> anyhow::Result<()>;

    // --- Pending-operation queue ---

    /// Appends to the queue, returning the assigned monotonically
    /// increasing id
    async fn enqueue_pending(&self, action: SyncAction, payload: Value) -> anyhow::Result<i64>;

    /// Returns the full queue in insertion order
    async fn list_pending(&self) -> anyhow::Result<Vec<PendingOperation>>;

    /// Removes a queue entry; removing a missing id is a no-op
    async fn remove_pending(&self, id: i64) -> anyhow::Result<()>;

    // --- Maintenance ---

    /// Wipes every partition, including the queue and the response cache
    ///
    /// Used only by the explicit user data-reset action.
    async fn clear_all(&self) -> anyhow::Result<()>;
}
