//! SQLite implementation of IDocumentStore
//!
//! This module provides the concrete SQLite-based implementation of the
//! document store port defined in studysync-core. It handles domain type
//! serialization/deserialization and SQL query construction.
//!
//! ## Type Mapping
//!
//! | Domain Type     | SQL Type | Strategy                                  |
//! |-----------------|----------|-------------------------------------------|
//! | Collection      | TEXT     | Partition name via `.name()` / `from_name` |
//! | DocumentKey     | TEXT     | `.to_string()` / `FromStr` (composite as `user/question`) |
//! | UserId          | TEXT     | UUID string via `.to_string()` / `FromStr` |
//! | SyncAction      | TEXT     | Dotted string via `Display` / `FromStr`   |
//! | payload         | TEXT     | serde_json serialization                  |
//! | DateTime<Utc>   | TEXT     | ISO 8601 via `to_rfc3339()`               |
//! | flags           | INTEGER  | 0/1                                       |

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use studysync_core::domain::{
    Collection, DocumentKey, LocalDocument, PendingOperation, SyncAction, UserId,
};
use studysync_core::ports::IDocumentStore;

use crate::StoreError;

/// SQLite-based implementation of the document store port
///
/// Provides persistent storage for mirrored documents and the
/// pending-operation queue. All operations go through a connection pool;
/// SQLite serializes writes per database, which satisfies the per-partition
/// ordering guarantee.
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Creates a new store instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Helper functions for type conversion
// ============================================================================

/// Parse a DateTime<Utc> from an ISO 8601 string
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StoreError::SerializationError(format!("Failed to parse datetime '{}': {}", s, e))
        })
}

/// Reconstruct a LocalDocument from a database row
fn document_from_row(row: &SqliteRow) -> Result<LocalDocument, StoreError> {
    let collection_str: String = row.get("collection");
    let key_str: String = row.get("doc_key");
    let owner_str: String = row.get("owner_id");
    let payload_str: String = row.get("payload");
    let offline: i64 = row.get("offline");
    let sync_pending: i64 = row.get("sync_pending");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    let collection = Collection::from_name(&collection_str).map_err(|e| {
        StoreError::SerializationError(format!("Invalid collection '{collection_str}': {e}"))
    })?;
    let key = DocumentKey::from_str(&key_str).map_err(|e| {
        StoreError::SerializationError(format!("Invalid document key '{key_str}': {e}"))
    })?;
    let owner = UserId::from_str(&owner_str).map_err(|e| {
        StoreError::SerializationError(format!("Invalid owner id '{owner_str}': {e}"))
    })?;
    let payload: Value = serde_json::from_str(&payload_str)
        .map_err(|e| StoreError::SerializationError(format!("Invalid payload JSON: {e}")))?;
    let created_at = parse_datetime(&created_at_str)?;
    let updated_at = parse_datetime(&updated_at_str)?;

    Ok(LocalDocument::from_parts(
        collection,
        key,
        owner,
        payload,
        offline != 0,
        sync_pending != 0,
        created_at,
        updated_at,
    ))
}

/// Reconstruct a PendingOperation from a database row
fn pending_from_row(row: &SqliteRow) -> Result<PendingOperation, StoreError> {
    let id: i64 = row.get("id");
    let action_str: String = row.get("action");
    let payload_str: String = row.get("payload");
    let enqueued_at_str: String = row.get("enqueued_at");

    let action = SyncAction::from_str(&action_str).map_err(|e| {
        StoreError::SerializationError(format!("Invalid sync action '{action_str}': {e}"))
    })?;
    let payload: Value = serde_json::from_str(&payload_str)
        .map_err(|e| StoreError::SerializationError(format!("Invalid payload JSON: {e}")))?;
    let enqueued_at = parse_datetime(&enqueued_at_str)?;

    Ok(PendingOperation {
        id,
        action,
        payload,
        enqueued_at,
    })
}

// ============================================================================
// IDocumentStore implementation
// ============================================================================

#[async_trait::async_trait]
impl IDocumentStore for SqliteDocumentStore {
    // --- Document operations ---

    async fn put(&self, document: &LocalDocument) -> anyhow::Result<()> {
        let collection = document.collection().name();
        let key = document.key().to_string();
        let owner = document.owner().to_string();
        let payload = serde_json::to_string(document.payload())
            .map_err(|e| anyhow::anyhow!("Failed to serialize payload: {}", e))?;
        let created_at = document.created_at().to_rfc3339();
        let updated_at = document.updated_at().to_rfc3339();

        // Last-writer-wins: an existing row under the same key is replaced
        // without conflict detection.
        sqlx::query(
            "INSERT OR REPLACE INTO documents \
             (collection, doc_key, owner_id, payload, offline, sync_pending, \
              created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(collection)
        .bind(&key)
        .bind(&owner)
        .bind(&payload)
        .bind(document.is_offline() as i64)
        .bind(document.is_sync_pending() as i64)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(&self.pool)
        .await?;

        tracing::trace!(collection, key = %key, "Saved document");
        Ok(())
    }

    async fn get(
        &self,
        collection: Collection,
        key: &DocumentKey,
    ) -> anyhow::Result<Option<LocalDocument>> {
        let row = sqlx::query("SELECT * FROM documents WHERE collection = ? AND doc_key = ?")
            .bind(collection.name())
            .bind(key.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(document_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn get_all(
        &self,
        collection: Collection,
        owner: Option<&UserId>,
    ) -> anyhow::Result<Vec<LocalDocument>> {
        let rows = match owner {
            Some(owner) => {
                sqlx::query(
                    "SELECT * FROM documents WHERE collection = ? AND owner_id = ? \
                     ORDER BY created_at ASC",
                )
                .bind(collection.name())
                .bind(owner.to_string())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT * FROM documents WHERE collection = ? ORDER BY created_at ASC",
                )
                .bind(collection.name())
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut documents = Vec::with_capacity(rows.len());
        for row in &rows {
            documents.push(document_from_row(row)?);
        }

        Ok(documents)
    }

    async fn delete(&self, collection: Collection, key: &DocumentKey) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM documents WHERE collection = ? AND doc_key = ?")
            .bind(collection.name())
            .bind(key.to_string())
            .execute(&self.pool)
            .await?;

        tracing::trace!(collection = collection.name(), key = %key, "Deleted document");
        Ok(())
    }

    async fn mark_synced(&self, collection: Collection, key: &DocumentKey) -> anyhow::Result<()> {
        let updated_at = Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE documents SET offline = 0, sync_pending = 0, updated_at = ? \
             WHERE collection = ? AND doc_key = ?",
        )
        .bind(&updated_at)
        .bind(collection.name())
        .bind(key.to_string())
        .execute(&self.pool)
        .await?;

        tracing::trace!(collection = collection.name(), key = %key, "Marked document synced");
        Ok(())
    }

    // --- Pending-operation queue ---

    async fn enqueue_pending(&self, action: SyncAction, payload: Value) -> anyhow::Result<i64> {
        let action_str = action.to_string();
        let payload_str = serde_json::to_string(&payload)
            .map_err(|e| anyhow::anyhow!("Failed to serialize payload: {}", e))?;
        let enqueued_at = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO pending_operations (action, payload, enqueued_at) VALUES (?, ?, ?)",
        )
        .bind(&action_str)
        .bind(&payload_str)
        .bind(&enqueued_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, action = %action_str, "Enqueued pending operation");
        Ok(id)
    }

    async fn list_pending(&self) -> anyhow::Result<Vec<PendingOperation>> {
        let rows = sqlx::query("SELECT * FROM pending_operations ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        let mut operations = Vec::with_capacity(rows.len());
        for row in &rows {
            operations.push(pending_from_row(row)?);
        }

        Ok(operations)
    }

    async fn remove_pending(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM pending_operations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::trace!(id, "Removed pending operation");
        Ok(())
    }

    // --- Maintenance ---

    async fn clear_all(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM documents")
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM pending_operations")
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM cached_responses")
            .execute(&self.pool)
            .await?;

        tracing::info!("Cleared all local data");
        Ok(())
    }
}
