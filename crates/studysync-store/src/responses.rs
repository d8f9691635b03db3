//! SQLite implementation of IResponseCache
//!
//! Cached HTTP responses are keyed by `(partition, request identity)`.
//! Bodies are stored as BLOBs; header pairs are serialized as JSON.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use studysync_core::domain::{CachePartition, CachedResponse, GenerationTag, RequestKey};
use studysync_core::ports::IResponseCache;

use crate::StoreError;

/// SQLite-based implementation of the response cache port
pub struct SqliteResponseCache {
    pool: SqlitePool,
}

impl SqliteResponseCache {
    /// Creates a new cache instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Reconstruct a CachedResponse from a database row
fn response_from_row(row: &SqliteRow) -> Result<CachedResponse, StoreError> {
    let partition_str: String = row.get("partition_name");
    let key_str: String = row.get("request_key");
    let generation_str: String = row.get("generation");
    let status: i64 = row.get("status");
    let content_type: Option<String> = row.get("content_type");
    let headers_str: String = row.get("headers");
    let body: Vec<u8> = row.get("body");
    let inserted_at_str: String = row.get("inserted_at");

    let partition = CachePartition::from_name(&partition_str).map_err(|e| {
        StoreError::SerializationError(format!("Invalid partition '{partition_str}': {e}"))
    })?;
    let key = RequestKey::from_str(&key_str).map_err(|e| {
        StoreError::SerializationError(format!("Invalid request key '{key_str}': {e}"))
    })?;
    let generation = GenerationTag::new(generation_str.clone()).map_err(|e| {
        StoreError::SerializationError(format!("Invalid generation '{generation_str}': {e}"))
    })?;
    let headers: Vec<(String, String)> = serde_json::from_str(&headers_str)
        .map_err(|e| StoreError::SerializationError(format!("Invalid headers JSON: {e}")))?;
    let inserted_at = DateTime::parse_from_rfc3339(&inserted_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StoreError::SerializationError(format!(
                "Failed to parse datetime '{inserted_at_str}': {e}"
            ))
        })?;

    Ok(CachedResponse {
        key,
        partition,
        generation,
        status: status as u16,
        content_type,
        headers,
        body,
        inserted_at,
    })
}

#[async_trait::async_trait]
impl IResponseCache for SqliteResponseCache {
    async fn get(
        &self,
        partition: CachePartition,
        key: &RequestKey,
    ) -> anyhow::Result<Option<CachedResponse>> {
        let row = sqlx::query(
            "SELECT * FROM cached_responses WHERE partition_name = ? AND request_key = ?",
        )
        .bind(partition.name())
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(response_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, entry: &CachedResponse) -> anyhow::Result<()> {
        let headers = serde_json::to_string(&entry.headers)
            .map_err(|e| anyhow::anyhow!("Failed to serialize headers: {}", e))?;

        sqlx::query(
            "INSERT OR REPLACE INTO cached_responses \
             (partition_name, request_key, generation, status, content_type, \
              headers, body, inserted_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.partition.name())
        .bind(entry.key.as_str())
        .bind(entry.generation.as_str())
        .bind(entry.status as i64)
        .bind(&entry.content_type)
        .bind(&headers)
        .bind(&entry.body)
        .bind(entry.inserted_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::trace!(
            partition = entry.partition.name(),
            key = %entry.key,
            status = entry.status,
            "Cached response"
        );
        Ok(())
    }

    async fn purge_generations_except(&self, current: &GenerationTag) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM cached_responses WHERE generation != ?")
            .bind(current.as_str())
            .execute(&self.pool)
            .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            tracing::info!(
                generation = current.as_str(),
                purged,
                "Retired stale cache generations"
            );
        }
        Ok(purged)
    }
}
