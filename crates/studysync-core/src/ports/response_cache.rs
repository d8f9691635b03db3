//! Response cache port (driven/secondary port)
//!
//! Interface for the HTTP response cache consulted by the request router.
//! A cache miss is `Ok(None)`, never an error.

use crate::domain::{CachePartition, CachedResponse, GenerationTag, RequestKey};

/// Port trait for cached HTTP responses
///
/// Entries are keyed by `(partition, request identity)`; `put` replaces any
/// existing entry under the same key. Generation tags group static entries
/// into cohorts so a new deployment can retire its predecessors in one pass.
#[async_trait::async_trait]
pub trait IResponseCache: Send + Sync {
    /// Looks up a cached response; `Ok(None)` on miss
    async fn get(
        &self,
        partition: CachePartition,
        key: &RequestKey,
    ) -> anyhow::Result<Option<CachedResponse>>;

    /// Stores (or replaces) a response copy
    async fn put(&self, entry: &CachedResponse) -> anyhow::Result<()>;

    /// Deletes every entry whose generation differs from `current`
    ///
    /// Returns the number of entries removed. Idempotent: activating the
    /// same generation twice retires nothing the second time.
    async fn purge_generations_except(&self, current: &GenerationTag) -> anyhow::Result<u64>;
}
