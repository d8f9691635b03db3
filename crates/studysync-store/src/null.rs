//! No-op store implementations for degraded online-only mode
//!
//! When the platform denies persistent storage the application must keep
//! working online-only. These stand-ins satisfy the store ports with
//! always-miss reads and discarded writes so the router and reconciler run
//! unchanged against them.

use serde_json::Value;

use studysync_core::domain::{
    CachePartition, CachedResponse, Collection, DocumentKey, GenerationTag, LocalDocument,
    PendingOperation, RequestKey, SyncAction, UserId,
};
use studysync_core::ports::{IDocumentStore, IResponseCache};

/// Document store that persists nothing
pub struct NullDocumentStore;

#[async_trait::async_trait]
impl IDocumentStore for NullDocumentStore {
    async fn put(&self, _document: &LocalDocument) -> anyhow::Result<()> {
        Ok(()) // Discard
    }

    async fn get(
        &self,
        _collection: Collection,
        _key: &DocumentKey,
    ) -> anyhow::Result<Option<LocalDocument>> {
        Ok(None) // Always miss
    }

    async fn get_all(
        &self,
        _collection: Collection,
        _owner: Option<&UserId>,
    ) -> anyhow::Result<Vec<LocalDocument>> {
        Ok(Vec::new())
    }

    async fn delete(&self, _collection: Collection, _key: &DocumentKey) -> anyhow::Result<()> {
        Ok(())
    }

    async fn mark_synced(
        &self,
        _collection: Collection,
        _key: &DocumentKey,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn enqueue_pending(&self, _action: SyncAction, _payload: Value) -> anyhow::Result<i64> {
        // Nothing is queued; mutations made offline in degraded mode are lost.
        Ok(0)
    }

    async fn list_pending(&self) -> anyhow::Result<Vec<PendingOperation>> {
        Ok(Vec::new())
    }

    async fn remove_pending(&self, _id: i64) -> anyhow::Result<()> {
        Ok(())
    }

    async fn clear_all(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Response cache that caches nothing
pub struct NullResponseCache;

#[async_trait::async_trait]
impl IResponseCache for NullResponseCache {
    async fn get(
        &self,
        _partition: CachePartition,
        _key: &RequestKey,
    ) -> anyhow::Result<Option<CachedResponse>> {
        Ok(None) // Always miss
    }

    async fn put(&self, _entry: &CachedResponse) -> anyhow::Result<()> {
        Ok(()) // Discard
    }

    async fn purge_generations_except(&self, _current: &GenerationTag) -> anyhow::Result<u64> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_null_document_store_always_misses() {
        let store = NullDocumentStore;
        let id = store
            .enqueue_pending(SyncAction::Create(Collection::Questions), json!({}))
            .await
            .unwrap();
        assert_eq!(id, 0);
        assert!(store.list_pending().await.unwrap().is_empty());
        assert!(store
            .get_all(Collection::Questions, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_null_response_cache_always_misses() {
        let cache = NullResponseCache;
        let url = url::Url::parse("https://example.com/").unwrap();
        let key = RequestKey::get(&url);
        assert!(cache
            .get(CachePartition::Static, &key)
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            cache
                .purge_generations_except(&GenerationTag::new("v1").unwrap())
                .await
                .unwrap(),
            0
        );
    }
}
