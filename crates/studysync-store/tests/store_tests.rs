//! Integration tests for SqliteDocumentStore and SqliteResponseCache
//!
//! These tests verify the document store and response cache ports using an
//! in-memory SQLite database. Each test function creates a fresh database
//! to ensure test isolation.

use chrono::Utc;
use serde_json::json;
use url::Url;

use studysync_core::domain::{
    CachePartition, CachedResponse, Collection, DocumentId, DocumentKey, GenerationTag,
    LocalDocument, RequestKey, SyncAction, UserId,
};
use studysync_core::ports::{IDocumentStore, IResponseCache};
use studysync_store::{SqliteDocumentStore, SqliteResponseCache, StorePool};

// ============================================================================
// Test helpers
// ============================================================================

/// Create a fresh in-memory store for each test
async fn setup() -> (SqliteDocumentStore, SqliteResponseCache) {
    let pool = StorePool::in_memory()
        .await
        .expect("Failed to create in-memory store");
    (
        SqliteDocumentStore::new(pool.pool().clone()),
        SqliteResponseCache::new(pool.pool().clone()),
    )
}

fn test_question(owner: UserId) -> LocalDocument {
    LocalDocument::mirrored(
        Collection::Questions,
        DocumentId::new().into(),
        owner,
        json!({"text": "Explain photosynthesis", "subject": "biology"}),
    )
}

fn test_cached_response(url: &str, partition: CachePartition, generation: &str) -> CachedResponse {
    let url = Url::parse(url).unwrap();
    CachedResponse {
        key: RequestKey::get(&url),
        partition,
        generation: GenerationTag::new(generation).unwrap(),
        status: 200,
        content_type: Some("application/json".to_string()),
        headers: vec![("cache-control".to_string(), "no-cache".to_string())],
        body: br#"{"items":[]}"#.to_vec(),
        inserted_at: Utc::now(),
    }
}

// ============================================================================
// Document tests
// ============================================================================

#[tokio::test]
async fn test_put_and_get_document() {
    let (store, _) = setup().await;
    let doc = test_question(UserId::new());

    store.put(&doc).await.unwrap();

    let retrieved = store
        .get(Collection::Questions, doc.key())
        .await
        .unwrap()
        .expect("document should exist");
    assert_eq!(retrieved.key(), doc.key());
    assert_eq!(retrieved.payload()["subject"], "biology");
    assert!(!retrieved.is_offline());
    assert!(!retrieved.is_sync_pending());
}

#[tokio::test]
async fn test_get_missing_document_returns_none() {
    let (store, _) = setup().await;
    let key: DocumentKey = DocumentId::new().into();

    let result = store.get(Collection::Questions, &key).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_put_overwrites_silently() {
    let (store, _) = setup().await;
    let mut doc = test_question(UserId::new());
    store.put(&doc).await.unwrap();

    // Last-writer-wins: same key, new payload, no conflict error.
    doc.update_payload(json!({"text": "Explain osmosis", "subject": "biology"}));
    store.put(&doc).await.unwrap();

    let all = store.get_all(Collection::Questions, None).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].payload()["text"], "Explain osmosis");
}

#[tokio::test]
async fn test_get_all_filters_by_owner() {
    let (store, _) = setup().await;
    let alice = UserId::new();
    let bob = UserId::new();

    store.put(&test_question(alice)).await.unwrap();
    store.put(&test_question(alice)).await.unwrap();
    store.put(&test_question(bob)).await.unwrap();

    let alices = store
        .get_all(Collection::Questions, Some(&alice))
        .await
        .unwrap();
    assert_eq!(alices.len(), 2);
    assert!(alices.iter().all(|d| d.owner() == &alice));

    let everyone = store.get_all(Collection::Questions, None).await.unwrap();
    assert_eq!(everyone.len(), 3);
}

#[tokio::test]
async fn test_get_all_empty_collection_returns_empty_vec() {
    let (store, _) = setup().await;
    let result = store.get_all(Collection::Quizzes, None).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (store, _) = setup().await;
    let doc = test_question(UserId::new());
    store.put(&doc).await.unwrap();

    store.delete(Collection::Questions, doc.key()).await.unwrap();
    // Deleting again is a no-op, not an error.
    store.delete(Collection::Questions, doc.key()).await.unwrap();

    assert!(store
        .get(Collection::Questions, doc.key())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_favorites_composite_key() {
    let (store, _) = setup().await;
    let user = UserId::new();
    let question = DocumentId::new();
    let key = DocumentKey::favorite(user, question);
    let doc = LocalDocument::mirrored(
        Collection::Favorites,
        key,
        user,
        json!({"user_id": user.to_string(), "question_id": question.to_string()}),
    );

    store.put(&doc).await.unwrap();

    let retrieved = store.get(Collection::Favorites, &key).await.unwrap();
    assert!(retrieved.is_some());

    store.delete(Collection::Favorites, &key).await.unwrap();
    assert!(store.get(Collection::Favorites, &key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_mark_synced_clears_flags() {
    let (store, _) = setup().await;
    let owner = UserId::new();
    let doc = LocalDocument::authored_offline(
        Collection::QuizAttempts,
        DocumentId::new().into(),
        owner,
        json!({"score": 8, "total": 10}),
    );
    store.put(&doc).await.unwrap();

    store
        .mark_synced(Collection::QuizAttempts, doc.key())
        .await
        .unwrap();

    let retrieved = store
        .get(Collection::QuizAttempts, doc.key())
        .await
        .unwrap()
        .unwrap();
    assert!(!retrieved.is_offline());
    assert!(!retrieved.is_sync_pending());
}

// ============================================================================
// Pending-operation queue tests
// ============================================================================

#[tokio::test]
async fn test_enqueue_assigns_increasing_ids() {
    let (store, _) = setup().await;

    let a = store
        .enqueue_pending(SyncAction::Create(Collection::Questions), json!({"n": 1}))
        .await
        .unwrap();
    let b = store
        .enqueue_pending(SyncAction::Create(Collection::Questions), json!({"n": 2}))
        .await
        .unwrap();
    let c = store
        .enqueue_pending(SyncAction::Create(Collection::QuizAttempts), json!({"n": 3}))
        .await
        .unwrap();

    assert!(a < b && b < c);
}

#[tokio::test]
async fn test_list_pending_preserves_insertion_order() {
    let (store, _) = setup().await;

    for n in 0..5 {
        store
            .enqueue_pending(SyncAction::Create(Collection::Questions), json!({"n": n}))
            .await
            .unwrap();
    }

    let pending = store.list_pending().await.unwrap();
    assert_eq!(pending.len(), 5);
    for (idx, op) in pending.iter().enumerate() {
        assert_eq!(op.payload["n"], idx as i64);
    }
    // Ids are strictly increasing in listing order.
    assert!(pending.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn test_remove_pending_is_idempotent() {
    let (store, _) = setup().await;

    let id = store
        .enqueue_pending(SyncAction::UploadFile, json!({"path": "uploads/a.png"}))
        .await
        .unwrap();

    store.remove_pending(id).await.unwrap();
    store.remove_pending(id).await.unwrap();

    assert!(store.list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pending_roundtrips_action_and_payload() {
    let (store, _) = setup().await;

    store
        .enqueue_pending(
            SyncAction::Delete(Collection::Favorites),
            json!({"user_id": UserId::new().to_string()}),
        )
        .await
        .unwrap();

    let pending = store.list_pending().await.unwrap();
    assert_eq!(pending[0].action, SyncAction::Delete(Collection::Favorites));
    assert!(pending[0].payload.get("user_id").is_some());
}

// ============================================================================
// Response cache tests
// ============================================================================

#[tokio::test]
async fn test_cache_put_and_get_byte_identical() {
    let (_, cache) = setup().await;
    let entry = test_cached_response(
        "https://project.example.co/rest/v1/questions?select=*",
        CachePartition::Dynamic,
        "v1",
    );

    cache.put(&entry).await.unwrap();

    let retrieved = cache
        .get(CachePartition::Dynamic, &entry.key)
        .await
        .unwrap()
        .expect("entry should exist");
    assert_eq!(retrieved.body, entry.body);
    assert_eq!(retrieved.status, entry.status);
    assert_eq!(retrieved.content_type, entry.content_type);
    assert_eq!(retrieved.headers, entry.headers);
}

#[tokio::test]
async fn test_cache_miss_is_none_not_error() {
    let (_, cache) = setup().await;
    let url = Url::parse("https://example.com/never-cached").unwrap();

    let result = cache
        .get(CachePartition::Static, &RequestKey::get(&url))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_cache_partitions_are_independent() {
    let (_, cache) = setup().await;
    let entry = test_cached_response("https://example.com/app.js", CachePartition::Dynamic, "v1");

    cache.put(&entry).await.unwrap();

    // Same key, other partition: miss.
    assert!(cache
        .get(CachePartition::Static, &entry.key)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_cache_put_replaces_existing_entry() {
    let (_, cache) = setup().await;
    let mut entry = test_cached_response("https://example.com/data", CachePartition::Dynamic, "v1");
    cache.put(&entry).await.unwrap();

    entry.body = br#"{"items":[1,2,3]}"#.to_vec();
    cache.put(&entry).await.unwrap();

    let retrieved = cache
        .get(CachePartition::Dynamic, &entry.key)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(retrieved.body, br#"{"items":[1,2,3]}"#.to_vec());
}

#[tokio::test]
async fn test_purge_retires_only_stale_generations() {
    let (_, cache) = setup().await;
    let current = GenerationTag::new("v2").unwrap();

    cache
        .put(&test_cached_response(
            "https://example.com/old.js",
            CachePartition::Static,
            "v1",
        ))
        .await
        .unwrap();
    cache
        .put(&test_cached_response(
            "https://example.com/new.js",
            CachePartition::Static,
            "v2",
        ))
        .await
        .unwrap();

    let purged = cache.purge_generations_except(&current).await.unwrap();
    assert_eq!(purged, 1);

    let old_url = Url::parse("https://example.com/old.js").unwrap();
    let new_url = Url::parse("https://example.com/new.js").unwrap();
    assert!(cache
        .get(CachePartition::Static, &RequestKey::get(&old_url))
        .await
        .unwrap()
        .is_none());
    assert!(cache
        .get(CachePartition::Static, &RequestKey::get(&new_url))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_purge_is_idempotent() {
    let (_, cache) = setup().await;
    let current = GenerationTag::new("v2").unwrap();

    cache
        .put(&test_cached_response(
            "https://example.com/old.js",
            CachePartition::Static,
            "v1",
        ))
        .await
        .unwrap();

    let first = cache.purge_generations_except(&current).await.unwrap();
    let second = cache.purge_generations_except(&current).await.unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 0);
}

// ============================================================================
// clear_all tests
// ============================================================================

#[tokio::test]
async fn test_clear_all_empties_every_partition() {
    let (store, cache) = setup().await;
    let owner = UserId::new();

    store.put(&test_question(owner)).await.unwrap();
    store
        .put(&LocalDocument::mirrored(
            Collection::Quizzes,
            DocumentId::new().into(),
            owner,
            json!({"title": "Biology basics"}),
        ))
        .await
        .unwrap();
    store
        .enqueue_pending(SyncAction::Create(Collection::Questions), json!({}))
        .await
        .unwrap();
    cache
        .put(&test_cached_response(
            "https://example.com/",
            CachePartition::Static,
            "v1",
        ))
        .await
        .unwrap();

    store.clear_all().await.unwrap();

    for collection in Collection::ALL {
        assert!(
            store.get_all(collection, None).await.unwrap().is_empty(),
            "collection {collection} should be empty"
        );
    }
    assert!(store.list_pending().await.unwrap().is_empty());
    let url = Url::parse("https://example.com/").unwrap();
    assert!(cache
        .get(CachePartition::Static, &RequestKey::get(&url))
        .await
        .unwrap()
        .is_none());
}
