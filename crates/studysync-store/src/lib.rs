//! Studysync Store - Durable local persistence
//!
//! SQLite-based store for:
//! - Mirrored document collections (questions, generated content, quizzes,
//!   quiz questions, quiz attempts, favorites)
//! - The FIFO pending-operation queue
//! - Cached HTTP responses in `static`/`dynamic` partitions
//!
//! ## Architecture
//!
//! This crate implements the `IDocumentStore` and `IResponseCache` ports
//! from `studysync-core` using SQLite as the storage backend. It is a
//! driven (secondary) adapter in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`StorePool`] - Connection pool with versioned schema migration
//! - [`SqliteDocumentStore`] - Full `IDocumentStore` implementation
//! - [`SqliteResponseCache`] - Full `IResponseCache` implementation
//! - [`NullDocumentStore`] / [`NullResponseCache`] - No-op stand-ins for
//!   degraded online-only mode when persistent storage is unavailable
//! - [`StoreError`] - Error types for store operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use studysync_store::{SqliteDocumentStore, StorePool};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = StorePool::open(Path::new("/home/user/.local/share/studysync/studysync.db")).await?;
//! let store = SqliteDocumentStore::new(pool.pool().clone());
//! // Use store as IDocumentStore...
//! # Ok(())
//! # }
//! ```

pub mod documents;
pub mod null;
pub mod pool;
pub mod responses;

pub use documents::SqliteDocumentStore;
pub use null::{NullDocumentStore, NullResponseCache};
pub use pool::StorePool;
pub use responses::SqliteResponseCache;

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The platform denied persistent storage; offline features degrade
    /// to online-only operation, the application keeps running
    #[error("Persistent storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization or deserialization of domain types failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
