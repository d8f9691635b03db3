//! Database connection pool management
//!
//! Provides a wrapper around SQLx's SqlitePool with:
//! - Automatic directory creation for database files
//! - WAL journal mode for concurrent reads
//! - Versioned, non-destructive schema migration on first connection
//! - In-memory mode for testing

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::StoreError;

/// Schema migration scripts, one per version, applied in order.
///
/// Each script only creates objects that do not yet exist, so applying a
/// later script to an older database adds the missing partitions without
/// touching existing data.
const MIGRATIONS: &[&str] = &[
    include_str!("migrations/0001_documents.sql"),
    include_str!("migrations/0002_response_cache.sql"),
];

/// Manages a pool of SQLite connections for studysync persistence
///
/// The pool is configured with:
/// - WAL journal mode for concurrent read access
/// - 5 max connections for file-based databases
/// - 1 connection for in-memory databases (required for data persistence)
/// - 5-second busy timeout to handle write contention
pub struct StorePool {
    pool: SqlitePool,
}

impl StorePool {
    /// Opens (creating on first use) the store at the specified file
    ///
    /// This will:
    /// 1. Create parent directories if they don't exist
    /// 2. Create the database file if it doesn't exist
    /// 3. Enable WAL journal mode
    /// 4. Apply any schema migrations newer than the on-disk version
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageUnavailable` if the platform denies
    /// persistent storage (directory creation or connection failure), or
    /// `StoreError::MigrationFailed` if schema migrations fail.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::StorageUnavailable(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::StorageUnavailable(format!(
                    "Failed to open store at {}: {}",
                    db_path.display(),
                    e
                ))
            })?;

        Self::run_migrations(&pool).await?;

        tracing::info!(
            path = %db_path.display(),
            "Store pool initialized"
        );

        Ok(Self { pool })
    }

    /// Creates an in-memory store for testing
    ///
    /// Uses a single connection to ensure data persistence across queries
    /// (SQLite in-memory databases are per-connection).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageUnavailable` if the connection cannot be
    /// established, or `StoreError::MigrationFailed` if migrations fail.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                StoreError::StorageUnavailable(format!(
                    "Failed to create in-memory store: {}",
                    e
                ))
            })?;

        Self::run_migrations(&pool).await?;

        tracing::debug!("In-memory store pool initialized");

        Ok(Self { pool })
    }

    /// Returns a reference to the underlying SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies migrations newer than the on-disk schema version
    ///
    /// The on-disk version is tracked in `PRAGMA user_version`. Existing
    /// partitions are never dropped or rewritten; upgrade only runs the
    /// scripts the database has not seen yet.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
        let current: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(pool)
            .await
            .map_err(|e| {
                StoreError::MigrationFailed(format!("Failed to read schema version: {}", e))
            })?;

        let target = MIGRATIONS.len() as i64;
        if current >= target {
            tracing::debug!(version = current, "Store schema up to date");
            return Ok(());
        }

        for (idx, script) in MIGRATIONS.iter().enumerate() {
            let version = idx as i64 + 1;
            if version <= current {
                continue;
            }
            sqlx::raw_sql(script).execute(pool).await.map_err(|e| {
                StoreError::MigrationFailed(format!(
                    "Failed to apply migration {}: {}",
                    version, e
                ))
            })?;
            tracing::debug!(version, "Applied store migration");
        }

        sqlx::raw_sql(&format!("PRAGMA user_version = {target}"))
            .execute(pool)
            .await
            .map_err(|e| {
                StoreError::MigrationFailed(format!("Failed to record schema version: {}", e))
            })?;

        tracing::debug!(from = current, to = target, "Store migrations completed");
        Ok(())
    }
}
