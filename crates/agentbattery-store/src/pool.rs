//! SQLite connection pooling
//!
//! [`DatabasePool`] opens the battery database, applies the embedded
//! schema on connect, and hands out the underlying [`SqlitePool`].
//! File-backed pools run in WAL mode with a busy timeout so the daemon
//! and CLI can share one database file.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::StoreError;

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pooled handle to the Agent Battery database
#[derive(Clone)]
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Opens the database at `db_path`, creating the file and its parent
    /// directories as needed, and applies the schema
    pub async fn new(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::ConnectionFailed(format!(
                    "Could not create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::ConnectionFailed(format!(
                    "Could not open {}: {}",
                    db_path.display(),
                    e
                ))
            })?;
        Self::apply_schema(&pool).await?;

        info!(path = %db_path.display(), "Database ready");
        Ok(Self { pool })
    }

    /// Opens a private in-memory database for tests
    ///
    /// Pinned to a single connection: every SQLite in-memory connection
    /// is its own database, so a second one would come up empty.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                StoreError::ConnectionFailed(format!("Could not open in-memory database: {}", e))
            })?;
        Self::apply_schema(&pool).await?;

        debug!("In-memory database ready");
        Ok(Self { pool })
    }

    /// The underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs the embedded schema script; idempotent (`IF NOT EXISTS`)
    async fn apply_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::raw_sql(include_str!("migrations/20260815_initial.sql"))
            .execute(pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("Schema setup failed: {}", e)))?;
        Ok(())
    }
}
