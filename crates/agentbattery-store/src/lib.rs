//! Agent Battery Store - Local record persistence
//!
//! SQLite-based storage for:
//! - Accounts and their health
//! - Usage snapshot timeseries (append-only)
//! - Sync run audit trail
//! - App settings (single row)
//! - Notification dedup state
//!
//! ## Architecture
//!
//! This crate implements the `IRecordStore` port from
//! `agentbattery-core` using SQLite as the storage backend. It is a
//! driven (secondary) adapter in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteRecordStore`] - Full `IRecordStore` implementation
//! - [`StoreError`] - Error types for store operations

pub mod pool;
pub mod repository;

pub use pool::DatabasePool;
pub use repository::SqliteRecordStore;

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

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
