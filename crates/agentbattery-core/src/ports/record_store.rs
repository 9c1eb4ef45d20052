//! Record store port (driven/secondary port)
//!
//! Persistence for accounts, snapshots, sync runs, settings, and
//! notification dedup state.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite today) and don't need domain-level classification.
//! - Snapshots and sync runs are append-only from the orchestrator's
//!   point of view: snapshots are inserted and only ever read back; a
//!   run row is inserted open and updated exactly once to close it.
//! - Timestamps are absolute instants; all comparisons are instant
//!   arithmetic, never calendar-aware.

use chrono::{DateTime, Utc};

use crate::domain::{
    Account, AccountId, AlertKind, AppSettings, NotificationState, RunId, SyncRun, UsageSnapshot,
};

/// Port trait for persistent record storage
#[async_trait::async_trait]
pub trait IRecordStore: Send + Sync {
    // --- Account operations ---

    /// Saves an account (insert or update)
    async fn save_account(&self, account: &Account) -> anyhow::Result<()>;

    /// Retrieves an account by id
    async fn get_account(&self, id: &AccountId) -> anyhow::Result<Option<Account>>;

    /// Lists all accounts, newest first
    async fn list_accounts(&self) -> anyhow::Result<Vec<Account>>;

    /// Lists accounts with scheduled polling enabled
    async fn list_sync_enabled_accounts(&self) -> anyhow::Result<Vec<Account>>;

    /// Deletes an account and its notification state
    ///
    /// Snapshots and sync runs are audit data and are intentionally NOT
    /// cascaded; orphaned history is acceptable by design.
    async fn delete_account(&self, id: &AccountId) -> anyhow::Result<()>;

    // --- Snapshot operations (append-only) ---

    /// Inserts a usage snapshot
    async fn insert_snapshot(&self, snapshot: &UsageSnapshot) -> anyhow::Result<()>;

    /// Retrieves the most recently fetched snapshot for an account
    async fn latest_snapshot(&self, account_id: &AccountId)
        -> anyhow::Result<Option<UsageSnapshot>>;

    /// Lists snapshots for an account, most recently fetched first
    async fn list_snapshots(
        &self,
        account_id: &AccountId,
        limit: u32,
    ) -> anyhow::Result<Vec<UsageSnapshot>>;

    // --- Sync run operations ---

    /// Inserts a freshly opened sync run
    async fn insert_run(&self, run: &SyncRun) -> anyhow::Result<()>;

    /// Updates a run (used exactly once, to close it)
    async fn update_run(&self, run: &SyncRun) -> anyhow::Result<()>;

    /// Retrieves a run by id
    async fn get_run(&self, id: &RunId) -> anyhow::Result<Option<SyncRun>>;

    /// Lists runs for an account, most recently started first
    async fn list_runs(&self, account_id: &AccountId, limit: u32)
        -> anyhow::Result<Vec<SyncRun>>;

    // --- Settings (single row) ---

    /// Creates the settings row with defaults if it does not exist
    ///
    /// Racing callers must both succeed: "already exists" is success,
    /// not an error.
    async fn ensure_settings(&self) -> anyhow::Result<AppSettings>;

    /// Retrieves the settings row, creating it with defaults if absent
    async fn get_settings(&self) -> anyhow::Result<AppSettings>;

    /// Replaces the settings row
    async fn update_settings(&self, settings: &AppSettings) -> anyhow::Result<AppSettings>;

    // --- Notification dedup state ---

    /// Retrieves the last-sent record for an (account, kind) pair
    async fn get_notification_state(
        &self,
        account_id: &AccountId,
        kind: AlertKind,
    ) -> anyhow::Result<Option<NotificationState>>;

    /// Inserts or updates the last-sent record for an (account, kind)
    /// pair
    async fn upsert_notification_state(
        &self,
        account_id: &AccountId,
        kind: AlertKind,
        last_sent_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}
