//! SQLite implementation of IRecordStore
//!
//! Concrete SQLite-based implementation of the record store port defined
//! in agentbattery-core. Handles all domain type mapping and SQL query
//! construction.
//!
//! ## Type Mapping
//!
//! | Domain Type              | SQL Type | Strategy                                  |
//! |--------------------------|----------|-------------------------------------------|
//! | AccountId, SnapshotId,   | TEXT     | UUID string via `.to_string()` / `FromStr`|
//! | RunId                    |          |                                           |
//! | Provider, AuthType,      | TEXT     | stable snake_case via `as_str()`/`FromStr`|
//! | AccountStatus, etc.      |          |                                           |
//! | CredentialRef            | TEXT     | `.as_str()` / `CredentialRef::new()`      |
//! | DateTime<Utc>            | TEXT     | ISO 8601 via `to_rfc3339()`               |
//! | bool                     | INTEGER  | 0/1                                       |
//! | used/limit/battery       | REAL     | f64                                       |

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use agentbattery_core::domain::{
    Account, AccountId, AccountStatus, AlertKind, AppSettings, AuthType, Confidence,
    CredentialRef, NotificationState, Provider, RunId, SnapshotId, SyncOutcome, SyncRun,
    UsageSnapshot, UsageSource, WindowKind,
};
use agentbattery_core::ports::IRecordStore;

use crate::StoreError;

/// Row id of the single app_settings row
const SETTINGS_ROW_ID: &str = "singleton";

/// SQLite-based implementation of the record store port
///
/// All operations go through a connection pool for concurrency; each
/// individual statement is atomic.
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
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

/// Parse an optional DateTime<Utc> from an optional string
fn parse_optional_datetime(s: Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
    match s {
        Some(ref val) if !val.is_empty() => parse_datetime(val).map(Some),
        _ => Ok(None),
    }
}

/// Parse a stable-string enum column via its FromStr impl
fn parse_enum<T>(field: &str, value: &str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| StoreError::SerializationError(format!("Bad {field} '{value}': {e}")))
}

// ============================================================================
// Row mapping functions
// ============================================================================

fn account_from_row(row: &SqliteRow) -> Result<Account, StoreError> {
    let id_str: String = row.get("id");
    let provider_str: String = row.get("provider");
    let display_name: String = row.get("display_name");
    let org_workspace_id: Option<String> = row.get("org_workspace_id");
    let auth_type_str: String = row.get("auth_type");
    let sync_enabled: i64 = row.get("sync_enabled");
    let sync_interval_seconds: Option<i64> = row.get("sync_interval_seconds");
    let credential_ref_str: String = row.get("credential_ref");
    let last_validated_at: Option<String> = row.get("last_validated_at");
    let expires_at: Option<String> = row.get("expires_at");
    let status_str: String = row.get("status");
    let last_error: Option<String> = row.get("last_error");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    Ok(Account::from_parts(
        parse_enum::<AccountId>("account id", &id_str)?,
        parse_enum::<Provider>("provider", &provider_str)?,
        display_name,
        org_workspace_id,
        parse_enum::<AuthType>("auth_type", &auth_type_str)?,
        sync_enabled != 0,
        sync_interval_seconds.map(|v| v as u32),
        CredentialRef::new(credential_ref_str)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?,
        parse_optional_datetime(last_validated_at)?,
        parse_optional_datetime(expires_at)?,
        parse_enum::<AccountStatus>("status", &status_str)?,
        last_error,
        parse_datetime(&created_at_str)?,
        parse_datetime(&updated_at_str)?,
    ))
}

fn snapshot_from_row(row: &SqliteRow) -> Result<UsageSnapshot, StoreError> {
    let id_str: String = row.get("id");
    let account_id_str: String = row.get("account_id");
    let provider_str: String = row.get("provider");
    let window_kind_str: String = row.get("window_kind");
    let window_start_str: String = row.get("window_start");
    let window_end_str: String = row.get("window_end");
    let confidence_str: String = row.get("confidence");
    let source_str: String = row.get("source");
    let fetched_at_str: String = row.get("fetched_at");
    let created_at_str: String = row.get("created_at");

    Ok(UsageSnapshot {
        id: parse_enum::<SnapshotId>("snapshot id", &id_str)?,
        account_id: parse_enum::<AccountId>("account id", &account_id_str)?,
        provider: parse_enum::<Provider>("provider", &provider_str)?,
        window_kind: parse_enum::<WindowKind>("window_kind", &window_kind_str)?,
        window_start: parse_datetime(&window_start_str)?,
        window_end: parse_datetime(&window_end_str)?,
        used_value: row.get("used_value"),
        used_unit: row.get("used_unit"),
        limit_value: row.get("limit_value"),
        limit_unit: row.get("limit_unit"),
        remaining_value: row.get("remaining_value"),
        battery_percent: row.get("battery_percent"),
        confidence: parse_enum::<Confidence>("confidence", &confidence_str)?,
        source: parse_enum::<UsageSource>("source", &source_str)?,
        fetched_at: parse_datetime(&fetched_at_str)?,
        created_at: parse_datetime(&created_at_str)?,
    })
}

fn run_from_row(row: &SqliteRow) -> Result<SyncRun, StoreError> {
    let id_str: String = row.get("id");
    let account_id_str: String = row.get("account_id");
    let started_at_str: String = row.get("started_at");
    let finished_at: Option<String> = row.get("finished_at");
    let outcome_str: String = row.get("outcome");
    let error_code: Option<String> = row.get("error_code");
    let error_message: Option<String> = row.get("error_message");
    let attempts: i64 = row.get("attempts");
    let next_retry_at: Option<String> = row.get("next_retry_at");
    let created_at_str: String = row.get("created_at");

    Ok(SyncRun::from_parts(
        parse_enum::<RunId>("run id", &id_str)?,
        parse_enum::<AccountId>("account id", &account_id_str)?,
        parse_datetime(&started_at_str)?,
        parse_optional_datetime(finished_at)?,
        parse_enum::<SyncOutcome>("outcome", &outcome_str)?,
        error_code,
        error_message,
        attempts as u32,
        parse_optional_datetime(next_retry_at)?,
        parse_datetime(&created_at_str)?,
    ))
}

fn settings_from_row(row: &SqliteRow) -> AppSettings {
    let low: i64 = row.get("low_battery_threshold_percent");
    let persistent: i64 = row.get("persistent_failure_threshold");
    let interval: i64 = row.get("default_polling_interval_seconds");
    let debug: i64 = row.get("debug_logs_enabled");
    AppSettings {
        low_battery_threshold_percent: low as u8,
        persistent_failure_threshold: persistent as u32,
        default_polling_interval_seconds: interval as u32,
        debug_logs_enabled: debug != 0,
    }
}

// ============================================================================
// IRecordStore implementation
// ============================================================================

#[async_trait::async_trait]
impl IRecordStore for SqliteRecordStore {
    // --- Account operations ---

    async fn save_account(&self, account: &Account) -> anyhow::Result<()> {
        let id = account.id().to_string();

        sqlx::query(
            "INSERT OR REPLACE INTO accounts \
             (id, provider, display_name, org_workspace_id, auth_type, sync_enabled, \
              sync_interval_seconds, credential_ref, last_validated_at, expires_at, \
              status, last_error, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(account.provider().as_str())
        .bind(account.display_name())
        .bind(account.org_workspace_id())
        .bind(account.auth_type().as_str())
        .bind(account.sync_enabled() as i64)
        .bind(account.sync_interval_seconds().map(|v| v as i64))
        .bind(account.credential_ref().as_str())
        .bind(account.last_validated_at().map(|dt| dt.to_rfc3339()))
        .bind(account.expires_at().map(|dt| dt.to_rfc3339()))
        .bind(account.status().as_str())
        .bind(account.last_error())
        .bind(account.created_at().to_rfc3339())
        .bind(account.updated_at().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::trace!(account_id = %id, "Saved account");
        Ok(())
    }

    async fn get_account(&self, id: &AccountId) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(account_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn list_accounts(&self) -> anyhow::Result<Vec<Account>> {
        let rows = sqlx::query("SELECT * FROM accounts ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| account_from_row(r).map_err(Into::into))
            .collect()
    }

    async fn list_sync_enabled_accounts(&self) -> anyhow::Result<Vec<Account>> {
        let rows =
            sqlx::query("SELECT * FROM accounts WHERE sync_enabled = 1 ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        rows.iter()
            .map(|r| account_from_row(r).map_err(Into::into))
            .collect()
    }

    async fn delete_account(&self, id: &AccountId) -> anyhow::Result<()> {
        let id_str = id.to_string();

        // Notification state belongs to the account; history does not.
        sqlx::query("DELETE FROM notification_state WHERE account_id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await?;

        tracing::debug!(account_id = %id_str, "Deleted account");
        Ok(())
    }

    // --- Snapshot operations ---

    async fn insert_snapshot(&self, snapshot: &UsageSnapshot) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO usage_snapshots \
             (id, account_id, provider, window_kind, window_start, window_end, \
              used_value, used_unit, limit_value, limit_unit, remaining_value, \
              battery_percent, confidence, source, fetched_at, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(snapshot.id.to_string())
        .bind(snapshot.account_id.to_string())
        .bind(snapshot.provider.as_str())
        .bind(snapshot.window_kind.as_str())
        .bind(snapshot.window_start.to_rfc3339())
        .bind(snapshot.window_end.to_rfc3339())
        .bind(snapshot.used_value)
        .bind(&snapshot.used_unit)
        .bind(snapshot.limit_value)
        .bind(&snapshot.limit_unit)
        .bind(snapshot.remaining_value)
        .bind(snapshot.battery_percent)
        .bind(snapshot.confidence.as_str())
        .bind(snapshot.source.as_str())
        .bind(snapshot.fetched_at.to_rfc3339())
        .bind(snapshot.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::trace!(snapshot_id = %snapshot.id, account_id = %snapshot.account_id, "Inserted snapshot");
        Ok(())
    }

    async fn latest_snapshot(
        &self,
        account_id: &AccountId,
    ) -> anyhow::Result<Option<UsageSnapshot>> {
        let row = sqlx::query(
            "SELECT * FROM usage_snapshots WHERE account_id = ? \
             ORDER BY fetched_at DESC LIMIT 1",
        )
        .bind(account_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(snapshot_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn list_snapshots(
        &self,
        account_id: &AccountId,
        limit: u32,
    ) -> anyhow::Result<Vec<UsageSnapshot>> {
        let rows = sqlx::query(
            "SELECT * FROM usage_snapshots WHERE account_id = ? \
             ORDER BY fetched_at DESC LIMIT ?",
        )
        .bind(account_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| snapshot_from_row(r).map_err(Into::into))
            .collect()
    }

    // --- Sync run operations ---

    async fn insert_run(&self, run: &SyncRun) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO sync_runs \
             (id, account_id, started_at, finished_at, outcome, error_code, \
              error_message, attempts, next_retry_at, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(run.id().to_string())
        .bind(run.account_id().to_string())
        .bind(run.started_at().to_rfc3339())
        .bind(run.finished_at().map(|dt| dt.to_rfc3339()))
        .bind(run.outcome().as_str())
        .bind(run.error_code())
        .bind(run.error_message())
        .bind(run.attempts() as i64)
        .bind(run.next_retry_at().map(|dt| dt.to_rfc3339()))
        .bind(run.created_at().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::trace!(run_id = %run.id(), account_id = %run.account_id(), "Opened sync run");
        Ok(())
    }

    async fn update_run(&self, run: &SyncRun) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE sync_runs SET finished_at = ?, outcome = ?, error_code = ?, \
             error_message = ?, next_retry_at = ? WHERE id = ?",
        )
        .bind(run.finished_at().map(|dt| dt.to_rfc3339()))
        .bind(run.outcome().as_str())
        .bind(run.error_code())
        .bind(run.error_message())
        .bind(run.next_retry_at().map(|dt| dt.to_rfc3339()))
        .bind(run.id().to_string())
        .execute(&self.pool)
        .await?;

        tracing::trace!(run_id = %run.id(), outcome = %run.outcome().as_str(), "Closed sync run");
        Ok(())
    }

    async fn get_run(&self, id: &RunId) -> anyhow::Result<Option<SyncRun>> {
        let row = sqlx::query("SELECT * FROM sync_runs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(run_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn list_runs(&self, account_id: &AccountId, limit: u32) -> anyhow::Result<Vec<SyncRun>> {
        let rows = sqlx::query(
            "SELECT * FROM sync_runs WHERE account_id = ? \
             ORDER BY started_at DESC LIMIT ?",
        )
        .bind(account_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| run_from_row(r).map_err(Into::into))
            .collect()
    }

    // --- Settings (single row) ---

    async fn ensure_settings(&self) -> anyhow::Result<AppSettings> {
        let defaults = AppSettings::default();

        // INSERT OR IGNORE makes a racing ensure a no-op, not an error.
        sqlx::query(
            "INSERT OR IGNORE INTO app_settings \
             (id, low_battery_threshold_percent, persistent_failure_threshold, \
              default_polling_interval_seconds, debug_logs_enabled) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(SETTINGS_ROW_ID)
        .bind(defaults.low_battery_threshold_percent as i64)
        .bind(defaults.persistent_failure_threshold as i64)
        .bind(defaults.default_polling_interval_seconds as i64)
        .bind(defaults.debug_logs_enabled as i64)
        .execute(&self.pool)
        .await?;

        self.get_settings().await
    }

    async fn get_settings(&self) -> anyhow::Result<AppSettings> {
        let row = sqlx::query("SELECT * FROM app_settings WHERE id = ?")
            .bind(SETTINGS_ROW_ID)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(settings_from_row(r)),
            None => self.ensure_settings().await,
        }
    }

    async fn update_settings(&self, settings: &AppSettings) -> anyhow::Result<AppSettings> {
        sqlx::query(
            "INSERT OR REPLACE INTO app_settings \
             (id, low_battery_threshold_percent, persistent_failure_threshold, \
              default_polling_interval_seconds, debug_logs_enabled) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(SETTINGS_ROW_ID)
        .bind(settings.low_battery_threshold_percent as i64)
        .bind(settings.persistent_failure_threshold as i64)
        .bind(settings.default_polling_interval_seconds as i64)
        .bind(settings.debug_logs_enabled as i64)
        .execute(&self.pool)
        .await?;

        Ok(*settings)
    }

    // --- Notification dedup state ---

    async fn get_notification_state(
        &self,
        account_id: &AccountId,
        kind: AlertKind,
    ) -> anyhow::Result<Option<NotificationState>> {
        let row = sqlx::query(
            "SELECT last_sent_at FROM notification_state \
             WHERE account_id = ? AND notification_key = ?",
        )
        .bind(account_id.to_string())
        .bind(kind.key())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => {
                let last_sent_at_str: String = r.get("last_sent_at");
                Ok(Some(NotificationState {
                    account_id: *account_id,
                    kind,
                    last_sent_at: parse_datetime(&last_sent_at_str)?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn upsert_notification_state(
        &self,
        account_id: &AccountId,
        kind: AlertKind,
        last_sent_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO notification_state \
             (account_id, notification_key, last_sent_at) VALUES (?, ?, ?)",
        )
        .bind(account_id.to_string())
        .bind(kind.key())
        .bind(last_sent_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatabasePool;
    use agentbattery_core::domain::{ProviderError, UsageWindow};

    async fn test_store() -> SqliteRecordStore {
        let pool = DatabasePool::in_memory().await.unwrap();
        SqliteRecordStore::new(pool.pool().clone())
    }

    fn test_account() -> Account {
        Account::new(Provider::OpenAi, "Test account", AuthType::ApiKey)
    }

    fn test_snapshot(account: &Account, fetched_at: DateTime<Utc>) -> UsageSnapshot {
        let window = UsageWindow::trailing_month(fetched_at);
        UsageSnapshot::normalized(
            *account.id(),
            account.provider(),
            &window,
            25.0,
            100.0,
            "credits",
            agentbattery_core::domain::Confidence::Exact,
            UsageSource::OfficialApi,
            fetched_at,
        )
    }

    #[tokio::test]
    async fn test_account_roundtrip() {
        let store = test_store().await;
        let mut account = test_account();
        account.set_org_workspace_id(Some("org-42".to_string()));
        account.record_sync_failure("network: timed out");

        store.save_account(&account).await.unwrap();
        let loaded = store.get_account(account.id()).await.unwrap().unwrap();

        assert_eq!(loaded.display_name(), "Test account");
        assert_eq!(loaded.org_workspace_id(), Some("org-42"));
        assert_eq!(loaded.status(), AccountStatus::Error);
        assert_eq!(loaded.last_error(), Some("network: timed out"));
        assert_eq!(loaded.credential_ref(), account.credential_ref());
    }

    #[tokio::test]
    async fn test_get_missing_account() {
        let store = test_store().await;
        assert!(store.get_account(&AccountId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sync_enabled_filters() {
        let store = test_store().await;
        let enabled = test_account();
        let mut disabled = test_account();
        disabled.set_sync_enabled(false);

        store.save_account(&enabled).await.unwrap();
        store.save_account(&disabled).await.unwrap();

        let listed = store.list_sync_enabled_accounts().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id(), enabled.id());
        assert_eq!(store.list_accounts().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_ordering_and_limit() {
        let store = test_store().await;
        let account = test_account();
        store.save_account(&account).await.unwrap();

        let base = Utc::now();
        for minutes in [0, 5, 10] {
            let snapshot = test_snapshot(&account, base + chrono::Duration::minutes(minutes));
            store.insert_snapshot(&snapshot).await.unwrap();
        }

        let latest = store.latest_snapshot(account.id()).await.unwrap().unwrap();
        assert_eq!(latest.fetched_at, base + chrono::Duration::minutes(10));

        let listed = store.list_snapshots(account.id(), 2).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].fetched_at > listed[1].fetched_at);
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip_preserves_derived_fields() {
        let store = test_store().await;
        let account = test_account();
        let snapshot = test_snapshot(&account, Utc::now());
        store.insert_snapshot(&snapshot).await.unwrap();

        let loaded = store.latest_snapshot(account.id()).await.unwrap().unwrap();
        assert_eq!(loaded.remaining_value, 75.0);
        assert_eq!(loaded.battery_percent, 75.0);
        assert_eq!(loaded.confidence, snapshot.confidence);
        assert_eq!(loaded.source, snapshot.source);
    }

    #[tokio::test]
    async fn test_run_lifecycle() {
        let store = test_store().await;
        let account = test_account();

        let mut run = SyncRun::begin(*account.id(), 2, Utc::now());
        store.insert_run(&run).await.unwrap();

        let open = store.get_run(run.id()).await.unwrap().unwrap();
        assert!(open.is_open());
        assert_eq!(open.outcome(), SyncOutcome::Failure);
        assert_eq!(open.attempts(), 2);

        let finished = Utc::now();
        run.complete_failure(
            &ProviderError::rate_limit("too many requests"),
            finished + chrono::Duration::seconds(8),
            finished,
        );
        store.update_run(&run).await.unwrap();

        let closed = store.get_run(run.id()).await.unwrap().unwrap();
        assert!(!closed.is_open());
        assert_eq!(closed.error_code(), Some("rate_limit"));
        assert_eq!(closed.error_message(), Some("too many requests"));
        assert!(closed.next_retry_at().is_some());
    }

    #[tokio::test]
    async fn test_list_runs_newest_first() {
        let store = test_store().await;
        let account = test_account();
        let base = Utc::now();

        for minutes in [0, 1, 2] {
            let run = SyncRun::begin(
                *account.id(),
                1,
                base + chrono::Duration::minutes(minutes),
            );
            store.insert_run(&run).await.unwrap();
        }

        let listed = store.list_runs(account.id(), 10).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].started_at(), base + chrono::Duration::minutes(2));
    }

    #[tokio::test]
    async fn test_settings_lazily_created_once() {
        let store = test_store().await;

        let first = store.ensure_settings().await.unwrap();
        assert_eq!(first, AppSettings::default());

        // Second ensure is a no-op, not an error, and changes survive it.
        let mut updated = first;
        updated.low_battery_threshold_percent = 35;
        store.update_settings(&updated).await.unwrap();

        let second = store.ensure_settings().await.unwrap();
        assert_eq!(second.low_battery_threshold_percent, 35);
    }

    #[tokio::test]
    async fn test_get_settings_creates_defaults() {
        let store = test_store().await;
        let settings = store.get_settings().await.unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[tokio::test]
    async fn test_notification_state_upsert() {
        let store = test_store().await;
        let account_id = AccountId::new();
        let first = Utc::now();

        assert!(store
            .get_notification_state(&account_id, AlertKind::LowBattery)
            .await
            .unwrap()
            .is_none());

        store
            .upsert_notification_state(&account_id, AlertKind::LowBattery, first)
            .await
            .unwrap();

        let later = first + chrono::Duration::minutes(20);
        store
            .upsert_notification_state(&account_id, AlertKind::LowBattery, later)
            .await
            .unwrap();

        let state = store
            .get_notification_state(&account_id, AlertKind::LowBattery)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.last_sent_at, later);

        // Kinds are independent rows.
        assert!(store
            .get_notification_state(&account_id, AlertKind::PersistentSyncFailure)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_account_purges_notification_state_keeps_history() {
        let store = test_store().await;
        let account = test_account();
        store.save_account(&account).await.unwrap();

        store
            .upsert_notification_state(account.id(), AlertKind::LowBattery, Utc::now())
            .await
            .unwrap();
        let snapshot = test_snapshot(&account, Utc::now());
        store.insert_snapshot(&snapshot).await.unwrap();
        let run = SyncRun::begin(*account.id(), 1, Utc::now());
        store.insert_run(&run).await.unwrap();

        store.delete_account(account.id()).await.unwrap();

        assert!(store.get_account(account.id()).await.unwrap().is_none());
        assert!(store
            .get_notification_state(account.id(), AlertKind::LowBattery)
            .await
            .unwrap()
            .is_none());
        // History is audit data and survives the account.
        assert_eq!(store.list_snapshots(account.id(), 10).await.unwrap().len(), 1);
        assert_eq!(store.list_runs(account.id(), 10).await.unwrap().len(), 1);
    }
}
