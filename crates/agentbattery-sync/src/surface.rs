//! Command surface driven by the CLI and daemon
//!
//! [`AppSurface`] is the single entry point for everything a user can
//! do: account CRUD, credential management, battery status, history
//! queries, manual syncs, and settings. It composes the stores, the
//! vault, the adapter registry, and the running [`SyncService`].
//!
//! Query pagination is capped server-side: snapshots at 100 rows, runs
//! at 50.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use agentbattery_core::domain::{
    Account, AccountId, AccountStatus, AppSettings, AuthType, DomainError, Provider,
    UsageWindow,
};
use agentbattery_core::domain::{SyncRun, UsageSnapshot};
use agentbattery_core::ports::{
    AdapterRegistry, CredentialCheck, ICredentialVault, IRecordStore,
};

use crate::service::{SyncAttempt, SyncService};

/// Largest snapshot page the surface will return
const SNAPSHOT_PAGE_LIMIT: u32 = 100;

/// Largest sync-run page the surface will return
const RUN_PAGE_LIMIT: u32 = 50;

/// Summary shown for an account with no snapshots yet
const NO_DATA_SUMMARY: &str = "No usage data yet";

/// Errors surfaced to the CLI and daemon command handlers
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// The referenced account does not exist
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// No adapter is registered for the account's provider
    #[error("No adapter registered for provider '{0}'")]
    UnsupportedProvider(String),

    /// A domain validation rejected the input
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A storage or adapter failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Per-account battery reading for status displays
#[derive(Debug, Clone, Serialize)]
pub struct BatteryStatus {
    pub account_id: AccountId,
    pub display_name: String,
    pub provider: Provider,
    pub battery_percent: f64,
    pub usage_summary: String,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub health: AccountStatus,
    pub last_error: Option<String>,
}

/// Partial update for an account's display fields
///
/// `None` leaves a field untouched; the nested options carry explicit
/// clears (`Some(None)` removes the value).
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub display_name: Option<String>,
    pub org_workspace_id: Option<Option<String>>,
    pub sync_enabled: Option<bool>,
    pub sync_interval_seconds: Option<Option<u32>>,
}

/// The application's command surface
pub struct AppSurface {
    store: Arc<dyn IRecordStore>,
    vault: Arc<dyn ICredentialVault>,
    registry: AdapterRegistry,
    service: Arc<SyncService>,
}

impl AppSurface {
    pub fn new(
        store: Arc<dyn IRecordStore>,
        vault: Arc<dyn ICredentialVault>,
        registry: AdapterRegistry,
        service: Arc<SyncService>,
    ) -> Self {
        Self {
            store,
            vault,
            registry,
            service,
        }
    }

    async fn require_account(&self, id: &AccountId) -> Result<Account, SurfaceError> {
        self.store
            .get_account(id)
            .await?
            .ok_or(SurfaceError::AccountNotFound(*id))
    }

    // --- Accounts ---

    /// Lists all accounts, newest first
    pub async fn list_accounts(&self) -> Result<Vec<Account>, SurfaceError> {
        Ok(self.store.list_accounts().await?)
    }

    /// Creates an account and persists it
    pub async fn create_account(
        &self,
        provider: Provider,
        display_name: impl Into<String>,
        auth_type: AuthType,
        org_workspace_id: Option<String>,
    ) -> Result<Account, SurfaceError> {
        let mut account = Account::new(provider, display_name, auth_type);
        if org_workspace_id.is_some() {
            account.set_org_workspace_id(org_workspace_id);
        }
        self.store.save_account(&account).await?;
        tracing::info!(account_id = %account.id(), provider = provider.as_str(), "Account created");
        Ok(account)
    }

    /// Applies a display-field patch to an account
    pub async fn update_account(
        &self,
        id: &AccountId,
        patch: AccountPatch,
    ) -> Result<Account, SurfaceError> {
        let mut account = self.require_account(id).await?;

        if let Some(name) = patch.display_name {
            account.set_display_name(name);
        }
        if let Some(org) = patch.org_workspace_id {
            account.set_org_workspace_id(org);
        }
        if let Some(enabled) = patch.sync_enabled {
            account.set_sync_enabled(enabled);
        }
        if let Some(interval) = patch.sync_interval_seconds {
            account.set_sync_interval_seconds(interval);
        }

        self.store.save_account(&account).await?;
        Ok(account)
    }

    /// Deletes an account, its credential, and its notification state
    ///
    /// Snapshot and run history is audit data and is retained.
    pub async fn delete_account(&self, id: &AccountId) -> Result<(), SurfaceError> {
        let account = self.require_account(id).await?;
        self.vault.delete(account.id()).await?;
        self.store.delete_account(account.id()).await?;
        tracing::info!(account_id = %id, "Account deleted");
        Ok(())
    }

    // --- Battery status ---

    /// Latest battery reading per account
    ///
    /// Accounts with no snapshots yet report 0% with a placeholder
    /// summary; their `last_sync_at` falls back to the last successful
    /// credential validation.
    pub async fn battery_status(&self) -> Result<Vec<BatteryStatus>, SurfaceError> {
        let accounts = self.store.list_accounts().await?;
        let mut statuses = Vec::with_capacity(accounts.len());

        for account in accounts {
            let status = match self.store.latest_snapshot(account.id()).await? {
                Some(snapshot) => BatteryStatus {
                    account_id: *account.id(),
                    display_name: account.display_name().to_string(),
                    provider: account.provider(),
                    battery_percent: snapshot.battery_percent,
                    usage_summary: snapshot.usage_summary(),
                    last_sync_at: Some(snapshot.fetched_at),
                    health: account.status(),
                    last_error: account.last_error().map(str::to_string),
                },
                None => BatteryStatus {
                    account_id: *account.id(),
                    display_name: account.display_name().to_string(),
                    provider: account.provider(),
                    battery_percent: 0.0,
                    usage_summary: NO_DATA_SUMMARY.to_string(),
                    last_sync_at: account.last_validated_at(),
                    health: account.status(),
                    last_error: account.last_error().map(str::to_string),
                },
            };
            statuses.push(status);
        }
        Ok(statuses)
    }

    // --- Credentials ---

    /// Stores (or replaces) the account's secret in the vault
    pub async fn set_credential(
        &self,
        id: &AccountId,
        secret: &str,
    ) -> Result<(), SurfaceError> {
        let account = self.require_account(id).await?;
        self.vault.set(account.id(), secret).await?;
        Ok(())
    }

    /// Validates the stored credential and records the result on the account
    pub async fn validate_credential(
        &self,
        id: &AccountId,
    ) -> Result<CredentialCheck, SurfaceError> {
        let mut account = self.require_account(id).await?;
        let adapter = self.registry.get(account.provider()).ok_or_else(|| {
            SurfaceError::UnsupportedProvider(account.provider().as_str().to_string())
        })?;

        let secret = self.vault.get(account.id()).await?;
        let check = adapter
            .validate_credentials(&account, secret.as_deref())
            .await?;

        account.record_validation(check.valid, Utc::now(), check.expires_at);
        self.store.save_account(&account).await?;
        Ok(check)
    }

    // --- History ---

    /// Snapshot history for an account, newest first, capped at 100 rows
    pub async fn list_snapshots(
        &self,
        id: &AccountId,
        limit: Option<u32>,
    ) -> Result<Vec<UsageSnapshot>, SurfaceError> {
        let account = self.require_account(id).await?;
        let limit = limit.unwrap_or(SNAPSHOT_PAGE_LIMIT).min(SNAPSHOT_PAGE_LIMIT);
        Ok(self.store.list_snapshots(account.id(), limit).await?)
    }

    /// Sync run history for an account, newest first, capped at 50 rows
    pub async fn list_sync_runs(
        &self,
        id: &AccountId,
        limit: Option<u32>,
    ) -> Result<Vec<SyncRun>, SurfaceError> {
        let account = self.require_account(id).await?;
        let limit = limit.unwrap_or(RUN_PAGE_LIMIT).min(RUN_PAGE_LIMIT);
        Ok(self.store.list_runs(account.id(), limit).await?)
    }

    // --- Sync ---

    /// Syncs one account immediately
    ///
    /// Subject to the same checks as a scheduled sync: a disabled or
    /// backoff-gated account is skipped without recording a run.
    pub async fn manual_sync(
        &self,
        id: &AccountId,
        window: Option<UsageWindow>,
    ) -> Result<SyncAttempt, SurfaceError> {
        let account = self.require_account(id).await?;
        Ok(self.service.sync_account(&account, window).await?)
    }

    // --- Settings ---

    /// Current settings, lazily created with defaults on first read
    pub async fn get_settings(&self) -> Result<AppSettings, SurfaceError> {
        Ok(self.store.ensure_settings().await?)
    }

    /// Replaces the settings after range validation
    pub async fn update_settings(
        &self,
        settings: AppSettings,
    ) -> Result<AppSettings, SurfaceError> {
        settings.validate()?;
        Ok(self.store.update_settings(&settings).await?)
    }
}
