//! CLI command implementations
//!
//! Each command opens the shared [`CliContext`] (database, vault,
//! adapters, orchestrator) and drives the command surface.

pub mod accounts;
pub mod credential;
pub mod runs;
pub mod settings;
pub mod snapshots;
pub mod status;
pub mod sync;

use std::sync::Arc;

use anyhow::{Context, Result};

use agentbattery_core::config::Config;
use agentbattery_core::ports::{ICredentialVault, INotifier, IRecordStore};
use agentbattery_providers::builtin_registry;
use agentbattery_store::{DatabasePool, SqliteRecordStore};
use agentbattery_sync::{AppSurface, SyncService};
use agentbattery_vault::KeyringCredentialVault;

/// Notifier for CLI-triggered syncs: alerts go to the log, not the desktop
struct QuietNotifier;

#[async_trait::async_trait]
impl INotifier for QuietNotifier {
    async fn show(&self, title: &str, body: &str) -> Result<()> {
        tracing::info!(title, body, "Notification");
        Ok(())
    }
}

/// Shared wiring behind every CLI command
pub struct CliContext {
    pub surface: AppSurface,
}

impl CliContext {
    /// Opens the database and wires the command surface
    pub async fn open() -> Result<Self> {
        let config = Config::load_or_default(&Config::default_path());
        let db_path = config.storage.resolve_db_path();

        let pool = DatabasePool::new(&db_path)
            .await
            .context("Failed to open database")?;
        let store: Arc<dyn IRecordStore> = Arc::new(SqliteRecordStore::new(pool.pool().clone()));
        let vault: Arc<dyn ICredentialVault> = Arc::new(KeyringCredentialVault::new());
        let registry = builtin_registry();
        let notifier: Arc<dyn INotifier> = Arc::new(QuietNotifier);

        let service = Arc::new(SyncService::new(
            Arc::clone(&store),
            Arc::clone(&vault),
            registry.clone(),
            notifier,
            config.scheduler.clone(),
        ));

        Ok(Self {
            surface: AppSurface::new(store, vault, registry, service),
        })
    }
}
