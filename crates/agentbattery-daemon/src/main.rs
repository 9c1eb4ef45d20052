//! Agent Battery Daemon - Background usage polling service
//!
//! Runs as a user service: opens the local database, wires the provider
//! adapters, and keeps the sync scheduler polling every sync-enabled
//! account until SIGTERM or SIGINT arrives. Alerts surface as desktop
//! notifications.

mod notifier;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use agentbattery_core::config::Config;
use agentbattery_core::ports::{ICredentialVault, INotifier, IRecordStore};
use agentbattery_providers::builtin_registry;
use agentbattery_store::{DatabasePool, SqliteRecordStore};
use agentbattery_sync::SyncService;
use agentbattery_vault::KeyringCredentialVault;

use notifier::{DesktopNotifier, LogNotifier};

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C)"),
        _ = terminate => info!("Received SIGTERM"),
    }

    token.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = Config::default_path();
    let config = Config::load_or_default(&config_path);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    info!(config_path = %config_path.display(), "Agent Battery daemon starting (agentbatteryd)");

    let db_path = config.storage.resolve_db_path();
    let db_pool = DatabasePool::new(&db_path)
        .await
        .context("Failed to open database")?;
    let store: Arc<dyn IRecordStore> = Arc::new(SqliteRecordStore::new(db_pool.pool().clone()));
    let vault: Arc<dyn ICredentialVault> = Arc::new(KeyringCredentialVault::new());
    let headless = std::env::var_os("DISPLAY").is_none()
        && std::env::var_os("WAYLAND_DISPLAY").is_none();
    let notifier: Arc<dyn INotifier> = if headless {
        info!("No display detected; alerts will be logged only");
        Arc::new(LogNotifier)
    } else {
        Arc::new(DesktopNotifier::new())
    };
    let registry = builtin_registry();

    let service = Arc::new(SyncService::new(
        store,
        vault,
        registry,
        notifier,
        config.scheduler.clone(),
    ));

    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    service.start().await.context("Failed to start sync scheduler")?;
    info!("Sync scheduler running");

    shutdown_token.cancelled().await;

    info!("Shutting down");
    service.stop().await;
    info!("Agent Battery daemon shut down gracefully");
    Ok(())
}
