//! Sync orchestrator and scheduler loop
//!
//! The [`SyncService`] owns the polling loop and the per-account sync
//! state machine:
//!
//! ```text
//! ticker ──→ tick() ──→ list sync-enabled accounts
//!                          │ (bounded fan-out)
//!                    sync_account() ──→ backoff gate ──→ in-flight guard
//!                          │
//!                    open SyncRun ──→ vault ──→ validate ──→ fetch ──→ normalize
//!                          │
//!                    close run, update account health, alerts
//! ```
//!
//! Four checks sit in front of every attempt and each skips silently,
//! leaving no run row: the sync-enabled flag, the backoff window, the
//! per-account in-flight guard, and adapter resolution. Manual syncs
//! face all of them too.
//!
//! `stop()` cancels future ticks only; a tick already in progress runs
//! to completion.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use rand::Rng;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use agentbattery_core::config::SchedulerConfig;
use agentbattery_core::domain::{
    Account, AccountId, ProviderError, SyncOutcome, SyncRun, UsageSnapshot, UsageWindow,
};
use agentbattery_core::ports::{
    AdapterRegistry, ICredentialVault, INotifier, IProviderAdapter, IRecordStore,
};

use crate::backoff::BackoffTracker;
use crate::gate::NotificationGate;

/// Result of one `sync_account` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAttempt {
    /// An attempt ran and was recorded as a run
    Completed(SyncOutcome),
    /// The account is inside its backoff window; no run recorded
    SkippedBackoff,
    /// Another sync of the same account is in flight; no run recorded
    SkippedInFlight,
    /// Syncing is disabled for the account; no run recorded
    SkippedDisabled,
    /// No adapter is registered for the account's provider; no run recorded
    SkippedNoAdapter,
}

/// RAII guard marking an account's sync as in flight
struct InFlightGuard<'a> {
    map: &'a DashMap<AccountId, ()>,
    id: AccountId,
}

impl<'a> InFlightGuard<'a> {
    fn try_acquire(map: &'a DashMap<AccountId, ()>, id: AccountId) -> Option<Self> {
        match map.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => None,
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(());
                Some(Self { map, id })
            }
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.id);
    }
}

/// Handle to a running scheduler loop
struct LoopState {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Polls provider accounts on a jittered interval and records the results
pub struct SyncService {
    store: Arc<dyn IRecordStore>,
    vault: Arc<dyn ICredentialVault>,
    registry: AdapterRegistry,
    gate: NotificationGate,
    config: SchedulerConfig,
    backoff: BackoffTracker,
    in_flight: DashMap<AccountId, ()>,
    limiter: Arc<Semaphore>,
    loop_state: Mutex<Option<LoopState>>,
}

impl SyncService {
    pub fn new(
        store: Arc<dyn IRecordStore>,
        vault: Arc<dyn ICredentialVault>,
        registry: AdapterRegistry,
        notifier: Arc<dyn INotifier>,
        config: SchedulerConfig,
    ) -> Self {
        let gate = NotificationGate::new(Arc::clone(&store), notifier);
        let limiter = Arc::new(Semaphore::new(config.max_concurrent_syncs.max(1)));
        Self {
            store,
            vault,
            registry,
            gate,
            config,
            backoff: BackoffTracker::new(),
            in_flight: DashMap::new(),
            limiter,
            loop_state: Mutex::new(None),
        }
    }

    /// Starts the polling loop
    ///
    /// Idempotent while running. Ensures settings exist, computes the
    /// polling interval as the configured default plus a random jitter
    /// drawn once, then performs one full pass immediately. Ticks do not
    /// overlap: a tick that outlives the interval delays the next one.
    pub async fn start(self: &Arc<Self>) -> anyhow::Result<()> {
        let mut state = self.loop_state.lock().await;
        if state.is_some() {
            debug!("Sync scheduler already running");
            return Ok(());
        }

        let settings = self.store.ensure_settings().await?;

        let jitter_ms = {
            let max_ms = self.config.jitter_max_seconds.saturating_mul(1_000);
            if max_ms == 0 {
                0
            } else {
                rand::thread_rng().gen_range(0..max_ms)
            }
        };
        let poll_interval = Duration::from_secs(settings.default_polling_interval_seconds as u64)
            + Duration::from_millis(jitter_ms);

        info!(
            interval_ms = poll_interval.as_millis() as u64,
            max_concurrent = self.config.max_concurrent_syncs,
            "Starting sync scheduler"
        );

        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let service = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            // The first interval tick fires immediately, giving one
            // full pass right at startup.
            loop {
                tokio::select! {
                    _ = loop_cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if loop_cancel.is_cancelled() {
                    break;
                }
                if let Err(e) = service.tick().await {
                    error!(error = %e, "Sync tick failed");
                }
            }
            info!("Sync scheduler stopped");
        });

        *state = Some(LoopState { handle, cancel });
        Ok(())
    }

    /// Stops the polling loop and waits for it to wind down
    ///
    /// A tick already in progress runs to completion. The service can be
    /// started again afterwards.
    pub async fn stop(&self) {
        let state = self.loop_state.lock().await.take();
        if let Some(LoopState { handle, cancel }) = state {
            cancel.cancel();
            if let Err(e) = handle.await {
                warn!(error = %e, "Scheduler task did not shut down cleanly");
            }
        }
    }

    /// Syncs every sync-enabled account, bounded by the concurrency limit
    pub async fn tick(self: &Arc<Self>) -> anyhow::Result<()> {
        let accounts = self.store.list_sync_enabled_accounts().await?;
        if accounts.is_empty() {
            return Ok(());
        }
        debug!(count = accounts.len(), "Sync tick");

        let mut tasks = JoinSet::new();
        for account in accounts {
            let service = Arc::clone(self);
            tasks.spawn(async move {
                let Ok(_permit) = service.limiter.acquire().await else {
                    return;
                };
                if let Err(e) = service.sync_account(&account, None).await {
                    warn!(account_id = %account.id(), error = %e, "Account sync failed to record");
                }
            });
        }
        while tasks.join_next().await.is_some() {}
        Ok(())
    }

    /// Runs the sync state machine for one account
    ///
    /// Accounts with syncing disabled are skipped, manual requests
    /// included. Provider failures are recorded, never raised; the
    /// returned error covers storage problems only.
    pub async fn sync_account(
        &self,
        account: &Account,
        window: Option<UsageWindow>,
    ) -> anyhow::Result<SyncAttempt> {
        let now = Utc::now();

        if !account.sync_enabled() {
            debug!(account_id = %account.id(), "Sync skipped: syncing disabled");
            return Ok(SyncAttempt::SkippedDisabled);
        }
        if self.backoff.is_gated(account.id(), now) {
            debug!(account_id = %account.id(), "Sync skipped: inside backoff window");
            return Ok(SyncAttempt::SkippedBackoff);
        }
        let Some(_guard) = InFlightGuard::try_acquire(&self.in_flight, *account.id()) else {
            debug!(account_id = %account.id(), "Sync skipped: already in flight");
            return Ok(SyncAttempt::SkippedInFlight);
        };
        let Some(adapter) = self.registry.get(account.provider()) else {
            // Unreachable with the built-in registry; kept for partial
            // registries wired up in tests.
            warn!(
                account_id = %account.id(),
                provider = account.provider().as_str(),
                "Sync skipped: no adapter registered"
            );
            return Ok(SyncAttempt::SkippedNoAdapter);
        };

        let attempts = self.backoff.failures(account.id()) + 1;
        let mut run = SyncRun::begin(*account.id(), attempts, now);
        self.store.insert_run(&run).await?;

        let window = window.unwrap_or_else(|| UsageWindow::trailing_month(now));
        let result = self.attempt(adapter.as_ref(), account, &window).await;
        let mut account = account.clone();
        let finished = Utc::now();

        match result {
            Ok(snapshot) => {
                self.store.insert_snapshot(&snapshot).await?;
                account.record_sync_success(finished);
                self.store.save_account(&account).await?;
                run.complete_success(finished);
                self.store.update_run(&run).await?;
                self.backoff.reset(account.id());

                info!(
                    account_id = %account.id(),
                    battery_percent = snapshot.battery_percent,
                    "Sync succeeded"
                );

                let settings = self.store.get_settings().await?;
                if snapshot.battery_percent <= settings.low_battery_threshold_percent as f64 {
                    self.gate
                        .notify_low_battery(&account, snapshot.battery_percent, finished)
                        .await?;
                }
                Ok(SyncAttempt::Completed(SyncOutcome::Success))
            }
            Err(provider_error) => {
                let (failures, next_retry_at) =
                    self.backoff.record_failure(account.id(), finished);
                account.record_sync_failure(provider_error.message.clone());
                self.store.save_account(&account).await?;
                run.complete_failure(&provider_error, next_retry_at, finished);
                self.store.update_run(&run).await?;

                warn!(
                    account_id = %account.id(),
                    kind = provider_error.kind.code(),
                    failures,
                    next_retry_at = %next_retry_at,
                    "Sync failed"
                );

                let settings = self.store.get_settings().await?;
                if failures >= settings.persistent_failure_threshold {
                    self.gate
                        .notify_persistent_failure(&account, failures, finished)
                        .await?;
                }
                Ok(SyncAttempt::Completed(SyncOutcome::Failure))
            }
        }
    }

    /// One fetch pipeline pass, with the optional hard timeout applied
    async fn attempt(
        &self,
        adapter: &dyn IProviderAdapter,
        account: &Account,
        window: &UsageWindow,
    ) -> Result<UsageSnapshot, ProviderError> {
        let pipeline = self.attempt_pipeline(adapter, account, window);
        match self.config.sync_timeout_seconds {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), pipeline)
                .await
                .map_err(|_| ProviderError::network("Sync attempt timed out"))?,
            None => pipeline.await,
        }
    }

    async fn attempt_pipeline(
        &self,
        adapter: &dyn IProviderAdapter,
        account: &Account,
        window: &UsageWindow,
    ) -> Result<UsageSnapshot, ProviderError> {
        let secret = self
            .vault
            .get(account.id())
            .await
            .map_err(|e| ProviderError::from_any(&e))?;

        let check = adapter
            .validate_credentials(account, secret.as_deref())
            .await
            .map_err(|e| ProviderError::from_any(&e))?;
        if !check.valid {
            return Err(ProviderError::unknown("Credential validation failed"));
        }

        let raw = adapter
            .fetch_usage(account, window, secret.as_deref())
            .await
            .map_err(|e| ProviderError::from_any(&e))?;

        Ok(adapter.normalize(account, &raw, window))
    }
}
