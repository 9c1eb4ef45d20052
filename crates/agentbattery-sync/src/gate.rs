//! Cooldown-throttled notification dispatch
//!
//! Sits between the orchestrator and the `INotifier` port. Each
//! (account, alert kind) pair carries a persisted last-sent timestamp;
//! re-sends inside the kind's cooldown window are suppressed. Delivery
//! is best-effort: a platform failure is logged and suppressed, and the
//! cooldown is NOT armed so the next evaluation retries.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use agentbattery_core::domain::{Account, AlertKind};
use agentbattery_core::ports::{INotifier, IRecordStore};

/// Notification title for low-battery alerts
const LOW_BATTERY_TITLE: &str = "Agent Battery low";

/// Notification title for persistent sync failure alerts
const SYNC_WARNING_TITLE: &str = "Agent Battery sync warning";

/// Throttles alert delivery through persisted per-account cooldowns
pub struct NotificationGate {
    store: Arc<dyn IRecordStore>,
    notifier: Arc<dyn INotifier>,
}

impl NotificationGate {
    pub fn new(store: Arc<dyn IRecordStore>, notifier: Arc<dyn INotifier>) -> Self {
        Self { store, notifier }
    }

    /// Raises a low-battery alert unless one was sent within the cooldown
    ///
    /// Returns `true` if the alert was delivered.
    pub async fn notify_low_battery(
        &self,
        account: &Account,
        battery_percent: f64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let body = format!("{} is at {:.0}%", account.display_name(), battery_percent);
        self.send(account, AlertKind::LowBattery, LOW_BATTERY_TITLE, &body, now)
            .await
    }

    /// Raises a persistent-failure alert unless one was sent within the cooldown
    ///
    /// Returns `true` if the alert was delivered.
    pub async fn notify_persistent_failure(
        &self,
        account: &Account,
        failures: u32,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let body = format!(
            "{} has failed to sync {} times",
            account.display_name(),
            failures
        );
        self.send(
            account,
            AlertKind::PersistentSyncFailure,
            SYNC_WARNING_TITLE,
            &body,
            now,
        )
        .await
    }

    async fn send(
        &self,
        account: &Account,
        kind: AlertKind,
        title: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        if let Some(state) = self
            .store
            .get_notification_state(account.id(), kind)
            .await?
        {
            if state.suppresses(now) {
                tracing::debug!(
                    account_id = %account.id(),
                    kind = kind.key(),
                    "Notification suppressed by cooldown"
                );
                return Ok(false);
            }
        }

        if let Err(e) = self.notifier.show(title, body).await {
            tracing::warn!(
                account_id = %account.id(),
                kind = kind.key(),
                error = %e,
                "Notification delivery failed"
            );
            return Ok(false);
        }

        self.store
            .upsert_notification_state(account.id(), kind, now)
            .await?;

        tracing::info!(
            account_id = %account.id(),
            kind = kind.key(),
            "Notification sent"
        );
        Ok(true)
    }
}
