//! Notification dedup state and alert kinds
//!
//! Each (account, alert kind) pair carries a last-sent timestamp; a
//! second alert of the same kind within the kind's cooldown window is
//! suppressed. Cooldowns are fixed policy constants, not user settings.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{errors::DomainError, newtypes::AccountId};

/// The kinds of user-facing alerts the orchestrator can raise
///
/// The dedup mechanism is generic over the kind; adding a variant here
/// is all that is needed to introduce a new alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Battery percent dropped to or below the configured threshold
    LowBattery,
    /// An account kept failing past the persistent-failure threshold
    PersistentSyncFailure,
}

impl AlertKind {
    /// Stable key used in storage
    pub fn key(&self) -> &'static str {
        match self {
            AlertKind::LowBattery => "low_battery",
            AlertKind::PersistentSyncFailure => "persistent_sync_failure",
        }
    }

    /// Minimum interval between repeated alerts of this kind for the
    /// same account
    pub fn cooldown(&self) -> Duration {
        match self {
            AlertKind::LowBattery => Duration::minutes(15),
            AlertKind::PersistentSyncFailure => Duration::minutes(30),
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for AlertKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low_battery" => Ok(AlertKind::LowBattery),
            "persistent_sync_failure" => Ok(AlertKind::PersistentSyncFailure),
            other => Err(DomainError::UnknownValue {
                field: "alert_kind".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Last-sent bookkeeping for one (account, alert kind) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationState {
    /// The account the alert concerns
    pub account_id: AccountId,
    /// The alert kind
    pub kind: AlertKind,
    /// When an alert of this kind was last delivered for this account
    pub last_sent_at: DateTime<Utc>,
}

impl NotificationState {
    /// Returns true if another alert at `now` would fall inside the
    /// kind's cooldown window
    pub fn suppresses(&self, now: DateTime<Utc>) -> bool {
        now - self.last_sent_at < self.kind.cooldown()
    }
}
