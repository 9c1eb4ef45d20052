//! Usage snapshots and battery math
//!
//! A [`UsageSnapshot`] is a single point-in-time measurement of an
//! account's quota. Snapshots are append-only: the orchestrator writes
//! them and never updates or deletes them, forming a timeseries per
//! account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    errors::DomainError,
    newtypes::{AccountId, SnapshotId},
    window::{UsageWindow, WindowKind},
    Provider,
};

/// How trustworthy a measurement is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Reported exactly by the provider
    Exact,
    /// Derived or sampled figure
    Estimated,
    /// Entered by hand
    Manual,
}

impl Confidence {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Exact => "exact",
            Confidence::Estimated => "estimated",
            Confidence::Manual => "manual",
        }
    }
}

impl std::str::FromStr for Confidence {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Confidence::Exact),
            "estimated" => Ok(Confidence::Estimated),
            "manual" => Ok(Confidence::Manual),
            other => Err(DomainError::UnknownValue {
                field: "confidence".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Where a measurement came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    /// The provider's official API
    OfficialApi,
    /// An export file produced by the provider
    OfficialExport,
    /// Entered by hand
    Manual,
}

impl UsageSource {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageSource::OfficialApi => "official_api",
            UsageSource::OfficialExport => "official_export",
            UsageSource::Manual => "manual",
        }
    }
}

impl std::str::FromStr for UsageSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "official_api" => Ok(UsageSource::OfficialApi),
            "official_export" => Ok(UsageSource::OfficialExport),
            "manual" => Ok(UsageSource::Manual),
            other => Err(DomainError::UnknownValue {
                field: "source".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Computes the remaining-quota percentage for a used/limit pair
///
/// Defined as `clamp(max(0, limit - used) / limit * 100, 0, 100)` when
/// `limit > 0`, and `0` otherwise. A fully exhausted or over-limit
/// account therefore reads 0%, never negative.
pub fn battery_percent(used: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        return 0.0;
    }
    let remaining = (limit - used).max(0.0);
    (remaining / limit * 100.0).clamp(0.0, 100.0)
}

/// One persisted usage measurement for an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Unique snapshot identifier
    pub id: SnapshotId,
    /// Account this measurement belongs to
    pub account_id: AccountId,
    /// Provider the account belongs to (denormalised for queries)
    pub provider: Provider,
    /// Granularity of the covered window
    pub window_kind: WindowKind,
    /// Start of the covered window
    pub window_start: DateTime<Utc>,
    /// End of the covered window
    pub window_end: DateTime<Utc>,
    /// Consumed quota in `used_unit`
    pub used_value: f64,
    /// Unit of the used figure (e.g. "credits", "messages")
    pub used_unit: String,
    /// Quota ceiling in `limit_unit`
    pub limit_value: f64,
    /// Unit of the limit figure
    pub limit_unit: String,
    /// `max(0, limit - used)`
    pub remaining_value: f64,
    /// Remaining quota as a 0-100 percentage
    pub battery_percent: f64,
    /// How trustworthy the measurement is
    pub confidence: Confidence,
    /// Where the measurement came from
    pub source: UsageSource,
    /// When the figure was fetched from the provider
    pub fetched_at: DateTime<Utc>,
    /// When this record was created
    pub created_at: DateTime<Utc>,
}

impl UsageSnapshot {
    /// Builds a normalized snapshot from a raw used/limit pair
    ///
    /// Applies the remaining-value and battery-percent formulas; the id
    /// and `created_at` are freshly generated, everything else is
    /// deterministic given the inputs.
    #[allow(clippy::too_many_arguments)]
    pub fn normalized(
        account_id: AccountId,
        provider: Provider,
        window: &UsageWindow,
        used_value: f64,
        limit_value: f64,
        unit: impl Into<String>,
        confidence: Confidence,
        source: UsageSource,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let unit = unit.into();
        let remaining_value = (limit_value - used_value).max(0.0);
        Self {
            id: SnapshotId::new(),
            account_id,
            provider,
            window_kind: window.kind(),
            window_start: window.start(),
            window_end: window.end(),
            used_value,
            used_unit: unit.clone(),
            limit_value,
            limit_unit: unit,
            remaining_value,
            battery_percent: battery_percent(used_value, limit_value),
            confidence,
            source,
            fetched_at,
            created_at: Utc::now(),
        }
    }

    /// Renders the "50 messages / 200 messages" style summary shown in
    /// battery status listings
    pub fn usage_summary(&self) -> String {
        format!(
            "{} {} / {} {}",
            self.used_value, self.used_unit, self.limit_value, self.limit_unit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_percent_basic() {
        assert_eq!(battery_percent(20.0, 100.0), 80.0);
        assert_eq!(battery_percent(0.0, 100.0), 100.0);
        assert_eq!(battery_percent(100.0, 100.0), 0.0);
    }

    #[test]
    fn test_battery_percent_over_limit_clamps_to_zero() {
        assert_eq!(battery_percent(110.0, 100.0), 0.0);
    }

    #[test]
    fn test_battery_percent_zero_or_negative_limit() {
        assert_eq!(battery_percent(5.0, 0.0), 0.0);
        assert_eq!(battery_percent(0.0, 0.0), 0.0);
        assert_eq!(battery_percent(5.0, -1.0), 0.0);
    }

    #[test]
    fn test_normalized_applies_formulas() {
        let window = UsageWindow::trailing_month(Utc::now());
        let snapshot = UsageSnapshot::normalized(
            AccountId::new(),
            Provider::OpenAi,
            &window,
            25.0,
            100.0,
            "credits",
            Confidence::Exact,
            UsageSource::OfficialApi,
            Utc::now(),
        );
        assert_eq!(snapshot.remaining_value, 75.0);
        assert_eq!(snapshot.battery_percent, 75.0);
        assert_eq!(snapshot.window_kind, WindowKind::Month);
        assert_eq!(snapshot.used_unit, snapshot.limit_unit);
    }

    #[test]
    fn test_normalized_over_limit_floors_remaining() {
        let window = UsageWindow::trailing_month(Utc::now());
        let snapshot = UsageSnapshot::normalized(
            AccountId::new(),
            Provider::Cursor,
            &window,
            600.0,
            500.0,
            "requests",
            Confidence::Estimated,
            UsageSource::OfficialApi,
            Utc::now(),
        );
        assert_eq!(snapshot.remaining_value, 0.0);
        assert_eq!(snapshot.battery_percent, 0.0);
    }

    #[test]
    fn test_usage_summary() {
        let window = UsageWindow::trailing_month(Utc::now());
        let snapshot = UsageSnapshot::normalized(
            AccountId::new(),
            Provider::Claude,
            &window,
            50.0,
            200.0,
            "messages",
            Confidence::Estimated,
            UsageSource::OfficialApi,
            Utc::now(),
        );
        assert_eq!(snapshot.usage_summary(), "50 messages / 200 messages");
    }

    #[test]
    fn test_fresh_ids_per_normalization() {
        let window = UsageWindow::trailing_month(Utc::now());
        let account_id = AccountId::new();
        let make = || {
            UsageSnapshot::normalized(
                account_id,
                Provider::OpenAi,
                &window,
                1.0,
                2.0,
                "credits",
                Confidence::Exact,
                UsageSource::OfficialApi,
                Utc::now(),
            )
        };
        assert_ne!(make().id, make().id);
    }
}
