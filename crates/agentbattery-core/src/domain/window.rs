//! Usage window value type
//!
//! A [`UsageWindow`] describes the time range a usage figure covers.
//! Immutable once constructed; it is passed into a sync call and stored
//! denormalised on the resulting snapshot, never on its own.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Granularity of a usage window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// Trailing hour
    Hour,
    /// Trailing day
    Day,
    /// Trailing week
    Week,
    /// Trailing month
    Month,
    /// Arbitrary caller-supplied range
    Custom,
}

impl WindowKind {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::Hour => "hour",
            WindowKind::Day => "day",
            WindowKind::Week => "week",
            WindowKind::Month => "month",
            WindowKind::Custom => "custom",
        }
    }
}

impl std::fmt::Display for WindowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WindowKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(WindowKind::Hour),
            "day" => Ok(WindowKind::Day),
            "week" => Ok(WindowKind::Week),
            "month" => Ok(WindowKind::Month),
            "custom" => Ok(WindowKind::Custom),
            other => Err(DomainError::UnknownValue {
                field: "window_kind".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// The time range a usage measurement covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageWindow {
    kind: WindowKind,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl UsageWindow {
    /// Creates a window, enforcing `start <= end`
    ///
    /// # Errors
    /// Returns `DomainError::InvalidWindow` when the range is inverted.
    pub fn new(
        kind: WindowKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidWindow(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { kind, start, end })
    }

    /// The default sync window: the trailing 30 days ending now,
    /// reported as a `month` window
    pub fn trailing_month(now: DateTime<Utc>) -> Self {
        Self {
            kind: WindowKind::Month,
            start: now - Duration::days(30),
            end: now,
        }
    }

    /// Returns the window granularity
    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    /// Returns the inclusive start instant
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the inclusive end instant
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}
