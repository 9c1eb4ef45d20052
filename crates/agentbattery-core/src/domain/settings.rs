//! Application settings
//!
//! A single process-wide settings record, stored as one row and lazily
//! created with defaults on first access. Thresholds here are user
//! policy; ambient runtime knobs (concurrency, jitter, timeouts) live in
//! [`crate::config::Config`] instead.

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Default low-battery alert threshold in percent
pub const DEFAULT_LOW_BATTERY_THRESHOLD_PERCENT: u8 = 20;
/// Default consecutive-failure count that triggers an alert
pub const DEFAULT_PERSISTENT_FAILURE_THRESHOLD: u32 = 3;
/// Default polling interval in seconds
pub const DEFAULT_POLLING_INTERVAL_SECONDS: u32 = 120;

/// User-tunable policy settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Battery percentage at or below which a low-battery alert fires
    /// (1-99)
    pub low_battery_threshold_percent: u8,
    /// Consecutive failures at or above which a persistent-failure alert
    /// fires (>= 1)
    pub persistent_failure_threshold: u32,
    /// Scheduler polling interval in seconds (>= 30)
    pub default_polling_interval_seconds: u32,
    /// Whether debug logging is enabled
    pub debug_logs_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            low_battery_threshold_percent: DEFAULT_LOW_BATTERY_THRESHOLD_PERCENT,
            persistent_failure_threshold: DEFAULT_PERSISTENT_FAILURE_THRESHOLD,
            default_polling_interval_seconds: DEFAULT_POLLING_INTERVAL_SECONDS,
            debug_logs_enabled: false,
        }
    }
}

impl AppSettings {
    /// Validates the documented ranges
    ///
    /// # Errors
    /// Returns `DomainError::ValidationFailed` naming the offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(1..=99).contains(&self.low_battery_threshold_percent) {
            return Err(DomainError::ValidationFailed(format!(
                "low_battery_threshold_percent must be 1-99, got {}",
                self.low_battery_threshold_percent
            )));
        }
        if self.persistent_failure_threshold < 1 {
            return Err(DomainError::ValidationFailed(
                "persistent_failure_threshold must be >= 1".to_string(),
            ));
        }
        if self.default_polling_interval_seconds < 30 {
            return Err(DomainError::ValidationFailed(format!(
                "default_polling_interval_seconds must be >= 30, got {}",
                self.default_polling_interval_seconds
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.low_battery_threshold_percent, 20);
        assert_eq!(settings.persistent_failure_threshold, 3);
        assert_eq!(settings.default_polling_interval_seconds, 120);
        assert!(!settings.debug_logs_enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_threshold_bounds() {
        let mut settings = AppSettings::default();
        settings.low_battery_threshold_percent = 0;
        assert!(settings.validate().is_err());
        settings.low_battery_threshold_percent = 100;
        assert!(settings.validate().is_err());
        settings.low_battery_threshold_percent = 99;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_failure_threshold_minimum() {
        let mut settings = AppSettings::default();
        settings.persistent_failure_threshold = 0;
        assert!(settings.validate().is_err());
        settings.persistent_failure_threshold = 1;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_interval_minimum() {
        let mut settings = AppSettings::default();
        settings.default_polling_interval_seconds = 29;
        assert!(settings.validate().is_err());
        settings.default_polling_interval_seconds = 30;
        assert!(settings.validate().is_ok());
    }
}
