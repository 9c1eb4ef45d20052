//! Configuration module for Agent Battery.
//!
//! Typed configuration structs that map to the YAML configuration file,
//! with loading and defaults. This file carries ambient runtime knobs;
//! user policy (thresholds, polling interval) lives in the DB-resident
//! [`AppSettings`](crate::domain::AppSettings) row instead.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration for Agent Battery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Scheduler / fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Upper bound (seconds) of the random jitter added to the polling
    /// interval at startup.
    pub jitter_max_seconds: u64,
    /// Maximum number of accounts synced concurrently per tick.
    pub max_concurrent_syncs: usize,
    /// Optional hard timeout (seconds) for one account's sync. `None`
    /// imposes no timeout; a hung adapter call then hangs that
    /// account's sync indefinitely.
    pub sync_timeout_seconds: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            jitter_max_seconds: 10,
            max_concurrent_syncs: 8,
            sync_timeout_seconds: None,
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database. `None` uses the platform data dir.
    pub db_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolves the database path, falling back to
    /// `$XDG_DATA_HOME/agentbattery/agentbattery.db`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("agentbattery")
                .join("agentbattery.db")
        })
    }
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any
    /// error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/agentbattery/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("agentbattery")
            .join("config.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scheduler.jitter_max_seconds, 10);
        assert_eq!(config.scheduler.max_concurrent_syncs, 8);
        assert!(config.scheduler.sync_timeout_seconds.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.storage.db_path.is_none());
    }

    #[test]
    fn test_load_partial_yaml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scheduler:\n  max_concurrent_syncs: 2").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.scheduler.max_concurrent_syncs, 2);
        assert_eq!(config.scheduler.jitter_max_seconds, 10);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/config.yaml"));
        assert_eq!(config.scheduler.max_concurrent_syncs, 8);
    }

    #[test]
    fn test_resolve_db_path_explicit() {
        let storage = StorageConfig {
            db_path: Some(PathBuf::from("/tmp/test.db")),
        };
        assert_eq!(storage.resolve_db_path(), PathBuf::from("/tmp/test.db"));
    }

    #[test]
    fn test_default_path_is_nonempty() {
        assert!(!Config::default_path().as_os_str().is_empty());
    }
}
