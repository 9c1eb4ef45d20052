//! Agent Battery Core - Domain logic and ports
//!
//! This crate contains the pure domain layer of Agent Battery:
//! entities, value objects, error taxonomy, and the port traits that
//! driven adapters (storage, credential vault, notifications, provider
//! adapters) implement.
//!
//! No I/O happens in this crate.

pub mod config;
pub mod domain;
pub mod ports;

pub use config::Config;
pub use domain::{
    Account, AccountStatus, AppSettings, AuthType, Provider, SyncOutcome, SyncRun, UsageSnapshot,
    UsageWindow,
};
