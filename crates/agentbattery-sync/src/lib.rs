//! Agent Battery Sync - Scheduling and orchestration
//!
//! The heart of the daemon: polls every sync-enabled account on a
//! jittered interval, drives the credential-validate / fetch / normalize
//! pipeline through the provider adapters, records an audit run per
//! attempt, applies exponential backoff per account, and raises
//! throttled desktop notifications.
//!
//! ## Modules
//!
//! - [`backoff`] - Pure delay function and per-account failure tracker
//! - [`gate`] - Cooldown-throttled notification dispatch
//! - [`service`] - The sync orchestrator and scheduler loop
//! - [`surface`] - Command surface driven by the CLI and daemon

pub mod backoff;
pub mod gate;
pub mod service;
pub mod surface;

pub use backoff::{backoff_delay, BackoffTracker};
pub use gate::NotificationGate;
pub use service::{SyncAttempt, SyncService};
pub use surface::{AppSurface, BatteryStatus, SurfaceError};
