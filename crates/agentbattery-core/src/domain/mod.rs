//! Domain entities and value objects for Agent Battery.

pub mod account;
pub mod errors;
pub mod newtypes;
pub mod notification;
pub mod settings;
pub mod snapshot;
pub mod sync_run;
pub mod window;

pub use account::{Account, AccountStatus, AuthType, Provider};
pub use errors::{DomainError, ProviderError, ProviderErrorKind};
pub use newtypes::{AccountId, CredentialRef, RunId, SnapshotId};
pub use notification::{AlertKind, NotificationState};
pub use settings::AppSettings;
pub use snapshot::{battery_percent, Confidence, UsageSnapshot, UsageSource};
pub use sync_run::{SyncOutcome, SyncRun};
pub use window::{UsageWindow, WindowKind};
