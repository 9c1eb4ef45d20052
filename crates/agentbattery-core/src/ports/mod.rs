//! Port traits (hexagonal architecture)
//!
//! These are the seams between the domain/orchestrator and the outside
//! world. Driven adapters implement them: the SQLite store, the keyring
//! vault, the desktop notifier, and one provider adapter per provider.

pub mod credential_vault;
pub mod notifier;
pub mod provider;
pub mod record_store;

pub use credential_vault::ICredentialVault;
pub use notifier::INotifier;
pub use provider::{AdapterRegistry, CredentialCheck, IProviderAdapter, RawUsageRecord};
pub use record_store::IRecordStore;
