//! Credential vault port (driven/secondary port)
//!
//! One secret slot per account id, service-scoped. The reference
//! implementation uses the operating system keyring; tests use an
//! in-memory map.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific.
//! - A missing secret is `Ok(None)`, not an error: accounts without a
//!   stored credential are a normal state (e.g. manual-auth accounts).
//! - Secret values must never appear in logs; implementations log
//!   account ids only.

use crate::domain::AccountId;

/// Port trait for secure secret storage
#[async_trait::async_trait]
pub trait ICredentialVault: Send + Sync {
    /// Stores (or replaces) the secret for an account
    async fn set(&self, account_id: &AccountId, secret: &str) -> anyhow::Result<()>;

    /// Retrieves the secret for an account, or `None` if absent
    async fn get(&self, account_id: &AccountId) -> anyhow::Result<Option<String>>;

    /// Deletes the secret for an account
    ///
    /// Returns `true` if a secret existed and was removed.
    async fn delete(&self, account_id: &AccountId) -> anyhow::Result<bool>;
}
