//! Agent Battery Vault - Secure credential storage
//!
//! Implements the `ICredentialVault` port from `agentbattery-core` on top
//! of the OS credential store (GNOME Keyring, KDE Wallet, macOS Keychain)
//! via the `keyring` crate. One entry per account id under a fixed
//! service name.
//!
//! Secret values never reach the log output; only account ids do.
//!
//! ## Components
//!
//! - [`KeyringCredentialVault`] - System keyring implementation
//! - [`MemoryCredentialVault`] - In-memory implementation for tests

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Context;

use agentbattery_core::domain::AccountId;
use agentbattery_core::ports::ICredentialVault;

/// Keyring service name for Agent Battery credentials
const KEYRING_SERVICE: &str = "agentbattery";

// ============================================================================
// KeyringCredentialVault
// ============================================================================

/// Stores credentials in the operating system keyring
///
/// The `keyring` crate is blocking, so every operation runs on the
/// blocking thread pool.
pub struct KeyringCredentialVault;

impl KeyringCredentialVault {
    pub fn new() -> Self {
        Self
    }

    fn entry(account_id: &AccountId) -> anyhow::Result<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, &account_id.to_string())
            .context("Failed to create keyring entry")
    }
}

impl Default for KeyringCredentialVault {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ICredentialVault for KeyringCredentialVault {
    async fn set(&self, account_id: &AccountId, secret: &str) -> anyhow::Result<()> {
        let account_id = *account_id;
        let secret = secret.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = Self::entry(&account_id)?;
            entry
                .set_password(&secret)
                .context("Failed to store credential in keyring")
        })
        .await
        .context("Keyring task panicked")??;

        tracing::debug!(account_id = %account_id, "Stored credential in keyring");
        Ok(())
    }

    async fn get(&self, account_id: &AccountId) -> anyhow::Result<Option<String>> {
        let account_id = *account_id;

        tokio::task::spawn_blocking(move || {
            let entry = Self::entry(&account_id)?;
            match entry.get_password() {
                Ok(secret) => Ok(Some(secret)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(anyhow::Error::new(e).context("Failed to read from keyring")),
            }
        })
        .await
        .context("Keyring task panicked")?
    }

    async fn delete(&self, account_id: &AccountId) -> anyhow::Result<bool> {
        let account_id = *account_id;

        let removed = tokio::task::spawn_blocking(move || {
            let entry = Self::entry(&account_id)?;
            match entry.delete_credential() {
                Ok(()) => Ok(true),
                Err(keyring::Error::NoEntry) => Ok(false),
                Err(e) => Err(anyhow::Error::new(e).context("Failed to delete from keyring")),
            }
        })
        .await
        .context("Keyring task panicked")??;

        if removed {
            tracing::info!(account_id = %account_id, "Removed credential from keyring");
        }
        Ok(removed)
    }
}

// ============================================================================
// MemoryCredentialVault
// ============================================================================

/// In-memory vault for tests and environments without a keyring daemon
#[derive(Default)]
pub struct MemoryCredentialVault {
    secrets: Mutex<HashMap<AccountId, String>>,
}

impl MemoryCredentialVault {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ICredentialVault for MemoryCredentialVault {
    async fn set(&self, account_id: &AccountId, secret: &str) -> anyhow::Result<()> {
        let mut secrets = self
            .secrets
            .lock()
            .map_err(|_| anyhow::anyhow!("Vault lock poisoned"))?;
        secrets.insert(*account_id, secret.to_string());
        Ok(())
    }

    async fn get(&self, account_id: &AccountId) -> anyhow::Result<Option<String>> {
        let secrets = self
            .secrets
            .lock()
            .map_err(|_| anyhow::anyhow!("Vault lock poisoned"))?;
        Ok(secrets.get(account_id).cloned())
    }

    async fn delete(&self, account_id: &AccountId) -> anyhow::Result<bool> {
        let mut secrets = self
            .secrets
            .lock()
            .map_err(|_| anyhow::anyhow!("Vault lock poisoned"))?;
        Ok(secrets.remove(account_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_vault_roundtrip() {
        let vault = MemoryCredentialVault::new();
        let id = AccountId::new();

        assert!(vault.get(&id).await.unwrap().is_none());

        vault.set(&id, "sk-test-secret").await.unwrap();
        assert_eq!(vault.get(&id).await.unwrap().as_deref(), Some("sk-test-secret"));

        vault.set(&id, "sk-rotated").await.unwrap();
        assert_eq!(vault.get(&id).await.unwrap().as_deref(), Some("sk-rotated"));
    }

    #[tokio::test]
    async fn test_memory_vault_delete_reports_presence() {
        let vault = MemoryCredentialVault::new();
        let id = AccountId::new();

        assert!(!vault.delete(&id).await.unwrap());

        vault.set(&id, "secret").await.unwrap();
        assert!(vault.delete(&id).await.unwrap());
        assert!(vault.get(&id).await.unwrap().is_none());
        assert!(!vault.delete(&id).await.unwrap());
    }
}
