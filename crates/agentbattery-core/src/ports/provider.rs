//! Provider adapter port and dispatch registry
//!
//! Each provider adapter implements the three-step pipeline the
//! orchestrator depends on: `validate_credentials` then `fetch_usage`
//! then `normalize`. Adapters are a narrow, swappable strategy; the
//! orchestrator never sees provider-specific details beyond this
//! contract.
//!
//! ## Design Notes
//!
//! - `validate_credentials` never errors for ordinary bad-format
//!   secrets; it returns `valid: false`. Manual-auth accounts are always
//!   valid.
//! - `fetch_usage` raises a typed [`ProviderError`](crate::domain::ProviderError)
//!   for missing/malformed credentials; manual-auth accounts
//!   short-circuit to a zero-usage manual record.
//! - `normalize` is pure and deterministic given its inputs, except for
//!   the freshly generated snapshot id and `created_at`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Account, Confidence, Provider, UsageSnapshot, UsageSource, UsageWindow,
};

/// Result of a credential validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialCheck {
    /// Whether the stored secret is usable
    pub valid: bool,
    /// When the credential expires, if the provider reports it
    pub expires_at: Option<DateTime<Utc>>,
}

impl CredentialCheck {
    /// A valid credential with no known expiry
    pub fn valid() -> Self {
        Self {
            valid: true,
            expires_at: None,
        }
    }

    /// An unusable credential
    pub fn invalid() -> Self {
        Self {
            valid: false,
            expires_at: None,
        }
    }
}

/// Raw usage figure as fetched from a provider, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUsageRecord {
    /// Consumed quota
    pub used: f64,
    /// Quota ceiling
    pub limit: f64,
    /// Unit of both figures
    pub unit: String,
    /// When the figure was fetched
    pub fetched_at: DateTime<Utc>,
    /// Where the figure came from
    pub source: UsageSource,
    /// How trustworthy the figure is
    pub confidence: Confidence,
}

impl RawUsageRecord {
    /// The zero-usage record manual-auth accounts short-circuit to
    pub fn manual(unit: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            used: 0.0,
            limit: 1.0,
            unit: unit.into(),
            fetched_at,
            source: UsageSource::Manual,
            confidence: Confidence::Manual,
        }
    }
}

/// Port trait for provider-specific usage adapters
#[async_trait::async_trait]
pub trait IProviderAdapter: Send + Sync {
    /// The provider this adapter serves
    fn provider(&self) -> Provider;

    /// Checks whether the stored secret is usable for this account
    ///
    /// Returns `valid: false` for ordinary invalid-format secrets
    /// rather than erroring. Manual-auth accounts are always valid.
    async fn validate_credentials(
        &self,
        account: &Account,
        secret: Option<&str>,
    ) -> anyhow::Result<CredentialCheck>;

    /// Fetches the raw usage figure for the given window
    ///
    /// # Errors
    /// Raises a typed `ProviderError` for missing or malformed
    /// credentials and for any provider-side failure.
    async fn fetch_usage(
        &self,
        account: &Account,
        window: &UsageWindow,
        secret: Option<&str>,
    ) -> anyhow::Result<RawUsageRecord>;

    /// Normalizes a raw record into a snapshot
    ///
    /// Applies the remaining-value and battery-percent formulas. The
    /// default implementation is correct for every adapter; override
    /// only if a provider needs unit conversion first.
    fn normalize(
        &self,
        account: &Account,
        raw: &RawUsageRecord,
        window: &UsageWindow,
    ) -> UsageSnapshot {
        UsageSnapshot::normalized(
            *account.id(),
            self.provider(),
            window,
            raw.used,
            raw.limit,
            raw.unit.clone(),
            raw.confidence,
            raw.source,
            raw.fetched_at,
        )
    }
}

/// Dispatch table from provider to adapter, built once at startup
///
/// Providers are a closed set; lookup is by enum variant, never by
/// string key.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Provider, Arc<dyn IProviderAdapter>>,
}

impl AdapterRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under its own provider
    ///
    /// Replaces any previously registered adapter for that provider.
    pub fn register(&mut self, adapter: Arc<dyn IProviderAdapter>) {
        self.adapters.insert(adapter.provider(), adapter);
    }

    /// Looks up the adapter for a provider
    pub fn get(&self, provider: Provider) -> Option<Arc<dyn IProviderAdapter>> {
        self.adapters.get(&provider).cloned()
    }

    /// Returns the providers with a registered adapter
    pub fn providers(&self) -> Vec<Provider> {
        let mut providers: Vec<Provider> = self.adapters.keys().copied().collect();
        providers.sort_by_key(|p| p.as_str());
        providers
    }

    /// Returns the number of registered adapters
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true if no adapters are registered
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthType, ProviderError};

    struct StubAdapter(Provider);

    #[async_trait::async_trait]
    impl IProviderAdapter for StubAdapter {
        fn provider(&self) -> Provider {
            self.0
        }

        async fn validate_credentials(
            &self,
            _account: &Account,
            _secret: Option<&str>,
        ) -> anyhow::Result<CredentialCheck> {
            Ok(CredentialCheck::valid())
        }

        async fn fetch_usage(
            &self,
            _account: &Account,
            _window: &UsageWindow,
            _secret: Option<&str>,
        ) -> anyhow::Result<RawUsageRecord> {
            Err(ProviderError::unsupported("stub").into())
        }
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(StubAdapter(Provider::Claude)));
        assert!(registry.get(Provider::Claude).is_some());
        assert!(registry.get(Provider::OpenAi).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(StubAdapter(Provider::Cursor)));
        registry.register(Arc::new(StubAdapter(Provider::Cursor)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_default_normalize_applies_formulas() {
        let adapter = StubAdapter(Provider::OpenAi);
        let account = Account::new(Provider::OpenAi, "test", AuthType::ApiKey);
        let window = UsageWindow::trailing_month(Utc::now());
        let raw = RawUsageRecord {
            used: 25.0,
            limit: 100.0,
            unit: "credits".to_string(),
            fetched_at: Utc::now(),
            source: UsageSource::OfficialApi,
            confidence: Confidence::Exact,
        };
        let snapshot = adapter.normalize(&account, &raw, &window);
        assert_eq!(snapshot.remaining_value, 75.0);
        assert_eq!(snapshot.battery_percent, 75.0);
        assert_eq!(snapshot.provider, Provider::OpenAi);
        assert_eq!(snapshot.account_id, *account.id());
    }

    #[test]
    fn test_manual_raw_record() {
        let raw = RawUsageRecord::manual("messages", Utc::now());
        assert_eq!(raw.used, 0.0);
        assert_eq!(raw.limit, 1.0);
        assert_eq!(raw.source, UsageSource::Manual);
        assert_eq!(raw.confidence, Confidence::Manual);
    }
}
