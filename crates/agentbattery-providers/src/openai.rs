//! OpenAI usage adapter
//!
//! Validates API keys by their `sk-` prefix and reports a placeholder
//! usage figure until the billing endpoint integration lands.

use chrono::Utc;

use agentbattery_core::domain::{
    Account, AuthType, Confidence, Provider, ProviderError, UsageSource, UsageWindow,
};
use agentbattery_core::ports::{CredentialCheck, IProviderAdapter, RawUsageRecord};

/// Required prefix for OpenAI API keys
const KEY_PREFIX: &str = "sk-";

/// Unit OpenAI quota figures are reported in
const USAGE_UNIT: &str = "credits";

/// Placeholder figures until the usage endpoint is wired up
const PLACEHOLDER_USED: f64 = 12.0;
const PLACEHOLDER_LIMIT: f64 = 100.0;

/// Adapter for OpenAI accounts
#[derive(Debug, Default)]
pub struct OpenAiAdapter;

impl OpenAiAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl IProviderAdapter for OpenAiAdapter {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn validate_credentials(
        &self,
        account: &Account,
        secret: Option<&str>,
    ) -> anyhow::Result<CredentialCheck> {
        if account.auth_type() == AuthType::Manual {
            return Ok(CredentialCheck::valid());
        }

        match secret {
            Some(s) if s.starts_with(KEY_PREFIX) => Ok(CredentialCheck::valid()),
            _ => Ok(CredentialCheck::invalid()),
        }
    }

    async fn fetch_usage(
        &self,
        account: &Account,
        _window: &UsageWindow,
        secret: Option<&str>,
    ) -> anyhow::Result<RawUsageRecord> {
        if account.auth_type() == AuthType::Manual {
            return Ok(RawUsageRecord::manual(USAGE_UNIT, Utc::now()));
        }

        let secret =
            secret.ok_or_else(|| ProviderError::auth("No credential stored for account"))?;
        if !secret.starts_with(KEY_PREFIX) {
            return Err(ProviderError::auth("OpenAI API keys must start with 'sk-'").into());
        }

        // TODO: call the OpenAI usage endpoint once the billing API is stable.
        tracing::debug!(account_id = %account.id(), "Returning placeholder OpenAI usage figure");
        Ok(RawUsageRecord {
            used: PLACEHOLDER_USED,
            limit: PLACEHOLDER_LIMIT,
            unit: USAGE_UNIT.to_string(),
            fetched_at: Utc::now(),
            source: UsageSource::OfficialApi,
            confidence: Confidence::Estimated,
        })
    }
}
