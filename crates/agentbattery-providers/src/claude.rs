//! Claude usage adapter
//!
//! Validates API keys by their `sk-ant-` prefix and reports a
//! placeholder usage figure until the usage endpoint integration lands.

use chrono::Utc;

use agentbattery_core::domain::{
    Account, AuthType, Confidence, Provider, ProviderError, UsageSource, UsageWindow,
};
use agentbattery_core::ports::{CredentialCheck, IProviderAdapter, RawUsageRecord};

/// Required prefix for Claude API keys
const KEY_PREFIX: &str = "sk-ant-";

/// Unit Claude quota figures are reported in
const USAGE_UNIT: &str = "messages";

/// Placeholder figures until the usage endpoint is wired up
const PLACEHOLDER_USED: f64 = 50.0;
const PLACEHOLDER_LIMIT: f64 = 200.0;

/// Adapter for Claude accounts
#[derive(Debug, Default)]
pub struct ClaudeAdapter;

impl ClaudeAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl IProviderAdapter for ClaudeAdapter {
    fn provider(&self) -> Provider {
        Provider::Claude
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
            return Err(ProviderError::auth("Claude API keys must start with 'sk-ant-'").into());
        }

        tracing::debug!(account_id = %account.id(), "Returning placeholder Claude usage figure");
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

#[cfg(test)]
mod tests {
    use super::*;

    fn api_key_account() -> Account {
        Account::new(Provider::Claude, "Claude test", AuthType::ApiKey)
    }

    #[tokio::test]
    async fn test_validate_requires_ant_prefix() {
        let adapter = ClaudeAdapter::new();
        let account = api_key_account();

        assert!(
            adapter
                .validate_credentials(&account, Some("sk-ant-xyz"))
                .await
                .unwrap()
                .valid
        );
        // A plain OpenAI-style key is not enough.
        assert!(
            !adapter
                .validate_credentials(&account, Some("sk-xyz"))
                .await
                .unwrap()
                .valid
        );
    }

    #[tokio::test]
    async fn test_fetch_returns_placeholder_figure() {
        let adapter = ClaudeAdapter::new();
        let account = api_key_account();
        let window = UsageWindow::trailing_month(Utc::now());

        let raw = adapter
            .fetch_usage(&account, &window, Some("sk-ant-xyz"))
            .await
            .unwrap();
        assert_eq!(raw.used, 50.0);
        assert_eq!(raw.limit, 200.0);
        assert_eq!(raw.unit, "messages");
        assert_eq!(raw.confidence, Confidence::Estimated);
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_secret() {
        let adapter = ClaudeAdapter::new();
        let account = api_key_account();
        let window = UsageWindow::trailing_month(Utc::now());

        let err = adapter
            .fetch_usage(&account, &window, Some("sk-xyz"))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<ProviderError>().unwrap().kind.code(), "auth");
    }

    #[tokio::test]
    async fn test_manual_auth_short_circuits() {
        let adapter = ClaudeAdapter::new();
        let account = Account::new(Provider::Claude, "Manual", AuthType::Manual);
        let window = UsageWindow::trailing_month(Utc::now());

        assert!(adapter.validate_credentials(&account, None).await.unwrap().valid);
        let raw = adapter.fetch_usage(&account, &window, None).await.unwrap();
        assert_eq!(raw.unit, "messages");
        assert_eq!(raw.source, UsageSource::Manual);
    }
}
