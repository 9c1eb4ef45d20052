//! Account domain entity
//!
//! An [`Account`] is one credentialed identity against one provider,
//! tracked for usage. The orchestrator mutates its health fields
//! (status, last error, last validated); account-management operations
//! mutate the display fields. The two sets never overlap.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    errors::DomainError,
    newtypes::{AccountId, CredentialRef},
};

/// The closed set of providers Agent Battery can poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI platform credits
    OpenAi,
    /// Anthropic Claude message quota
    Claude,
    /// Cursor request quota
    Cursor,
}

impl Provider {
    /// All providers, in registry order
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Claude, Provider::Cursor];

    /// Stable string form used in storage and credential refs
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Claude => "claude",
            Provider::Cursor => "cursor",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Provider::OpenAi),
            "claude" => Ok(Provider::Claude),
            "cursor" => Ok(Provider::Cursor),
            other => Err(DomainError::UnknownValue {
                field: "provider".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// How the account authenticates against its provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// Long-lived API key stored in the vault
    ApiKey,
    /// Session token stored in the vault
    Session,
    /// No credential; usage is entered by hand
    Manual,
}

impl AuthType {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::ApiKey => "api_key",
            AuthType::Session => "session",
            AuthType::Manual => "manual",
        }
    }
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AuthType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api_key" => Ok(AuthType::ApiKey),
            "session" => Ok(AuthType::Session),
            "manual" => Ok(AuthType::Manual),
            other => Err(DomainError::UnknownValue {
                field: "auth_type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Health of an account as observed by the orchestrator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Last sync succeeded
    #[default]
    Ok,
    /// Degraded but usable
    Warning,
    /// Last sync failed
    Error,
    /// Credential validation rejected the stored secret
    InvalidCredentials,
}

impl AccountStatus {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Ok => "ok",
            AccountStatus::Warning => "warning",
            AccountStatus::Error => "error",
            AccountStatus::InvalidCredentials => "invalid_credentials",
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(AccountStatus::Ok),
            "warning" => Ok(AccountStatus::Warning),
            "error" => Ok(AccountStatus::Error),
            "invalid_credentials" => Ok(AccountStatus::InvalidCredentials),
            other => Err(DomainError::UnknownValue {
                field: "status".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// A tracked provider account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique, stable identifier
    id: AccountId,
    /// Which provider this account belongs to
    provider: Provider,
    /// User-facing name
    display_name: String,
    /// Optional provider organisation / workspace scope
    org_workspace_id: Option<String>,
    /// How the account authenticates
    auth_type: AuthType,
    /// Whether the scheduler polls this account
    sync_enabled: bool,
    /// Per-account polling interval override in seconds
    sync_interval_seconds: Option<u32>,
    /// Opaque reference to the stored credential; assigned at creation,
    /// never changed
    credential_ref: CredentialRef,
    /// When credentials were last validated successfully
    last_validated_at: Option<DateTime<Utc>>,
    /// When the stored credential expires, if known
    expires_at: Option<DateTime<Utc>>,
    /// Current health status
    status: AccountStatus,
    /// Message of the most recent failure, cleared on success
    last_error: Option<String>,
    /// When this account was created
    created_at: DateTime<Utc>,
    /// When this account was last modified
    updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new account with sync enabled and `ok` status
    ///
    /// The credential ref is derived from the provider and the freshly
    /// generated id; it stays fixed for the lifetime of the account.
    pub fn new(
        provider: Provider,
        display_name: impl Into<String>,
        auth_type: AuthType,
    ) -> Self {
        let id = AccountId::new();
        let now = Utc::now();
        Self {
            id,
            provider,
            display_name: display_name.into(),
            org_workspace_id: None,
            auth_type,
            sync_enabled: true,
            sync_interval_seconds: None,
            credential_ref: CredentialRef::for_account(provider, &id),
            last_validated_at: None,
            expires_at: None,
            status: AccountStatus::Ok,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitutes an account from storage
    ///
    /// All fields are taken as-is; no defaulting happens here.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: AccountId,
        provider: Provider,
        display_name: String,
        org_workspace_id: Option<String>,
        auth_type: AuthType,
        sync_enabled: bool,
        sync_interval_seconds: Option<u32>,
        credential_ref: CredentialRef,
        last_validated_at: Option<DateTime<Utc>>,
        expires_at: Option<DateTime<Utc>>,
        status: AccountStatus,
        last_error: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            provider,
            display_name,
            org_workspace_id,
            auth_type,
            sync_enabled,
            sync_interval_seconds,
            credential_ref,
            last_validated_at,
            expires_at,
            status,
            last_error,
            created_at,
            updated_at,
        }
    }

    // --- Getters ---

    /// Returns the account's unique identifier
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Returns the provider this account belongs to
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Returns the user-facing name
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the optional organisation / workspace scope
    pub fn org_workspace_id(&self) -> Option<&str> {
        self.org_workspace_id.as_deref()
    }

    /// Returns the authentication type
    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    /// Returns whether the scheduler polls this account
    pub fn sync_enabled(&self) -> bool {
        self.sync_enabled
    }

    /// Returns the per-account polling interval override, if set
    pub fn sync_interval_seconds(&self) -> Option<u32> {
        self.sync_interval_seconds
    }

    /// Returns the credential reference
    pub fn credential_ref(&self) -> &CredentialRef {
        &self.credential_ref
    }

    /// Returns when credentials were last validated
    pub fn last_validated_at(&self) -> Option<DateTime<Utc>> {
        self.last_validated_at
    }

    /// Returns the credential expiry, if known
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns the current health status
    pub fn status(&self) -> AccountStatus {
        self.status
    }

    /// Returns the most recent failure message, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns when the account was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the account was last modified
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // --- Display-field mutations (account management) ---

    /// Renames the account
    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
        self.touch();
    }

    /// Sets or clears the organisation / workspace scope
    pub fn set_org_workspace_id(&mut self, org: Option<String>) {
        self.org_workspace_id = org;
        self.touch();
    }

    /// Enables or disables scheduled polling
    pub fn set_sync_enabled(&mut self, enabled: bool) {
        self.sync_enabled = enabled;
        self.touch();
    }

    /// Sets or clears the per-account polling interval override
    pub fn set_sync_interval_seconds(&mut self, seconds: Option<u32>) {
        self.sync_interval_seconds = seconds;
        self.touch();
    }

    // --- Health mutations (orchestrator) ---

    /// Records a successful sync: status `ok`, error cleared,
    /// validation timestamp refreshed
    pub fn record_sync_success(&mut self, validated_at: DateTime<Utc>) {
        self.status = AccountStatus::Ok;
        self.last_error = None;
        self.last_validated_at = Some(validated_at);
        self.touch();
    }

    /// Records a failed sync: status `error` with the message attached
    pub fn record_sync_failure(&mut self, message: impl Into<String>) {
        self.status = AccountStatus::Error;
        self.last_error = Some(message.into());
        self.touch();
    }

    /// Records the outcome of an explicit credential validation
    pub fn record_validation(
        &mut self,
        valid: bool,
        validated_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) {
        self.status = if valid {
            AccountStatus::Ok
        } else {
            AccountStatus::InvalidCredentials
        };
        self.last_validated_at = Some(validated_at);
        self.expires_at = expires_at;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_account() -> Account {
        Account::new(Provider::Claude, "Work Claude", AuthType::ApiKey)
    }

    mod enum_tests {
        use super::*;

        #[test]
        fn test_provider_roundtrip() {
            for provider in Provider::ALL {
                let parsed: Provider = provider.as_str().parse().unwrap();
                assert_eq!(provider, parsed);
            }
        }

        #[test]
        fn test_provider_rejects_unknown() {
            assert!("gemini".parse::<Provider>().is_err());
        }

        #[test]
        fn test_auth_type_roundtrip() {
            for auth in [AuthType::ApiKey, AuthType::Session, AuthType::Manual] {
                let parsed: AuthType = auth.as_str().parse().unwrap();
                assert_eq!(auth, parsed);
            }
        }

        #[test]
        fn test_status_roundtrip() {
            for status in [
                AccountStatus::Ok,
                AccountStatus::Warning,
                AccountStatus::Error,
                AccountStatus::InvalidCredentials,
            ] {
                let parsed: AccountStatus = status.as_str().parse().unwrap();
                assert_eq!(status, parsed);
            }
        }

        #[test]
        fn test_provider_serialization() {
            assert_eq!(
                serde_json::to_string(&Provider::OpenAi).unwrap(),
                "\"openai\""
            );
        }
    }

    mod account_tests {
        use super::*;

        #[test]
        fn test_new_account_defaults() {
            let account = create_test_account();
            assert_eq!(account.provider(), Provider::Claude);
            assert_eq!(account.display_name(), "Work Claude");
            assert!(account.sync_enabled());
            assert_eq!(account.status(), AccountStatus::Ok);
            assert!(account.last_error().is_none());
            assert!(account.last_validated_at().is_none());
            assert!(account.sync_interval_seconds().is_none());
        }

        #[test]
        fn test_credential_ref_fixed_at_creation() {
            let account = create_test_account();
            let expected = format!("claude:{}", account.id());
            assert_eq!(account.credential_ref().as_str(), expected);
        }

        #[test]
        fn test_record_sync_failure_then_success() {
            let mut account = create_test_account();

            account.record_sync_failure("network: connection refused");
            assert_eq!(account.status(), AccountStatus::Error);
            assert_eq!(account.last_error(), Some("network: connection refused"));

            let now = Utc::now();
            account.record_sync_success(now);
            assert_eq!(account.status(), AccountStatus::Ok);
            assert!(account.last_error().is_none());
            assert_eq!(account.last_validated_at(), Some(now));
        }

        #[test]
        fn test_record_validation_invalid() {
            let mut account = create_test_account();
            let now = Utc::now();
            account.record_validation(false, now, None);
            assert_eq!(account.status(), AccountStatus::InvalidCredentials);
            assert_eq!(account.last_validated_at(), Some(now));
        }

        #[test]
        fn test_record_validation_valid_with_expiry() {
            let mut account = create_test_account();
            let now = Utc::now();
            let expiry = now + chrono::Duration::days(30);
            account.record_validation(true, now, Some(expiry));
            assert_eq!(account.status(), AccountStatus::Ok);
            assert_eq!(account.expires_at(), Some(expiry));
        }

        #[test]
        fn test_display_mutations_touch_updated_at() {
            let mut account = create_test_account();
            let before = account.updated_at();
            std::thread::sleep(std::time::Duration::from_millis(2));
            account.set_display_name("Renamed");
            assert_eq!(account.display_name(), "Renamed");
            assert!(account.updated_at() > before);
        }

        #[test]
        fn test_serialization_roundtrip() {
            let account = create_test_account();
            let json = serde_json::to_string(&account).unwrap();
            let deserialized: Account = serde_json::from_str(&json).unwrap();
            assert_eq!(account, deserialized);
        }
    }
}
