//! Domain error types and the provider error taxonomy
//!
//! Provider adapters raise [`ProviderError`]s; the orchestrator maps any
//! other failure into the taxonomy at its boundary and records the result
//! on the sync run. Nothing escapes `sync_account` as an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid identifier format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// A usage window with `start > end`
    #[error("Invalid usage window: {0}")]
    InvalidWindow(String),

    /// Unknown enum discriminant read from storage or input
    #[error("Unknown value for {field}: {value}")]
    UnknownValue {
        /// Field being parsed
        field: String,
        /// The offending value
        value: String,
    },

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// Classification of a provider-side failure
///
/// The `retryable` flag is informational: the orchestrator applies its
/// backoff-and-retry-later policy uniformly regardless of the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Bad or missing credential format
    Auth,
    /// Transient network failure
    Network,
    /// Provider rate limit hit
    RateLimit,
    /// The adapter received a response it could not interpret
    Parse,
    /// The operation is not supported for this account/provider
    Unsupported,
    /// Catch-all for anything not raised as a typed provider error
    Unknown,
}

impl ProviderErrorKind {
    /// Stable string code persisted on sync runs
    pub fn code(&self) -> &'static str {
        match self {
            ProviderErrorKind::Auth => "auth",
            ProviderErrorKind::Network => "network",
            ProviderErrorKind::RateLimit => "rate_limit",
            ProviderErrorKind::Parse => "parse",
            ProviderErrorKind::Unsupported => "unsupported",
            ProviderErrorKind::Unknown => "unknown",
        }
    }

    /// Whether this class of failure is considered transient
    pub fn retryable(&self) -> bool {
        matches!(self, ProviderErrorKind::Network | ProviderErrorKind::RateLimit)
    }
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A typed failure from a provider adapter
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    /// Failure classification
    pub kind: ProviderErrorKind,
    /// Human-readable description, safe to surface and persist
    pub message: String,
}

impl ProviderError {
    /// Creates a provider error of the given kind
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Bad or missing credential format
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Auth, message)
    }

    /// Transient network failure
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Network, message)
    }

    /// Provider rate limit hit
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimit, message)
    }

    /// Uninterpretable provider response
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Parse, message)
    }

    /// Unsupported operation
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unsupported, message)
    }

    /// Catch-all
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unknown, message)
    }

    /// Whether this failure is considered transient
    pub fn retryable(&self) -> bool {
        self.kind.retryable()
    }

    /// Maps an arbitrary error into the taxonomy
    ///
    /// A `ProviderError` passes through unchanged; anything else becomes
    /// `unknown` with the error's display text as the message.
    pub fn from_any(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<ProviderError>() {
            Some(provider_error) => provider_error.clone(),
            None => ProviderError::unknown(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(ProviderErrorKind::Auth.code(), "auth");
        assert_eq!(ProviderErrorKind::RateLimit.code(), "rate_limit");
        assert_eq!(ProviderErrorKind::Unknown.code(), "unknown");
    }

    #[test]
    fn test_retryability() {
        assert!(ProviderErrorKind::Network.retryable());
        assert!(ProviderErrorKind::RateLimit.retryable());
        assert!(!ProviderErrorKind::Auth.retryable());
        assert!(!ProviderErrorKind::Parse.retryable());
        assert!(!ProviderErrorKind::Unsupported.retryable());
        assert!(!ProviderErrorKind::Unknown.retryable());
    }

    #[test]
    fn test_display() {
        let err = ProviderError::auth("Missing API key");
        assert_eq!(err.to_string(), "auth: Missing API key");
    }

    #[test]
    fn test_from_any_passes_typed_errors_through() {
        let typed: anyhow::Error = ProviderError::rate_limit("429").into();
        let mapped = ProviderError::from_any(&typed);
        assert_eq!(mapped.kind, ProviderErrorKind::RateLimit);
        assert_eq!(mapped.message, "429");
    }

    #[test]
    fn test_from_any_wraps_untyped_errors() {
        let untyped = anyhow::anyhow!("socket closed unexpectedly");
        let mapped = ProviderError::from_any(&untyped);
        assert_eq!(mapped.kind, ProviderErrorKind::Unknown);
        assert_eq!(mapped.message, "socket closed unexpectedly");
        assert!(!mapped.retryable());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ProviderErrorKind::RateLimit).unwrap();
        assert_eq!(json, "\"rate_limit\"");
    }
}
