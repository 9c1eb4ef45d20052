//! Strongly-typed identifiers
//!
//! UUID-backed newtypes for the identifiers that flow through the system.
//! Using distinct types prevents mixing up an account id with a snapshot
//! or run id at compile time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Creates a nil (all zeros) identifier
            #[must_use]
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| DomainError::InvalidId(format!("{s}: {e}")))
            }
        }
    };
}

uuid_newtype! {
    /// Identifier of a tracked provider account
    AccountId
}

uuid_newtype! {
    /// Identifier of a persisted usage snapshot
    SnapshotId
}

uuid_newtype! {
    /// Identifier of a sync run (one audit record per attempt)
    RunId
}

/// Opaque reference to an account's credential slot in the vault
///
/// Assigned once at account creation as `"{provider}:{account_id}"` and
/// never changed afterwards. The vault itself is keyed by account id; the
/// ref exists so records can point at a credential without embedding
/// vault details.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialRef(String);

impl CredentialRef {
    /// Derives the canonical credential reference for an account
    pub fn for_account(provider: super::Provider, id: &AccountId) -> Self {
        Self(format!("{provider}:{id}"))
    }

    /// Wraps a stored reference string
    ///
    /// # Errors
    /// Returns `DomainError::ValidationFailed` if the string is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::ValidationFailed(
                "credential ref must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the reference as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CredentialRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Provider;

    #[test]
    fn test_account_id_roundtrip() {
        let id = AccountId::new();
        let parsed: AccountId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_account_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_distinct_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
        assert_ne!(SnapshotId::new(), SnapshotId::new());
    }

    #[test]
    fn test_nil_id() {
        assert_eq!(AccountId::nil().to_string(), Uuid::nil().to_string());
    }

    #[test]
    fn test_credential_ref_for_account() {
        let id = AccountId::nil();
        let cred = CredentialRef::for_account(Provider::OpenAi, &id);
        assert_eq!(cred.as_str(), format!("openai:{id}"));
    }

    #[test]
    fn test_credential_ref_rejects_empty() {
        assert!(CredentialRef::new("").is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id = AccountId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
