//! Sync run audit records
//!
//! A [`SyncRun`] records one attempt to poll a provider for one account.
//! The row is created *before* the attempt with the outcome defaulted to
//! failure, so a crash mid-run leaves a permanently open failure record:
//! open runs are distinguishable from closed failures only by
//! `finished_at` being unset. A run is never mutated after `finished_at`
//! is set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    errors::DomainError,
    newtypes::{AccountId, RunId},
    ProviderError,
};

/// Terminal outcome of a sync attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The attempt completed and a snapshot was persisted
    Success,
    /// The attempt failed (or never finished)
    Failure,
}

impl SyncOutcome {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Success => "success",
            SyncOutcome::Failure => "failure",
        }
    }
}

impl std::str::FromStr for SyncOutcome {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(SyncOutcome::Success),
            "failure" => Ok(SyncOutcome::Failure),
            other => Err(DomainError::UnknownValue {
                field: "outcome".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Audit record of one sync attempt for one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRun {
    id: RunId,
    account_id: AccountId,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    outcome: SyncOutcome,
    error_code: Option<String>,
    error_message: Option<String>,
    attempts: u32,
    next_retry_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl SyncRun {
    /// Opens a run record at the start of an attempt
    ///
    /// `attempts` is 1-based: the current consecutive failure count plus
    /// one. The outcome defaults to failure until the attempt completes.
    pub fn begin(account_id: AccountId, attempts: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            id: RunId::new(),
            account_id,
            started_at,
            finished_at: None,
            outcome: SyncOutcome::Failure,
            error_code: None,
            error_message: None,
            attempts,
            next_retry_at: None,
            created_at: started_at,
        }
    }

    /// Reconstitutes a run from storage
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: RunId,
        account_id: AccountId,
        started_at: DateTime<Utc>,
        finished_at: Option<DateTime<Utc>>,
        outcome: SyncOutcome,
        error_code: Option<String>,
        error_message: Option<String>,
        attempts: u32,
        next_retry_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            started_at,
            finished_at,
            outcome,
            error_code,
            error_message,
            attempts,
            next_retry_at,
            created_at,
        }
    }

    /// Closes the run as a success
    pub fn complete_success(&mut self, finished_at: DateTime<Utc>) {
        self.outcome = SyncOutcome::Success;
        self.finished_at = Some(finished_at);
        self.error_code = None;
        self.error_message = None;
        self.next_retry_at = None;
    }

    /// Closes the run as a failure with the mapped error and the instant
    /// the account becomes retry-eligible again
    pub fn complete_failure(
        &mut self,
        error: &ProviderError,
        next_retry_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) {
        self.outcome = SyncOutcome::Failure;
        self.finished_at = Some(finished_at);
        self.error_code = Some(error.kind.code().to_string());
        self.error_message = Some(error.message.clone());
        self.next_retry_at = Some(next_retry_at);
    }

    /// Returns true while the attempt has not completed
    pub fn is_open(&self) -> bool {
        self.finished_at.is_none()
    }

    // --- Getters ---

    /// Returns the run identifier
    pub fn id(&self) -> &RunId {
        &self.id
    }

    /// Returns the account this run belongs to
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Returns when the attempt started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns when the attempt finished, if it did
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Returns the recorded outcome
    pub fn outcome(&self) -> SyncOutcome {
        self.outcome
    }

    /// Returns the taxonomy code of the failure, if any
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    /// Returns the failure message, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the 1-based attempt number
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns when the account becomes retry-eligible, if the run failed
    pub fn next_retry_at(&self) -> Option<DateTime<Utc>> {
        self.next_retry_at
    }

    /// Returns when the record was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProviderError;

    #[test]
    fn test_begin_opens_as_failure() {
        let run = SyncRun::begin(AccountId::new(), 1, Utc::now());
        assert!(run.is_open());
        assert_eq!(run.outcome(), SyncOutcome::Failure);
        assert!(run.error_code().is_none());
        assert!(run.next_retry_at().is_none());
        assert_eq!(run.attempts(), 1);
    }

    #[test]
    fn test_complete_success_clears_error_fields() {
        let mut run = SyncRun::begin(AccountId::new(), 3, Utc::now());
        let finished = Utc::now();
        run.complete_success(finished);
        assert!(!run.is_open());
        assert_eq!(run.outcome(), SyncOutcome::Success);
        assert_eq!(run.finished_at(), Some(finished));
        assert!(run.error_code().is_none());
        assert!(run.error_message().is_none());
        assert!(run.next_retry_at().is_none());
    }

    #[test]
    fn test_complete_failure_records_taxonomy() {
        let mut run = SyncRun::begin(AccountId::new(), 2, Utc::now());
        let finished = Utc::now();
        let retry_at = finished + chrono::Duration::seconds(4);
        run.complete_failure(&ProviderError::network("connection reset"), retry_at, finished);
        assert!(!run.is_open());
        assert_eq!(run.outcome(), SyncOutcome::Failure);
        assert_eq!(run.error_code(), Some("network"));
        assert_eq!(run.error_message(), Some("connection reset"));
        assert_eq!(run.next_retry_at(), Some(retry_at));
    }

    #[test]
    fn test_outcome_roundtrip() {
        for outcome in [SyncOutcome::Success, SyncOutcome::Failure] {
            let parsed: SyncOutcome = outcome.as_str().parse().unwrap();
            assert_eq!(outcome, parsed);
        }
    }
}
