//! Exponential backoff tracking per account
//!
//! Failure counts live in process memory only; a daemon restart makes
//! every account immediately retry-eligible again. The delay curve is a
//! pure function so the schedule is testable without a clock.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use agentbattery_core::domain::AccountId;

/// Ceiling for the backoff delay (10 minutes)
const MAX_DELAY_MS: u64 = 600_000;

/// Computes the retry delay after the given number of consecutive failures
///
/// `min(2^failures * 1000 ms, 600 000 ms)`, no jitter.
pub fn backoff_delay(failures: u32) -> Duration {
    // 2^10 s already exceeds the cap; clamp the exponent before shifting.
    let exponent = failures.min(20);
    let ms = (1u64 << exponent).saturating_mul(1_000).min(MAX_DELAY_MS);
    Duration::from_millis(ms)
}

/// Per-account backoff state
#[derive(Debug, Clone, Copy, Default)]
struct BackoffState {
    failures: u32,
    next_retry_at: Option<DateTime<Utc>>,
}

/// Tracks consecutive sync failures and retry eligibility per account
///
/// Each entry's read-modify-write is serialized through the map's entry
/// locking, so concurrent syncs of different accounts never contend and
/// concurrent updates of the same account never interleave.
#[derive(Debug, Default)]
pub struct BackoffTracker {
    states: DashMap<AccountId, BackoffState>,
}

impl BackoffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current consecutive failure count for an account
    pub fn failures(&self, account_id: &AccountId) -> u32 {
        self.states
            .get(account_id)
            .map(|state| state.failures)
            .unwrap_or(0)
    }

    /// Whether the account is inside its backoff window at `now`
    pub fn is_gated(&self, account_id: &AccountId, now: DateTime<Utc>) -> bool {
        self.states
            .get(account_id)
            .and_then(|state| state.next_retry_at)
            .is_some_and(|retry_at| now < retry_at)
    }

    /// Records a failure, returning the new count and the retry instant
    pub fn record_failure(
        &self,
        account_id: &AccountId,
        now: DateTime<Utc>,
    ) -> (u32, DateTime<Utc>) {
        let mut entry = self.states.entry(*account_id).or_default();
        entry.failures += 1;
        let delay = backoff_delay(entry.failures);
        let next_retry_at = now + chrono::Duration::milliseconds(delay.as_millis() as i64);
        entry.next_retry_at = Some(next_retry_at);
        (entry.failures, next_retry_at)
    }

    /// Clears all backoff state for an account after a successful sync
    pub fn reset(&self, account_id: &AccountId) {
        self.states.remove(account_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_until_cap() {
        assert_eq!(backoff_delay(1), Duration::from_millis(2_000));
        assert_eq!(backoff_delay(2), Duration::from_millis(4_000));
        assert_eq!(backoff_delay(3), Duration::from_millis(8_000));
        assert_eq!(backoff_delay(9), Duration::from_millis(512_000));
        assert_eq!(backoff_delay(10), Duration::from_millis(600_000));
        assert_eq!(backoff_delay(15), Duration::from_millis(600_000));
        assert_eq!(backoff_delay(u32::MAX), Duration::from_millis(600_000));
    }

    #[test]
    fn test_delay_is_monotone() {
        let mut previous = Duration::ZERO;
        for failures in 0..32 {
            let delay = backoff_delay(failures);
            assert!(delay >= previous);
            previous = delay;
        }
    }

    #[test]
    fn test_tracker_gates_until_retry_instant() {
        let tracker = BackoffTracker::new();
        let id = AccountId::new();
        let now = Utc::now();

        assert!(!tracker.is_gated(&id, now));
        assert_eq!(tracker.failures(&id), 0);

        let (failures, retry_at) = tracker.record_failure(&id, now);
        assert_eq!(failures, 1);
        assert_eq!(retry_at, now + chrono::Duration::seconds(2));

        assert!(tracker.is_gated(&id, now));
        assert!(tracker.is_gated(&id, retry_at - chrono::Duration::milliseconds(1)));
        assert!(!tracker.is_gated(&id, retry_at));
    }

    #[test]
    fn test_failures_accumulate_and_reset() {
        let tracker = BackoffTracker::new();
        let id = AccountId::new();
        let now = Utc::now();

        tracker.record_failure(&id, now);
        let (failures, retry_at) = tracker.record_failure(&id, now);
        assert_eq!(failures, 2);
        assert_eq!(retry_at, now + chrono::Duration::seconds(4));

        tracker.reset(&id);
        assert_eq!(tracker.failures(&id), 0);
        assert!(!tracker.is_gated(&id, now));
    }

    #[test]
    fn test_accounts_are_independent() {
        let tracker = BackoffTracker::new();
        let failing = AccountId::new();
        let healthy = AccountId::new();
        let now = Utc::now();

        tracker.record_failure(&failing, now);
        assert!(tracker.is_gated(&failing, now));
        assert!(!tracker.is_gated(&healthy, now));
    }
}
