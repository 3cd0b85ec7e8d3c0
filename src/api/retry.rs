//! Retry policy for transient failures
//!
//! Off by default (`max_attempts = 1`): transient errors are reported, not retried.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry
    pub backoff_ms: u64,
    /// HTTP statuses worth retrying
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 500,
            retryable_statuses: vec![408, 429, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_attempts(max_attempts: u32, backoff_ms: u64) -> Self {
        Self {
            max_attempts,
            backoff_ms,
            ..Self::default()
        }
    }

    /// Whether `attempt` (1-based) may be followed by another one
    pub fn should_retry(&self, err: &ApiError, attempt: u32) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        match err {
            ApiError::NetworkDown(_) => true,
            other => other
                .status()
                .map(|s| self.retryable_statuses.contains(&s))
                .unwrap_or(false),
        }
    }

    /// Wait before attempt `attempt + 1`
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient(status: u16) -> ApiError {
        ApiError::NotFoundOrTransient { status, body: None }
    }

    #[test]
    fn test_default_never_retries() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(&transient(503), 1));
        assert!(!policy.should_retry(&ApiError::NetworkDown("down".into()), 1));
    }

    #[test]
    fn test_retry_until_max_attempts() {
        let policy = RetryPolicy::with_attempts(3, 10);
        assert!(policy.should_retry(&transient(503), 1));
        assert!(policy.should_retry(&transient(503), 2));
        assert!(!policy.should_retry(&transient(503), 3));
    }

    #[test]
    fn test_non_retryable_statuses() {
        let policy = RetryPolicy::with_attempts(3, 10);
        assert!(!policy.should_retry(&transient(404), 1));
        assert!(!policy.should_retry(&ApiError::Api { status: 500, body: None }, 1));
        assert!(!policy.should_retry(&ApiError::Cancelled, 1));
    }

    #[test]
    fn test_exponential_backoff() {
        let policy = RetryPolicy::with_attempts(4, 100);
        assert_eq!(policy.delay(1), Duration::from_millis(100));
        assert_eq!(policy.delay(2), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(400));
    }
}
