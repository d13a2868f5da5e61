//! Backoff policy for retrying billing API requests.

use reqwest::StatusCode;
use std::time::Duration;

/// When and how long to wait before retrying a request.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl BackoffPolicy {
    /// Creates a policy with `max_attempts` and a one second base delay.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }

    /// A single attempt, never retried.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Delay before retry number `attempt` (1 = first retry), doubling each time.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Delay honoring a server `Retry-After`, capped at `max_delay`.
    pub fn delay_with_hint(&self, attempt: u32, retry_after_secs: Option<u64>) -> Duration {
        retry_after_secs
            .map_or_else(|| self.delay_for(attempt), Duration::from_secs)
            .min(self.max_delay)
    }

    /// Returns true if another attempt is allowed after `attempts_made`.
    pub fn can_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    /// Returns true for statuses worth retrying (429 and 5xx).
    pub fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Returns true for transport errors worth retrying.
    pub fn is_retryable_error(error: &reqwest::Error) -> bool {
        error.is_connect() || error.is_timeout()
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_delays() {
        let policy = BackoffPolicy::default();

        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = BackoffPolicy::new(10).with_base_delay(Duration::from_secs(10));
        assert_eq!(policy.delay_for(5), Duration::from_secs(30));
        assert_eq!(policy.delay_with_hint(1, Some(120)), Duration::from_secs(30));
        assert_eq!(policy.delay_with_hint(1, Some(3)), Duration::from_secs(3));
    }

    #[test]
    fn test_attempt_budget() {
        let policy = BackoffPolicy::new(3);
        assert!(policy.can_retry(1));
        assert!(policy.can_retry(2));
        assert!(!policy.can_retry(3));

        assert!(!BackoffPolicy::none().can_retry(1));
        assert_eq!(BackoffPolicy::new(0).max_attempts, 1);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(BackoffPolicy::is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(BackoffPolicy::is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!BackoffPolicy::is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!BackoffPolicy::is_retryable_status(StatusCode::NOT_FOUND));
    }
}
