//! Retry policy for rate-limited requests.
//!
//! Computes the delay inserted before each retry attempt.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Growth of the backoff delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// `base * attempt`
    #[default]
    Linear,
    /// `base * 2^(attempt - 1)`
    Exponential,
}

/// Bounded retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay unit the schedule is scaled from
    pub base_delay: Duration,
    /// How the delay grows with the attempt number
    pub strategy: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            strategy: BackoffStrategy::Linear,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt.
    ///
    /// # Arguments
    /// * `attempt` - 1-based number of the attempt that just failed
    ///
    /// # Returns
    /// * `Duration` - Delay before the next attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match self.strategy {
            BackoffStrategy::Linear => self.base_delay.saturating_mul(attempt),
            BackoffStrategy::Exponential => {
                let factor = 2u32.saturating_pow(attempt - 1);
                self.base_delay.saturating_mul(factor)
            }
        }
    }

    /// Whether another attempt is allowed after `attempt` failed.
    pub fn has_attempts_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_delay_grows_with_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(3000));
    }

    #[test]
    fn test_exponential_delay_doubles() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(100),
            strategy: BackoffStrategy::Exponential,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(4), Duration::from_millis(800));
    }

    #[test]
    fn test_attempt_zero_treated_as_first() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), policy.delay_for(1));
    }

    #[test]
    fn test_has_attempts_after() {
        let policy = RetryPolicy::default();
        assert!(policy.has_attempts_after(1));
        assert!(policy.has_attempts_after(2));
        assert!(!policy.has_attempts_after(3));
    }

    #[test]
    fn test_strategy_deserializes_lowercase() {
        let strategy: BackoffStrategy = serde_json::from_str("\"exponential\"").unwrap();
        assert_eq!(strategy, BackoffStrategy::Exponential);
    }
}
