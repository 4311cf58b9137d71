//! Retry policy for API requests.
//!
//! # Responsibilities
//! - Decide whether another attempt is allowed
//! - Provide the pause before the next attempt
//!
//! # Design Decisions
//! - Unbounded by default: a batch run prefers eventual completion over
//!   responsiveness; `max_attempts` turns it into a bounded policy
//! - Delay curve comes from `backoff::calculate_backoff`

use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Retry policy derived from `RetryConfig`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: Option<u32>,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }

    /// Policy that never gives up.
    pub fn unbounded(delay: Duration) -> Self {
        let ms = delay.as_millis() as u64;
        Self {
            max_attempts: None,
            base_delay_ms: ms,
            max_delay_ms: ms,
        }
    }

    /// Whether attempt number `attempt` (1-based) may still be made.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }

    /// Pause after failed attempt number `attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        let policy = RetryPolicy::default();
        assert!(policy.allows(1));
        assert!(policy.allows(1_000_000));
        assert_eq!(policy.delay_after(7), Duration::from_secs(1));
    }

    #[test]
    fn test_bounded_policy() {
        let policy = RetryPolicy::new(&RetryConfig {
            max_attempts: Some(3),
            base_delay_ms: 10,
            max_delay_ms: 100,
        });
        assert!(policy.allows(3));
        assert!(!policy.allows(4));
        assert!(policy.delay_after(3) >= Duration::from_millis(40));
        assert_eq!(policy.delay_after(10), Duration::from_millis(100));
    }
}
