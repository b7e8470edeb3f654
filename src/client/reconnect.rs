//! Linear-backoff reconnect budget.

use std::time::Duration;

use crate::config::ClientConfig;

/// How many automatic attempts are allowed and how long to wait before each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Attempts allowed before giving up; 0 disables reconnecting.
    pub max_attempts: u32,
    /// Attempt `n` waits `n * base_delay`.
    pub base_delay: Duration,
}

impl ReconnectPolicy {
    /// Policy from the client configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        ReconnectPolicy {
            max_attempts: config.max_reconnect_attempts,
            base_delay: config.reconnect_base_delay,
        }
    }

    /// Whether automatic reconnects are enabled at all.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.max_attempts > 0
    }

    /// Whether `attempts` already made use up the budget.
    #[must_use]
    pub fn exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }

    /// Wait before the 1-based `attempt`.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_delay() {
        let policy = ReconnectPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(5),
        };
        assert_eq!(policy.delay(1), Duration::from_secs(5));
        assert_eq!(policy.delay(3), Duration::from_secs(15));
        assert!(!policy.exhausted(4));
        assert!(policy.exhausted(5));
    }

    #[test]
    fn test_zero_disables() {
        let policy = ReconnectPolicy::from_config(&ClientConfig::default().with_max_reconnect_attempts(0));
        assert!(!policy.enabled());
        assert!(policy.exhausted(0));
    }
}
