//! Retry policy for failed installs.

use std::time::Duration;

/// Default initial backoff before the first retry (1 second).
pub const DEFAULT_INITIAL_BACKOFF_SECS: u64 = 1;

/// Default cap on a single backoff (30 seconds).
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 30;

/// Default maximum number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Exponential backoff settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for any single backoff.
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_secs(DEFAULT_INITIAL_BACKOFF_SECS),
            max_backoff: Duration::from_secs(DEFAULT_MAX_BACKOFF_SECS),
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt + 1`: initial * 2^attempt, capped.
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff, Duration::from_secs(1));
        assert_eq!(config.max_backoff, Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_doubles() {
        let config = RetryConfig::default();
        assert_eq!(config.calculate_backoff(0), Duration::from_secs(1));
        assert_eq!(config.calculate_backoff(1), Duration::from_secs(2));
        assert_eq!(config.calculate_backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = RetryConfig::default();
        assert_eq!(config.calculate_backoff(5), Duration::from_secs(30));
        assert_eq!(config.calculate_backoff(40), Duration::from_secs(30));
    }

    #[test]
    fn test_none_never_retries() {
        assert_eq!(RetryConfig::none().max_retries, 0);
    }
}
