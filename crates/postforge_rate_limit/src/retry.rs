//! Backoff schedule for transient upstream failures.

use crate::RetryConfig;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};

/// Retry schedule derived from `[retry]`.
///
/// The schedule yields the delay before each retry, so a policy with
/// `max_attempts = 3` yields two delays.
///
/// # Examples
///
/// ```
/// use postforge_rate_limit::{RetryConfig, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::from(RetryConfig::default());
/// let delays: Vec<_> = policy.delays().collect();
/// assert_eq!(
///     delays,
///     vec![Duration::from_millis(250), Duration::from_millis(500)]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff_ms: u64,
    max_delay_ms: u64,
    jitter: bool,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_delay_ms: 0,
            jitter: false,
        }
    }

    /// Total attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delays before each retry.
    ///
    /// Doubles from `initial_backoff_ms`, capped at `max_delay_ms`.
    pub fn delays(&self) -> Box<dyn Iterator<Item = Duration> + Send> {
        let retries = self.max_attempts.saturating_sub(1) as usize;
        // ExponentialBackoff yields factor * base^n, so base 2 doubles from
        // factor * 2.
        let base = ExponentialBackoff::from_millis(2)
            .factor((self.initial_backoff_ms / 2).max(1))
            .max_delay(Duration::from_millis(self.max_delay_ms.max(1)));
        if self.jitter {
            Box::new(base.map(jitter).take(retries))
        } else {
            Box::new(base.take(retries))
        }
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff_ms: config.initial_backoff_ms,
            max_delay_ms: config.max_delay_ms,
            jitter: config.jitter,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_yields_no_delays() {
        assert_eq!(RetryPolicy::none().delays().count(), 0);
    }

    #[test]
    fn delays_are_capped() {
        let policy = RetryPolicy::from(RetryConfig {
            max_attempts: 8,
            initial_backoff_ms: 250,
            max_delay_ms: 1000,
            jitter: false,
        });
        let delays: Vec<_> = policy.delays().collect();
        assert_eq!(delays.len(), 7);
        assert!(delays.iter().all(|d| *d <= Duration::from_millis(1000)));
        assert_eq!(delays[1], Duration::from_millis(500));
    }

    #[test]
    fn jitter_never_exceeds_base() {
        let policy = RetryPolicy::from(RetryConfig {
            jitter: true,
            ..RetryConfig::default()
        });
        for delay in policy.delays() {
            assert!(delay <= Duration::from_millis(500));
        }
    }
}
