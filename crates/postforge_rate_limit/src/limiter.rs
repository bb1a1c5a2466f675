//! Per-caller admission control using governor's keyed GCRA limiter.

use crate::RateLimitConfig;
use governor::clock::Clock;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use postforge_error::RateLimitError;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

// Idle keys are swept once the map grows past this many entries.
const SWEEP_THRESHOLD: usize = 10_000;

/// Token bucket per caller key.
///
/// Each caller starts with `burst` tokens and regains one every
/// `refill_secs`. Independent of pipeline state.
///
/// # Example
///
/// ```
/// use postforge_rate_limit::{CallerRateLimiter, RateLimitConfig};
///
/// let limiter = CallerRateLimiter::new(RateLimitConfig {
///     enabled: true,
///     burst: 2,
///     refill_secs: 60,
/// });
///
/// assert!(limiter.admit("203.0.113.7").is_ok());
/// assert!(limiter.admit("203.0.113.7").is_ok());
/// assert!(limiter.admit("203.0.113.7").is_err());
/// assert!(limiter.admit("198.51.100.2").is_ok());
/// ```
#[derive(Clone)]
pub struct CallerRateLimiter {
    limiter: Option<Arc<DefaultKeyedRateLimiter<String>>>,
}

impl CallerRateLimiter {
    /// Create a limiter. Disabled or degenerate configs admit everything.
    pub fn new(config: RateLimitConfig) -> Self {
        let limiter = if config.enabled {
            NonZeroU32::new(config.burst).and_then(|burst| {
                Quota::with_period(Duration::from_secs(config.refill_secs))
                    .map(|quota| Arc::new(RateLimiter::keyed(quota.allow_burst(burst))))
            })
        } else {
            None
        };
        Self { limiter }
    }

    /// A limiter that admits every request.
    pub fn disabled() -> Self {
        Self { limiter: None }
    }

    /// True when requests are actually gated.
    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Take one token for `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError`] with the wait until the next token when the
    /// caller's bucket is empty.
    #[track_caller]
    pub fn admit(&self, caller: &str) -> Result<(), RateLimitError> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        if limiter.len() > SWEEP_THRESHOLD {
            limiter.retain_recent();
            debug!(remaining = limiter.len(), "Swept idle rate limit keys");
        }

        match limiter.check_key(&caller.to_string()) {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let wait = not_until.wait_time_from(limiter.clock().now());
                warn!(caller, retry_after_ms = wait.as_millis() as u64, "Caller rate limited");
                Err(RateLimitError::new(caller, wait.as_millis() as u64))
            }
        }
    }
}

impl std::fmt::Debug for CallerRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallerRateLimiter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
