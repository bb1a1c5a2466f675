//! Per-request time budget shared by every upstream call.

use std::time::Duration;
use tokio::time::Instant;

/// Wall-clock budget started when a request enters the pipeline.
///
/// Copies share the same start instant, so the initial completion, repair
/// and continuation calls all draw from one budget.
///
/// # Examples
///
/// ```
/// use postforge_pipeline::Deadline;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let deadline = Deadline::from_millis(25_000);
/// assert!(!deadline.expired());
/// assert!(deadline.can_fit(Duration::from_secs(2)));
/// assert!(!deadline.can_fit(Duration::from_secs(30)));
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a budget now.
    pub fn new(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    /// Start a budget of `ms` milliseconds now.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Total budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Total budget in milliseconds.
    pub fn budget_ms(&self) -> u64 {
        u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX)
    }

    /// Time since the budget started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    /// True once nothing is left.
    pub fn expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// True when `step` still fits in what is left.
    pub fn can_fit(&self, step: Duration) -> bool {
        self.remaining() >= step
    }
}
