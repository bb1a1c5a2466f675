//! Deadline expiry error types.

/// Raised when the per-request deadline elapses before a required step completes.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display(
    "Timeout Error: {} exceeded the {}ms budget at line {} in {}",
    stage,
    budget_ms,
    line,
    file
)]
pub struct TimeoutError {
    /// Pipeline stage that ran out of time
    pub stage: String,
    /// Total budget the request was given
    pub budget_ms: u64,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl TimeoutError {
    /// Create a new TimeoutError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use postforge_error::TimeoutError;
    ///
    /// let err = TimeoutError::new("initial completion", 25_000);
    /// assert_eq!(err.budget_ms, 25_000);
    /// ```
    #[track_caller]
    pub fn new(stage: impl Into<String>, budget_ms: u64) -> Self {
        let location = std::panic::Location::caller();
        Self {
            stage: stage.into(),
            budget_ms,
            line: location.line(),
            file: location.file(),
        }
    }
}
