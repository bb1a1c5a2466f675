//! Caller quota error.

/// Raised when a caller identity has exhausted its request bucket.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display(
    "Rate Limit Error: caller {} must wait {}ms at line {} in {}",
    caller,
    retry_after_ms,
    line,
    file
)]
pub struct RateLimitError {
    /// Caller identity (usually the client IP)
    pub caller: String,
    /// Time until the bucket admits another request
    pub retry_after_ms: u64,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl RateLimitError {
    /// Create a new RateLimitError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use postforge_error::RateLimitError;
    ///
    /// let err = RateLimitError::new("203.0.113.7", 1_500);
    /// assert!(format!("{}", err).contains("203.0.113.7"));
    /// ```
    #[track_caller]
    pub fn new(caller: impl Into<String>, retry_after_ms: u64) -> Self {
        let location = std::panic::Location::caller();
        Self {
            caller: caller.into(),
            retry_after_ms,
            line: location.line(),
            file: location.file(),
        }
    }
}
