//! Completion provider error types and retry classification.

/// Provider-side error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum UpstreamErrorKind {
    /// The request never produced an HTTP response (DNS, connect, reset)
    #[display("Network error: {}", _0)]
    Network(String),
    /// The provider answered with a non-success status
    #[display("HTTP {} error: {}", status_code, payload)]
    Status {
        /// HTTP status code
        status_code: u16,
        /// Remote error payload, serialized as JSON text
        payload: String,
    },
    /// The provider answered 2xx but the body could not be read
    #[display("Unreadable response: {}", _0)]
    Response(String),
}

impl UpstreamErrorKind {
    /// Check if this error type should be retried.
    ///
    /// Network failures, unreadable bodies and 408/429/5xx statuses are
    /// transient. Every other status is permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamErrorKind::Network(_) => true,
            UpstreamErrorKind::Response(_) => true,
            UpstreamErrorKind::Status { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
        }
    }
}

/// Upstream error with source location tracking.
///
/// # Examples
///
/// ```
/// use postforge_error::{UpstreamError, UpstreamErrorKind};
///
/// let err = UpstreamError::new(UpstreamErrorKind::Status {
///     status_code: 401,
///     payload: r#"{"message":"No auth credentials found"}"#.to_string(),
/// });
/// assert_eq!(err.status_code(), Some(401));
/// assert!(format!("{}", err).contains("No auth credentials"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Upstream Error: {} at line {} in {}", kind, line, file)]
pub struct UpstreamError {
    /// The kind of error that occurred
    pub kind: UpstreamErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl UpstreamError {
    /// Create a new UpstreamError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: UpstreamErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// HTTP status of the remote failure, if there was one.
    pub fn status_code(&self) -> Option<u16> {
        match &self.kind {
            UpstreamErrorKind::Status { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Remote error payload, if the provider sent one.
    pub fn payload(&self) -> Option<&str> {
        match &self.kind {
            UpstreamErrorKind::Status { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use postforge_error::{RetryableError, UpstreamError, UpstreamErrorKind};
///
/// let err = UpstreamError::new(UpstreamErrorKind::Status {
///     status_code: 503,
///     payload: "overloaded".to_string(),
/// });
/// assert!(err.is_retryable());
///
/// let err = UpstreamError::new(UpstreamErrorKind::Status {
///     status_code: 400,
///     payload: "bad model".to_string(),
/// });
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503 (service unavailable), 429 (rate limit),
    /// or connection resets should return true. Permanent errors like 401
    /// (unauthorized) or 400 (bad request) should return false.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for UpstreamError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
