//! Top-level error wrapper types.

use crate::{
    BuilderError, ConfigError, InputError, JsonError, ParseError, RateLimitError, RetryableError,
    StorageError, TimeoutError, UpstreamError, ValidationError,
};

/// Every error condition the Postforge workspace can produce.
///
/// # Examples
///
/// ```
/// use postforge_error::{PostforgeError, TimeoutError};
///
/// let err: PostforgeError = TimeoutError::new("initial completion", 25_000).into();
/// assert!(format!("{}", err).contains("Timeout Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum PostforgeErrorKind {
    /// Missing or invalid request fields
    #[from(InputError)]
    Input(InputError),
    /// Non-success response from the completion provider
    #[from(UpstreamError)]
    Upstream(UpstreamError),
    /// Response text could not be interpreted as structured data
    #[from(ParseError)]
    Parse(ParseError),
    /// Deadline exceeded
    #[from(TimeoutError)]
    Timeout(TimeoutError),
    /// Output contract non-compliance
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Caller exceeded quota
    #[from(RateLimitError)]
    RateLimit(RateLimitError),
    /// Persistence collaborator failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
}

/// Postforge error with kind discrimination.
///
/// # Examples
///
/// ```
/// use postforge_error::{ConfigError, ConfigErrorKind, PostforgeErrorKind, PostforgeResult};
///
/// fn might_fail() -> PostforgeResult<()> {
///     Err(ConfigError::new(ConfigErrorKind::MissingEnv("OPENROUTER_API_KEY".into())))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), PostforgeErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Postforge Error: {}", _0)]
pub struct PostforgeError(Box<PostforgeErrorKind>);

impl PostforgeError {
    /// Create a new error from a kind.
    pub fn new(kind: PostforgeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PostforgeErrorKind {
        &self.0
    }

    /// True when the error is a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind(), PostforgeErrorKind::Timeout(_))
    }

    /// True when the caller supplied a bad request.
    pub fn is_input(&self) -> bool {
        matches!(self.kind(), PostforgeErrorKind::Input(_))
    }
}

// Generic From implementation for any type that converts to PostforgeErrorKind
impl<T> From<T> for PostforgeError
where
    T: Into<PostforgeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

impl RetryableError for PostforgeError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            PostforgeErrorKind::Upstream(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Result type for Postforge operations.
///
/// # Examples
///
/// ```
/// use postforge_error::{PostforgeResult, RateLimitError};
///
/// fn admit(caller: &str) -> PostforgeResult<()> {
///     Err(RateLimitError::new(caller, 30))?
/// }
/// assert!(admit("203.0.113.7").is_err());
/// ```
pub type PostforgeResult<T> = std::result::Result<T, PostforgeError>;
