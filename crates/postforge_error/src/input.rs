//! Request validation error types.

/// Ways an inbound request can be rejected before any upstream call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum InputErrorKind {
    /// Required field absent or empty
    #[display("Missing required field: {}", _0)]
    MissingField(String),
    /// Field present but unusable
    #[display("Invalid value for '{}': {}", field, reason)]
    InvalidField {
        /// Field name as it appears in the inbound request
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Input error with source location.
///
/// # Examples
///
/// ```
/// use postforge_error::{InputError, InputErrorKind};
///
/// let err = InputError::new(InputErrorKind::InvalidField {
///     field: "mode".to_string(),
///     reason: "expected 'short' or 'article'".to_string(),
/// });
/// assert!(format!("{}", err).contains("mode"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Input Error: {} at line {} in {}", kind, line, file)]
pub struct InputError {
    /// The specific error condition
    pub kind: InputErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl InputError {
    /// Create a new InputError at the current location.
    #[track_caller]
    pub fn new(kind: InputErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
