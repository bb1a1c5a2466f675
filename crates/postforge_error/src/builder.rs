//! Errors raised while assembling a completion request.

/// Why a completion request could not be assembled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BuilderErrorKind {
    /// A required builder field was never set
    #[display("Completion request is missing '{}'", _0)]
    MissingField(&'static str),

    /// A field was set to a value the upstream would reject
    #[display("Completion request field '{}' is invalid: {}", field, reason)]
    InvalidField {
        /// Builder field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Completion request assembly error with location tracking.
///
/// # Examples
///
/// ```
/// use postforge_error::{BuilderError, BuilderErrorKind};
///
/// let err = BuilderError::new(BuilderErrorKind::MissingField("model"));
/// assert_eq!(err.kind(), &BuilderErrorKind::MissingField("model"));
/// assert!(err.to_string().contains("'model'"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Builder Error: {} at line {} in {}", kind, line, file)]
pub struct BuilderError {
    kind: BuilderErrorKind,
    line: u32,
    file: &'static str,
}

impl BuilderError {
    /// Create a new builder error with caller location tracking.
    #[track_caller]
    pub fn new(kind: BuilderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for [`BuilderErrorKind::InvalidField`].
    #[track_caller]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::new(BuilderErrorKind::InvalidField {
            field,
            reason: reason.into(),
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BuilderErrorKind {
        &self.kind
    }
}
