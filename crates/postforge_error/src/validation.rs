//! Output contract error types.

/// Individual contract checks a candidate can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Token symbol absent from title, body and ticker field
    #[display("token symbol is not mentioned")]
    TokenNotMentioned,
    /// No timestamp, hash fragment or block height in the text
    #[display("no verifiable detail (timestamp, hash fragment or block height)")]
    MissingVerifiableDetail,
    /// Technical-analysis or price-prediction language present
    #[display("contains technical-analysis or price-prediction language")]
    TechnicalAnalysis,
}

/// Contract non-compliance of a candidate post.
///
/// # Examples
///
/// ```
/// use postforge_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(vec![
///     ValidationErrorKind::MissingVerifiableDetail,
///     ValidationErrorKind::TechnicalAnalysis,
/// ]);
/// assert_eq!(err.failures.len(), 2);
/// assert!(format!("{}", err).contains("verifiable detail"));
/// ```
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Every check that failed
    pub failures: Vec<ValidationErrorKind>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError at the current location.
    #[track_caller]
    pub fn new(failures: Vec<ValidationErrorKind>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            failures,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Failed checks joined into one human-readable line.
    pub fn describe(&self) -> String {
        self.failures
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Validation Error: {} at line {} in {}",
            self.describe(),
            self.line,
            self.file
        )
    }
}

impl std::error::Error for ValidationError {}
