//! Structured-output parse error.

/// Upstream text that no extraction strategy could turn into a JSON object.
///
/// The pipeline never surfaces this error; it falls back to treating the
/// whole response as an unstructured body.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Parse Error: {} ({} chars) at line {} in {}", message, length, line, file)]
pub struct ParseError {
    /// What the last strategy reported
    pub message: String,
    /// Length of the rejected text in characters
    pub length: usize,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ParseError {
    /// Create a new ParseError at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>, length: usize) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            length,
            line: location.line(),
            file: location.file(),
        }
    }
}
