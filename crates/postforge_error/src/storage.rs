//! Persistence error types.

/// Kinds of blob store failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create the storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write a blob
    #[display("Failed to write blob: {}", _0)]
    Write(String),
    /// Failed to read a blob
    #[display("Failed to read blob: {}", _0)]
    Read(String),
    /// Stored blob could not be decoded
    #[display("Corrupt blob for key {}: {}", key, reason)]
    Corrupt {
        /// Blob key
        key: String,
        /// Decoder message
        reason: String,
    },
    /// Storage backend is unavailable
    #[display("Storage unavailable: {}", _0)]
    Unavailable(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use postforge_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::Unavailable("kv endpoint unset".to_string()));
/// assert!(format!("{}", err).contains("unavailable"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
