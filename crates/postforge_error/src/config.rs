//! Configuration and process setup errors.

/// What went wrong while loading or applying configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// An explicitly named config file is absent
    #[display("Configuration file {} does not exist", _0)]
    MissingFile(String),

    /// A config source failed to load or deserialize
    #[display("Failed to load configuration: {}", _0)]
    Load(String),

    /// A setting is out of range or inconsistent with another
    #[display("Invalid setting '{}': {}", key, reason)]
    InvalidValue {
        /// Dotted setting path, e.g. `retry.max_attempts`
        key: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A required environment variable is unset or empty
    #[display("Environment variable {} is not set", _0)]
    MissingEnv(String),

    /// The log subscriber could not be installed
    #[display("Logging setup failed: {}", _0)]
    Logging(String),
}

/// Configuration error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    line: u32,
    file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use postforge_error::{ConfigError, ConfigErrorKind};
    ///
    /// let err = ConfigError::invalid("retry.max_attempts", "must be at least 1");
    /// assert!(matches!(err.kind(), ConfigErrorKind::InvalidValue { key, .. } if key == "retry.max_attempts"));
    ///
    /// let err = ConfigError::new(ConfigErrorKind::MissingEnv("OPENROUTER_API_KEY".to_string()));
    /// assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    /// ```
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for [`ConfigErrorKind::InvalidValue`].
    #[track_caller]
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}
