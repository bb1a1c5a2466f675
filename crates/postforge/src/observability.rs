//! Log subscriber setup for the binary.

use postforge_error::{ConfigError, ConfigErrorKind, PostforgeResult};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// How logs are filtered and formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset (e.g., "info", "postforge_pipeline=debug")
    pub log_level: String,
    /// Ignore `RUST_LOG` and use `log_level`
    pub force_level: bool,
    /// Emit one JSON object per event
    pub json_logs: bool,
}

impl LoggingConfig {
    /// Info level, or debug for everything when `verbose`.
    pub fn new(verbose: bool) -> Self {
        Self {
            log_level: if verbose { "debug" } else { "info" }.to_string(),
            force_level: verbose,
            json_logs: false,
        }
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    fn filter(&self) -> PostforgeResult<EnvFilter> {
        if !self.force_level {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return Ok(filter);
            }
        }
        EnvFilter::try_new(&self.log_level).map_err(|e| {
            ConfigError::invalid("log_level", format!("'{}' does not parse: {}", self.log_level, e)).into()
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for command output.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the filter does not parse or a subscriber
/// is already installed.
pub fn init_logging(config: &LoggingConfig) -> PostforgeResult<()> {
    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(config.filter()?)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(ConfigErrorKind::Logging(e.to_string())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_forces_debug() {
        let config = LoggingConfig::new(true);
        assert_eq!(config.log_level, "debug");
        assert!(config.force_level);
        assert!(config.filter().is_ok());
    }

    #[test]
    fn bad_filter_is_a_config_error() {
        let config = LoggingConfig {
            log_level: "=[".to_string(),
            force_level: true,
            json_logs: false,
        };
        assert!(config.filter().is_err());
    }
}
