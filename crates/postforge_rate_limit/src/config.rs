//! Layered TOML configuration.
//!
//! Sources, later ones overriding earlier ones:
//! - Bundled defaults (include_str! from postforge.toml)
//! - `~/.config/postforge/postforge.toml`
//! - `./postforge.toml`
//!
//! Every section and field has a default, so user files only need to name
//! what they change.

use postforge_error::{ConfigError, ConfigErrorKind, PostforgeError, PostforgeResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../postforge.toml");

/// Completion provider settings.
///
/// # Example
///
/// ```toml
/// [upstream]
/// endpoint = "https://openrouter.ai/api/v1/chat/completions"
/// default_model = "meta-llama/llama-3.1-8b-instruct"
/// api_key_env = "OPENROUTER_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Chat completions URL
    pub endpoint: String,
    /// Model used when a request names none
    pub default_model: String,
    /// `HTTP-Referer` attribution header
    pub referer: String,
    /// `X-Title` attribution header
    pub title: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            default_model: "meta-llama/llama-3.1-8b-instruct".to_string(),
            referer: "https://your-app.example".to_string(),
            title: "Postforge".to_string(),
            api_key_env: "OPENROUTER_KEY".to_string(),
        }
    }
}

/// Retry schedule for transient upstream failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles afterwards
    pub initial_backoff_ms: u64,
    /// Ceiling for a single delay
    pub max_delay_ms: u64,
    /// Randomize delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 250,
            max_delay_ms: 4000,
            jitter: false,
        }
    }
}

/// How topics and formats are picked from their pools.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RotationPolicy {
    /// Smallest usage count, ties to the earlier pool entry
    #[default]
    LeastUsed,
    /// Persistent cursor modulo pool length
    RoundRobin,
}

/// Which candidate the repair loop keeps when it ends without full compliance.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RepairAcceptance {
    /// Latest repaired candidate long enough to accept
    #[default]
    Latest,
    /// Candidate passing the most checks, earliest on ties
    MostCompliant,
}

/// Generation pipeline tuning.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Whole-request budget
    pub deadline_ms: u64,
    /// Kept in reserve when sizing a call timeout
    pub safety_margin_ms: u64,
    /// Smallest window worth starting a sub-call in
    pub min_step_ms: u64,
    /// Repair re-prompts per request
    pub max_repairs: u32,
    /// Temperature ceiling for repair calls
    pub repair_temperature: f32,
    /// Shortest repaired body that may replace the running candidate
    pub repair_min_body_chars: usize,
    /// Remembered title fingerprints per token
    pub title_history: usize,
    /// Topic/format selection policy
    pub rotation_policy: RotationPolicy,
    /// Terminal candidate policy
    pub repair_acceptance: RepairAcceptance,
    /// Ask the model to extend a short body before padding
    pub continuation: bool,
    /// Persist learning state on a spawned task
    pub persist_in_background: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deadline_ms: 25_000,
            safety_margin_ms: 1_500,
            min_step_ms: 2_000,
            max_repairs: 2,
            repair_temperature: 0.3,
            repair_min_body_chars: 40,
            title_history: 48,
            rotation_policy: RotationPolicy::LeastUsed,
            repair_acceptance: RepairAcceptance::Latest,
            continuation: true,
            persist_in_background: true,
        }
    }
}

/// Per-caller token bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Gate requests at all
    pub enabled: bool,
    /// Bucket capacity
    pub burst: u32,
    /// Seconds to refill one token
    pub refill_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            burst: 10,
            refill_secs: 6,
        }
    }
}

/// Blob store backend.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StorageBackend {
    /// Process memory only
    #[default]
    Memory,
    /// One file per key under `path`
    Filesystem,
}

/// Learning state persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend kind
    pub backend: StorageBackend,
    /// Directory for the filesystem backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Directory for the filesystem backend, defaulting to the user data dir.
    pub fn resolved_path(&self) -> PostforgeResult<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|d| d.join("postforge").join("state"))
            .ok_or_else(|| {
                PostforgeError::from(ConfigError::invalid(
                    "storage.path",
                    "unset and no data directory is available",
                ))
            })
    }
}

/// Top-level Postforge configuration.
///
/// # Example
///
/// ```no_run
/// use postforge_rate_limit::PostforgeConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PostforgeConfig::load()?;
/// println!("deadline: {} ms", config.pipeline.deadline_ms);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PostforgeConfig {
    /// `[upstream]`
    pub upstream: UpstreamConfig,
    /// `[retry]`
    pub retry: RetryConfig,
    /// `[pipeline]`
    pub pipeline: PipelineConfig,
    /// `[rate_limit]`
    pub rate_limit: RateLimitConfig,
    /// `[storage]`
    pub storage: StorageConfig,
}

impl PostforgeConfig {
    /// Bundled defaults only, ignoring user files.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file fails to parse.
    pub fn bundled() -> PostforgeResult<Self> {
        Self::finish(
            config::Config::builder()
                .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml)),
        )
    }

    /// Bundled defaults overlaid with a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> PostforgeResult<Self> {
        debug!("Loading configuration from file");

        if !path.as_ref().exists() {
            Err(ConfigError::new(ConfigErrorKind::MissingFile(
                path.as_ref().display().to_string(),
            )))?
        }

        Self::finish(
            config::Config::builder()
                .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
                .add_source(config::File::from(path.as_ref())),
        )
    }

    /// Load configuration with precedence: current dir > home dir > bundled default.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file fails to parse.
    #[instrument]
    pub fn load() -> PostforgeResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/postforge/postforge.toml");
            builder = builder.add_source(config::File::from(home_config).required(false));
        }

        builder = builder.add_source(config::File::with_name("postforge").required(false));

        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> PostforgeResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| {
                PostforgeError::from(ConfigError::new(ConfigErrorKind::Load(e.to_string())))
            })?
            .try_deserialize()
            .map_err(|e| {
                PostforgeError::from(ConfigError::new(ConfigErrorKind::Load(e.to_string())))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> PostforgeResult<()> {
        if self.retry.max_attempts == 0 {
            Err(ConfigError::invalid("retry.max_attempts", "must be at least 1"))?
        }
        if self.pipeline.deadline_ms <= self.pipeline.safety_margin_ms {
            Err(ConfigError::invalid(
                "pipeline.deadline_ms",
                "must exceed pipeline.safety_margin_ms",
            ))?
        }
        if self.pipeline.title_history == 0 {
            Err(ConfigError::invalid("pipeline.title_history", "must be at least 1"))?
        }
        if !(0.0..=2.0).contains(&self.pipeline.repair_temperature) {
            Err(ConfigError::invalid("pipeline.repair_temperature", "must lie in [0, 2]"))?
        }
        if self.rate_limit.enabled && (self.rate_limit.burst == 0 || self.rate_limit.refill_secs == 0)
        {
            Err(ConfigError::invalid(
                "rate_limit",
                "burst and refill_secs must be positive",
            ))?
        }
        if self.upstream.api_key_env.trim().is_empty() {
            Err(ConfigError::invalid("upstream.api_key_env", "must name a variable"))?
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_matches_code_defaults() {
        let bundled = PostforgeConfig::bundled().unwrap();
        assert_eq!(bundled, PostforgeConfig::default());
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut config = PostforgeConfig::default();
        config.retry.max_attempts = 0;
        let err = config.validate().unwrap_err();
        match err.kind() {
            postforge_error::PostforgeErrorKind::Config(e) => assert!(matches!(
                e.kind(),
                ConfigErrorKind::InvalidValue { key, .. } if key == "retry.max_attempts"
            )),
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_margin_past_deadline() {
        let mut config = PostforgeConfig::default();
        config.pipeline.deadline_ms = 1_000;
        assert!(config.validate().is_err());
    }
}
