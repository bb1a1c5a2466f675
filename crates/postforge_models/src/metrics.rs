//! Metrics for LLM API calls.
//!
//! Provides OpenTelemetry-based metrics for tracking provider latency,
//! errors, and token usage.

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};
use postforge_error::{PostforgeError, PostforgeErrorKind, UpstreamErrorKind};
use std::sync::OnceLock;

static METRICS: OnceLock<LlmMetrics> = OnceLock::new();

/// Metrics for LLM API interactions.
///
/// Metrics are labeled with provider and model name.
#[derive(Clone)]
pub struct LlmMetrics {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    /// Total LLM API requests
    pub requests: Counter<u64>,
    /// Failed LLM API requests
    pub errors: Counter<u64>,
    /// LLM API call duration in seconds
    pub duration: Histogram<f64>,
    /// Total tokens used (prompt + completion)
    pub tokens_used: Counter<u64>,
    /// Prompt tokens used
    pub prompt_tokens: Counter<u64>,
    /// Completion tokens used
    pub completion_tokens: Counter<u64>,
}

impl LlmMetrics {
    fn init() -> Self {
        let meter = global::meter("postforge_llm");

        Self {
            _meter: meter.clone(),
            requests: meter
                .u64_counter("llm.requests")
                .with_description("Total LLM API requests")
                .build(),
            errors: meter
                .u64_counter("llm.errors")
                .with_description("Failed LLM API requests")
                .build(),
            duration: meter
                .f64_histogram("llm.duration")
                .with_unit("seconds")
                .with_description("LLM API call duration")
                .build(),
            tokens_used: meter
                .u64_counter("llm.tokens")
                .with_description("Total tokens used (prompt + completion)")
                .build(),
            prompt_tokens: meter
                .u64_counter("llm.tokens.prompt")
                .with_description("Prompt tokens used")
                .build(),
            completion_tokens: meter
                .u64_counter("llm.tokens.completion")
                .with_description("Completion tokens used")
                .build(),
        }
    }

    /// Get the global LLM metrics instance.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::init)
    }

    /// Record a completed LLM API request.
    pub fn record_request(&self, provider: &str, model: &str, duration_secs: f64) {
        let labels = &[
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("model", model.to_string()),
        ];
        self.requests.add(1, labels);
        self.duration.record(duration_secs, labels);
    }

    /// Record a failed LLM API request.
    pub fn record_error(&self, provider: &str, model: &str, error_type: &str) {
        let labels = &[
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("model", model.to_string()),
            KeyValue::new("error_type", error_type.to_string()),
        ];
        self.errors.add(1, labels);
    }

    /// Record token usage from an LLM response.
    pub fn record_tokens(
        &self,
        model: &str,
        prompt_tokens: u64,
        completion_tokens: u64,
        total_tokens: u64,
    ) {
        let labels = &[KeyValue::new("model", model.to_string())];
        self.tokens_used.add(total_tokens, labels);
        self.prompt_tokens.add(prompt_tokens, labels);
        self.completion_tokens.add(completion_tokens, labels);
    }
}

impl Default for LlmMetrics {
    fn default() -> Self {
        Self::get().clone()
    }
}

/// Classify error type for metrics labeling.
///
/// Returns one of: "rate_limit", "auth", "network", "timeout",
/// "invalid_request", "server", "response", "config", "unknown".
///
/// # Examples
///
/// ```
/// use postforge_error::{PostforgeError, UpstreamError, UpstreamErrorKind};
/// use postforge_models::classify_error;
///
/// let err = PostforgeError::from(UpstreamError::new(UpstreamErrorKind::Status {
///     status_code: 429,
///     payload: "slow down".to_string(),
/// }));
/// assert_eq!(classify_error(&err), "rate_limit");
/// ```
pub fn classify_error(error: &PostforgeError) -> &'static str {
    match error.kind() {
        PostforgeErrorKind::Upstream(e) => match &e.kind {
            UpstreamErrorKind::Network(_) => "network",
            UpstreamErrorKind::Response(_) => "response",
            UpstreamErrorKind::Status { status_code, .. } => match status_code {
                429 => "rate_limit",
                401 | 403 => "auth",
                408 => "timeout",
                400..=499 => "invalid_request",
                500..=599 => "server",
                _ => "unknown",
            },
        },
        PostforgeErrorKind::Timeout(_) => "timeout",
        PostforgeErrorKind::Config(_) => "config",
        _ => "unknown",
    }
}
