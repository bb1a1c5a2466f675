//! OpenRouter-compatible chat completion client.

use super::dto::{ChatRequest, ChatResponse};
use crate::{LlmMetrics, classify_error};
use async_trait::async_trait;
use postforge_core::{CompletionRequest, CompletionResponse, MAX_TOKENS_CEILING};
use postforge_error::{
    ConfigError, ConfigErrorKind, PostforgeResult, UpstreamError, UpstreamErrorKind,
};
use postforge_interface::CompletionDriver;
use postforge_rate_limit::UpstreamConfig;
use std::time::Instant;
use tracing::{debug, instrument, warn};

const PROVIDER: &str = "openrouter";

/// Chat completion client for OpenRouter and compatible endpoints.
///
/// Sends `Authorization: Bearer`, `HTTP-Referer` and `X-Title` headers on
/// every call. Performs one HTTP exchange per [`complete`](CompletionDriver::complete);
/// retries are the caller's concern.
#[derive(Clone, derive_getters::Getters)]
pub struct OpenRouterClient {
    #[getter(skip)]
    http: reqwest::Client,
    #[getter(skip)]
    api_key: String,
    /// Chat completions URL
    endpoint: String,
    /// `HTTP-Referer` header value
    referer: String,
    /// `X-Title` header value
    title: String,
    /// Model used when a request names none
    default_model: String,
}

impl OpenRouterClient {
    /// Create a client, reading the API key from the environment variable
    /// named by `config.api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the variable is unset or empty.
    #[instrument(skip_all, fields(endpoint = %config.endpoint, key_env = %config.api_key_env))]
    pub fn from_config(config: &UpstreamConfig) -> PostforgeResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::new(ConfigErrorKind::MissingEnv(config.api_key_env.clone())))?;

        Ok(Self::with_api_key(api_key, config))
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(api_key: impl Into<String>, config: &UpstreamConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: config.endpoint.clone(),
            referer: config.referer.clone(),
            title: config.title.clone(),
            default_model: config.default_model.clone(),
        }
    }

    async fn exchange(&self, req: &CompletionRequest) -> PostforgeResult<CompletionResponse> {
        let model = if req.model().is_empty() {
            self.default_model.as_str()
        } else {
            req.model().as_str()
        };

        let body = ChatRequest {
            model,
            messages: req.messages(),
            temperature: *req.temperature(),
            max_tokens: (*req.max_tokens()).clamp(1, MAX_TOKENS_CEILING),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::new(UpstreamErrorKind::Network(e.to_string())))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            UpstreamError::new(UpstreamErrorKind::Response(format!(
                "failed to read body: {}",
                e
            )))
        })?;

        Ok(parse_completion(status, &text, model)?)
    }
}

/// Interpret a chat completions reply.
///
/// Non-2xx statuses become [`UpstreamErrorKind::Status`] whose payload is the
/// reply's `error` field when present, else the whole reply, else
/// `"Upstream error"`. A 2xx reply that is not JSON is
/// [`UpstreamErrorKind::Response`]. A missing model echoes `requested_model`
/// and missing content yields empty text.
///
/// # Examples
///
/// ```
/// use postforge_models::parse_completion;
///
/// let ok = parse_completion(
///     200,
///     r#"{"id":"gen-1","choices":[{"message":{"content":"hi"}}]}"#,
///     "meta-llama/llama-3.1-8b-instruct",
/// ).unwrap();
/// assert_eq!(ok.text, "hi");
/// assert_eq!(ok.model, "meta-llama/llama-3.1-8b-instruct");
///
/// let err = parse_completion(401, r#"{"error":{"message":"No auth"}}"#, "m").unwrap_err();
/// assert_eq!(err.status_code(), Some(401));
/// assert_eq!(err.payload(), Some(r#"{"message":"No auth"}"#));
/// ```
#[track_caller]
pub fn parse_completion(
    status: u16,
    body: &str,
    requested_model: &str,
) -> Result<CompletionResponse, UpstreamError> {
    if !(200..300).contains(&status) {
        let data = serde_json::from_str::<serde_json::Value>(body).ok();
        let payload = match data {
            Some(serde_json::Value::Object(mut map)) => match map.remove("error") {
                Some(serde_json::Value::Null) | None => serde_json::Value::Object(map).to_string(),
                Some(error) => error.to_string(),
            },
            Some(serde_json::Value::Null) | None => {
                serde_json::json!({ "error": "Upstream error" }).to_string()
            }
            Some(other) => other.to_string(),
        };
        return Err(UpstreamError::new(UpstreamErrorKind::Status {
            status_code: status,
            payload,
        }));
    }

    let data: ChatResponse = serde_json::from_str(body).map_err(|e| {
        UpstreamError::new(UpstreamErrorKind::Response(format!(
            "invalid completion body: {}",
            e
        )))
    })?;

    let text = data
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default();

    Ok(CompletionResponse {
        id: data.id,
        model: data
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| requested_model.to_string()),
        text,
        usage: data.usage,
    })
}

#[async_trait]
impl CompletionDriver for OpenRouterClient {
    #[instrument(
        skip(self, req),
        fields(
            provider = PROVIDER,
            model = %req.model(),
            messages = req.messages().len(),
            max_tokens = req.max_tokens()
        )
    )]
    async fn complete(&self, req: &CompletionRequest) -> PostforgeResult<CompletionResponse> {
        let metrics = LlmMetrics::get();
        let started = Instant::now();

        let result = self.exchange(req).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(response) => {
                metrics.record_request(PROVIDER, &response.model, elapsed);
                if let Some(usage) = &response.usage {
                    metrics.record_tokens(
                        &response.model,
                        usage.prompt_tokens,
                        usage.completion_tokens,
                        usage.total_tokens,
                    );
                }
                debug!(
                    model = %response.model,
                    chars = response.text.chars().count(),
                    elapsed_secs = elapsed,
                    "Completion received"
                );
            }
            Err(e) => {
                let class = classify_error(e);
                metrics.record_request(PROVIDER, req.model(), elapsed);
                metrics.record_error(PROVIDER, req.model(), class);
                warn!(error = %e, class, "Completion failed");
            }
        }

        result
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.default_model
    }
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("endpoint", &self.endpoint)
            .field("default_model", &self.default_model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postforge_error::RetryableError;

    #[test]
    fn usage_is_carried_through() {
        let body = r#"{
            "id": "gen-42",
            "model": "meta-llama/llama-3.1-8b-instruct",
            "choices": [{"message": {"role": "assistant", "content": "BTC block 840000"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
        }"#;
        let response = parse_completion(200, body, "ignored").unwrap();
        assert_eq!(response.id.as_deref(), Some("gen-42"));
        assert_eq!(response.model, "meta-llama/llama-3.1-8b-instruct");
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(20));
    }

    #[test]
    fn missing_content_is_empty_text() {
        let response = parse_completion(200, r#"{"choices":[]}"#, "m").unwrap();
        assert_eq!(response.text, "");
        assert!(response.usage.is_none());

        let response =
            parse_completion(200, r#"{"choices":[{"message":{"content":null}}]}"#, "m").unwrap();
        assert_eq!(response.text, "");
    }

    #[test]
    fn error_payload_falls_back_to_whole_body() {
        let err = parse_completion(502, r#"{"detail":"bad gateway"}"#, "m").unwrap_err();
        assert_eq!(err.payload(), Some(r#"{"detail":"bad gateway"}"#));
        assert!(err.is_retryable());
    }

    #[test]
    fn unparseable_error_body_uses_placeholder() {
        let err = parse_completion(400, "<html>", "m").unwrap_err();
        assert!(err.payload().unwrap_or_default().contains("Upstream error"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn unreadable_success_body_is_retryable() {
        let err = parse_completion(200, "not json", "m").unwrap_err();
        assert!(matches!(err.kind, UpstreamErrorKind::Response(_)));
        assert!(err.is_retryable());
    }
}
