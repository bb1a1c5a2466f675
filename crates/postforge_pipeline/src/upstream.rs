//! Deadline-aware completion with retry.

use crate::Deadline;
use postforge_core::{CompletionRequest, CompletionRequestBuilder, CompletionResponse, Message};
use postforge_error::{BuilderError, PostforgeError, PostforgeResult, RetryableError, TimeoutError};
use postforge_interface::CompletionDriver;
use postforge_rate_limit::RetryPolicy;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

/// Shortest timeout an attempt is ever given.
pub const MIN_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(1);

/// Assemble a completion request.
///
/// # Errors
///
/// Returns a [`BuilderError`] when the model is blank, `messages` is empty
/// or a sampling parameter is out of range.
pub fn completion_request(
    model: &str,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
) -> Result<CompletionRequest, BuilderError> {
    CompletionRequestBuilder::default()
        .model(model)
        .messages(messages)
        .temperature(temperature)
        .max_tokens(max_tokens)
        .build()
}

/// Wraps a [`CompletionDriver`] with per-attempt timeouts and backoff.
///
/// Every attempt gets the time left on the request's [`Deadline`] minus a
/// safety margin, but never less than [`MIN_ATTEMPT_TIMEOUT`] nor more than
/// what is left. A retry is only scheduled when its backoff plus a minimal
/// attempt still fits the deadline.
#[derive(Clone)]
pub struct UpstreamClient {
    driver: Arc<dyn CompletionDriver>,
    retry: RetryPolicy,
    safety_margin: Duration,
}

impl UpstreamClient {
    /// Client over `driver`.
    pub fn new(driver: Arc<dyn CompletionDriver>, retry: RetryPolicy, safety_margin: Duration) -> Self {
        Self {
            driver,
            retry,
            safety_margin,
        }
    }

    /// Underlying driver.
    pub fn driver(&self) -> &Arc<dyn CompletionDriver> {
        &self.driver
    }

    /// Timeout for an attempt starting now.
    pub fn attempt_timeout(&self, deadline: &Deadline) -> Duration {
        let remaining = deadline.remaining();
        remaining
            .saturating_sub(self.safety_margin)
            .max(MIN_ATTEMPT_TIMEOUT)
            .min(remaining)
    }

    /// Run `req`, retrying transient failures within `deadline`.
    ///
    /// `stage` names the pipeline step in timeout errors and logs.
    ///
    /// # Errors
    ///
    /// - [`TimeoutError`] when the deadline is spent before or during a call
    /// - the last upstream error once retries are exhausted or the error is
    ///   not transient
    #[instrument(
        skip(self, req, deadline),
        fields(
            provider = self.driver.provider_name(),
            model = %req.model(),
            remaining_ms = deadline.remaining().as_millis() as u64
        )
    )]
    pub async fn complete(
        &self,
        req: &CompletionRequest,
        deadline: &Deadline,
        stage: &str,
    ) -> PostforgeResult<CompletionResponse> {
        if deadline.expired() {
            Err(TimeoutError::new(stage, deadline.budget_ms()))?
        }

        let deadline = *deadline;
        let strategy = self
            .retry
            .delays()
            .take_while(move |delay| deadline.can_fit(*delay + MIN_ATTEMPT_TIMEOUT));

        let attempts = AtomicU32::new(0);
        let attempts_ref = &attempts;
        let driver = &self.driver;
        let client = self;

        let result = Retry::spawn(strategy, move || async move {
            let attempt = attempts_ref.fetch_add(1, Ordering::Relaxed) + 1;
            if deadline.expired() {
                return Err(RetryError::Permanent(PostforgeError::from(TimeoutError::new(
                    stage,
                    deadline.budget_ms(),
                ))));
            }

            let timeout = client.attempt_timeout(&deadline);
            debug!(attempt, timeout_ms = timeout.as_millis() as u64, "Calling upstream");

            match tokio::time::timeout(timeout, driver.complete(req)).await {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(e)) if e.is_retryable() => {
                    warn!(attempt, error = %e, "Transient upstream error, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Ok(Err(e)) => {
                    warn!(attempt, error = %e, "Permanent upstream error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
                Err(_) => {
                    warn!(attempt, timeout_ms = timeout.as_millis() as u64, "Upstream call timed out");
                    Err(RetryError::Permanent(PostforgeError::from(TimeoutError::new(
                        stage,
                        deadline.budget_ms(),
                    ))))
                }
            }
        })
        .await;

        debug!(
            attempts = attempts.load(Ordering::Relaxed),
            ok = result.is_ok(),
            "Upstream call finished"
        );
        result
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("provider", &self.driver.provider_name())
            .field("retry", &self.retry)
            .field("safety_margin", &self.safety_margin)
            .finish()
    }
}
