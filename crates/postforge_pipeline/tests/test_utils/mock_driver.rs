//! Scripted completion driver.

use async_trait::async_trait;
use postforge_core::{CompletionRequest, CompletionResponse, Usage};
use postforge_error::{PostforgeError, PostforgeResult, UpstreamError, UpstreamErrorKind};
use postforge_interface::CompletionDriver;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Behavior configuration for mock responses.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always return success with the given text
    Success(String),
    /// Always return the specified error
    Error(UpstreamErrorKind),
    /// Fail N times with the error, then succeed with the text
    FailThenSucceed {
        fail_count: usize,
        error: UpstreamErrorKind,
        success_text: String,
    },
    /// Return a sequence of responses; the last one repeats
    Sequence(Vec<MockResponse>),
}

/// A single mock response (success or error).
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(UpstreamErrorKind),
}

/// Mock completion driver.
///
/// Records every request it receives so tests can inspect the prompts and
/// sampling parameters the pipeline sent.
pub struct MockDriver {
    behavior: MockBehavior,
    latency: Duration,
    call_count: Arc<Mutex<usize>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockDriver {
    /// Driver with custom behavior.
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            latency: Duration::from_millis(1),
            call_count: Arc::new(Mutex::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Driver that always succeeds with `text`.
    pub fn new_success(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Success(text.into()))
    }

    /// Driver that always fails with an HTTP `status`.
    #[allow(dead_code)]
    pub fn new_status(status_code: u16) -> Self {
        Self::new(MockBehavior::Error(status(status_code)))
    }

    /// Driver that fails `fail_count` times with `status_code`, then succeeds.
    #[allow(dead_code)]
    pub fn new_fail_then_succeed(
        fail_count: usize,
        status_code: u16,
        success_text: impl Into<String>,
    ) -> Self {
        Self::new(MockBehavior::FailThenSucceed {
            fail_count,
            error: status(status_code),
            success_text: success_text.into(),
        })
    }

    /// Driver replaying `responses` in order.
    #[allow(dead_code)]
    pub fn new_sequence(responses: Vec<MockResponse>) -> Self {
        Self::new(MockBehavior::Sequence(responses))
    }

    /// Simulated latency per call.
    #[allow(dead_code)]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of times complete() was called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Requests received so far.
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self, req: &CompletionRequest) -> PostforgeResult<CompletionResponse> {
        let mut count = self.call_count.lock().unwrap();
        let current = *count;
        *count += 1;
        self.requests.lock().unwrap().push(req.clone());

        let scripted = match &self.behavior {
            MockBehavior::Success(text) => MockResponse::Success(text.clone()),
            MockBehavior::Error(kind) => MockResponse::Error(kind.clone()),
            MockBehavior::FailThenSucceed {
                fail_count,
                error,
                success_text,
            } => {
                if current < *fail_count {
                    MockResponse::Error(error.clone())
                } else {
                    MockResponse::Success(success_text.clone())
                }
            }
            MockBehavior::Sequence(responses) => match responses.get(current).or(responses.last()) {
                Some(response) => response.clone(),
                None => MockResponse::Error(UpstreamErrorKind::Network(
                    "Mock sequence is empty".to_string(),
                )),
            },
        };

        match scripted {
            MockResponse::Success(text) => Ok(CompletionResponse {
                id: Some(format!("mock-{}", current)),
                model: req.model().clone(),
                text,
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 20,
                    total_tokens: 30,
                }),
            }),
            MockResponse::Error(kind) => Err(PostforgeError::from(UpstreamError::new(kind))),
        }
    }
}

#[async_trait]
impl CompletionDriver for MockDriver {
    async fn complete(&self, req: &CompletionRequest) -> PostforgeResult<CompletionResponse> {
        tokio::time::sleep(self.latency).await;
        self.next_response(req)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

fn status(status_code: u16) -> UpstreamErrorKind {
    UpstreamErrorKind::Status {
        status_code,
        payload: format!(r#"{{"error":{{"code":{}}}}}"#, status_code),
    }
}
