//! Request and response envelopes for a single chat completion.

use crate::{MAX_TOKENS_CEILING, Message};
use postforge_error::{BuilderError, BuilderErrorKind};
use serde::{Deserialize, Serialize};

/// One chat completion call.
///
/// # Examples
///
/// ```
/// use postforge_core::{CompletionRequestBuilder, Message};
///
/// let request = CompletionRequestBuilder::default()
///     .model("meta-llama/llama-3.1-8b-instruct")
///     .messages(vec![Message::user("hello")])
///     .temperature(0.7f32)
///     .max_tokens(900u32)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 1);
/// assert_eq!(*request.max_tokens(), 900);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct CompletionRequest {
    /// Model identifier
    model: String,
    /// Conversation messages
    messages: Vec<Message>,
    /// Sampling temperature
    #[builder(default = "0.7")]
    temperature: f32,
    /// Completion token budget
    #[builder(default = "900")]
    max_tokens: u32,
}

impl CompletionRequestBuilder {
    /// Build the request, rejecting values the upstream would refuse.
    ///
    /// # Errors
    ///
    /// Returns a [`BuilderError`] when `model` or `messages` is unset or
    /// empty, the temperature lies outside `[0, 2]`, or `max_tokens` lies
    /// outside `1..=MAX_TOKENS_CEILING`.
    #[track_caller]
    pub fn build(&self) -> Result<CompletionRequest, BuilderError> {
        let request = self.build_internal().map_err(|e| match e {
            CompletionRequestBuilderError::UninitializedField(field) => {
                BuilderError::new(BuilderErrorKind::MissingField(field))
            }
            CompletionRequestBuilderError::ValidationError(reason) => {
                BuilderError::invalid("request", reason)
            }
        })?;

        if request.model.trim().is_empty() {
            return Err(BuilderError::invalid("model", "must not be blank"));
        }
        if request.messages.is_empty() {
            return Err(BuilderError::invalid("messages", "must not be empty"));
        }
        if !(0.0..=2.0).contains(&request.temperature) {
            return Err(BuilderError::invalid(
                "temperature",
                format!("{} is outside [0, 2]", request.temperature),
            ));
        }
        if !(1..=MAX_TOKENS_CEILING).contains(&request.max_tokens) {
            return Err(BuilderError::invalid(
                "max_tokens",
                format!("{} is outside 1..={}", request.max_tokens, MAX_TOKENS_CEILING),
            ));
        }
        Ok(request)
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Completion tokens
    #[serde(default)]
    pub completion_tokens: u64,
    /// Total tokens
    #[serde(default)]
    pub total_tokens: u64,
}

impl Usage {
    /// Add another call's usage to this running total.
    ///
    /// # Examples
    ///
    /// ```
    /// use postforge_core::Usage;
    ///
    /// let mut total = Usage::default();
    /// total.accumulate(&Usage { prompt_tokens: 10, completion_tokens: 5, total_tokens: 15 });
    /// total.accumulate(&Usage { prompt_tokens: 3, completion_tokens: 2, total_tokens: 5 });
    /// assert_eq!(total.total_tokens, 20);
    /// ```
    pub fn accumulate(&mut self, other: &Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Provider reply reduced to what the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Provider-assigned completion id
    pub id: Option<String>,
    /// Model that answered (echoes the requested model when the provider omits it)
    pub model: String,
    /// First choice content, empty when absent
    pub text: String,
    /// Token usage, when reported
    pub usage: Option<Usage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CompletionRequestBuilder {
        let mut builder = CompletionRequestBuilder::default();
        builder.model("m").messages(vec![Message::user("hi")]);
        builder
    }

    #[test]
    fn missing_model_names_the_field() {
        let err = CompletionRequestBuilder::default()
            .messages(vec![Message::user("hi")])
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), &BuilderErrorKind::MissingField("model"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = builder().temperature(3.5f32).build().unwrap_err();
        assert!(matches!(
            err.kind(),
            BuilderErrorKind::InvalidField { field: "temperature", .. }
        ));

        let err = builder().max_tokens(0u32).build().unwrap_err();
        assert!(matches!(
            err.kind(),
            BuilderErrorKind::InvalidField { field: "max_tokens", .. }
        ));

        let err = builder().messages(Vec::<Message>::new()).build().unwrap_err();
        assert!(matches!(
            err.kind(),
            BuilderErrorKind::InvalidField { field: "messages", .. }
        ));
    }

    #[test]
    fn defaults_fill_sampling_parameters() {
        let request = builder().build().unwrap();
        assert_eq!(*request.temperature(), 0.7);
        assert_eq!(*request.max_tokens(), 900);
    }
}
