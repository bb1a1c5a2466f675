//! Core data types for the Postforge content generation pipeline.
//!
//! This crate provides the values that flow between the pipeline stages:
//! chat messages and completion envelopes, the inbound request and its
//! validated [`GenerationRequest`] form, the [`GenerationResult`] handed back
//! to callers, and the per-token [`LearningState`] that drives topic and
//! format rotation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod candidate;
mod completion;
mod learning;
mod message;
mod request;
mod result;
mod role;

pub use candidate::{CandidatePool, FormatHint};
pub use completion::{CompletionRequest, CompletionRequestBuilder, CompletionResponse, Usage};
pub use learning::{DEFAULT_TITLE_HISTORY, LearningState, title_fingerprint};
pub use message::Message;
pub use request::{
    DEFAULT_LANGUAGE, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TOKEN,
    GenerationRequest, InboundContext, InboundRequest, LengthBand, MAX_CHARS_CEILING, MAX_TOKENS_CEILING,
    PostKind,
};
pub use result::{GenerationResult, ValidationFlags};
pub use role::Role;
