//! Generation pipeline for Postforge.
//!
//! Turns one [`GenerationRequest`](postforge_core::GenerationRequest) into a
//! publishable post within a single deadline:
//!
//! - **Rotation**: least-used or round-robin topic and format choice
//! - **Prompting**: persona, focus and output schema composition
//! - **Upstream**: deadline-bounded retries over a [`CompletionDriver`](postforge_interface::CompletionDriver)
//! - **Repair**: corrective re-prompts until the draft passes its checks
//! - **Finishing**: sanitizing, length fitting and title synthesis
//!
//! # Example
//!
//! ```rust,ignore
//! use postforge_pipeline::Pipeline;
//! use postforge_storage::LearningStore;
//!
//! # async fn example(driver: std::sync::Arc<dyn postforge_interface::CompletionDriver>) -> postforge_error::PostforgeResult<()> {
//! let config = postforge_rate_limit::PostforgeConfig::default();
//! let pipeline = Pipeline::new(driver, std::sync::Arc::new(LearningStore::new()), &config);
//! let result = pipeline
//!     .handle("local", postforge_core::InboundRequest::new("halving recap").with_token("BTC"))
//!     .await?;
//! println!("{} ({} repairs)", result.title, result.flags.repair_attempts);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chooser;
mod deadline;
mod extraction;
mod length;
mod pipeline;
mod prompt;
mod repair;
mod rotation;
mod sanitizer;
mod title;
mod upstream;
mod validator;

pub use chooser::{Chooser, FixedChooser, RandomChooser, choose};
pub use deadline::Deadline;
pub use extraction::{Draft, ExtractionStrategy, draft_from_response, extract_object, parse_draft};
pub use length::{FitOutcome, LengthFitter, PAD_OVERFLOW_TOLERANCE};
pub use pipeline::Pipeline;
pub use prompt::{
    ComposedPrompt, DEFAULT_PERSONAS, FOCUS_DIMENSIONS, PromptComposer, default_formats,
    default_pool, default_topics,
};
pub use repair::{RepairLoop, RepairOutcome, RepairSettings};
pub use rotation::RotationSelector;
pub use sanitizer::{BANNED_PHRASES, MAX_EMOJI, cap_emoji, sanitize};
pub use title::{
    COLLISION_TWEAKS, FALLBACK_PREFIX_CHARS, TITLE_MAX_CHARS, TITLE_TEMPLATES, TitleSynthesizer,
};
pub use upstream::{MIN_ATTEMPT_TIMEOUT, UpstreamClient, completion_request};
pub use validator::{
    OutputValidator, ValidationReport, has_ta_language, has_verifiable_detail, token_pattern,
};
