//! Postforge - validated short-form crypto posts from chat completion APIs
//!
//! Postforge turns a task prompt into a publishable post: it rotates topics
//! and formats so consecutive posts differ, calls an OpenRouter-compatible
//! completion API under one deadline, checks the output contract, asks the
//! model to repair violations, and finishes the text with sanitizing, length
//! fitting and title de-duplication.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use postforge::{InboundRequest, OpenRouterClient, PostforgeConfig, build_pipeline, build_store};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PostforgeConfig::load()?;
//!     let driver = Arc::new(OpenRouterClient::from_config(&config.upstream)?);
//!     let pipeline = build_pipeline(&config, driver, build_store(&config.storage)?, None);
//!
//!     let result = pipeline
//!         .handle("local", InboundRequest::new("Explain the halving").with_token("BTC"))
//!         .await?;
//!     println!("{}\n\n{}", result.title, result.text);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `postforge_error` - Error types
//! - `postforge_core` - Requests, results, learning state
//! - `postforge_interface` - Driver and store traits
//! - `postforge_rate_limit` - Configuration, retry schedule, caller limiter
//! - `postforge_storage` - Blob stores and the learning store
//! - `postforge_models` - OpenRouter client and metrics
//! - `postforge_pipeline` - The generation pipeline
//!
//! This crate (`postforge`) re-exports everything for convenience.

pub use postforge_core::*;
pub use postforge_error::*;
pub use postforge_interface::*;
pub use postforge_models::*;
pub use postforge_pipeline::*;
pub use postforge_rate_limit::*;
pub use postforge_storage::{FileSystemBlobStore, InMemoryBlobStore, LearningStore};

mod observability;
mod setup;

pub use observability::{LoggingConfig, init_logging};
pub use setup::{build_pipeline, build_store, load_config};
