//! Chat completion provider integration for Postforge.
//!
//! [`OpenRouterClient`] implements
//! [`CompletionDriver`](postforge_interface::CompletionDriver) against any
//! OpenRouter-compatible `/chat/completions` endpoint. Every call records
//! OpenTelemetry metrics through [`LlmMetrics`].
//!
//! # Example
//!
//! ```no_run
//! use postforge_core::{CompletionRequestBuilder, Message};
//! use postforge_interface::CompletionDriver;
//! use postforge_models::OpenRouterClient;
//! use postforge_rate_limit::PostforgeConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PostforgeConfig::load()?;
//! let client = OpenRouterClient::from_config(&config.upstream)?;
//! let request = CompletionRequestBuilder::default()
//!     .model(client.model_name())
//!     .messages(vec![Message::user("Say hello")])
//!     .build()?;
//! let response = client.complete(&request).await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod metrics;
mod openrouter;

pub use metrics::{LlmMetrics, classify_error};
pub use openrouter::{OpenRouterClient, parse_completion};
