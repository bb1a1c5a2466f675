//! Error types for the Postforge library.
//!
//! This crate provides the foundation error types used throughout the Postforge workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! The taxonomy mirrors how the pipeline treats each failure:
//!
//! | Error | Retried | Surfaced to caller |
//! |---|---|---|
//! | [`InputError`] | no | immediately |
//! | [`UpstreamError`] | when transient | after retries |
//! | [`ParseError`] | no | never (free-text fallback) |
//! | [`TimeoutError`] | no | distinctly from upstream errors |
//! | [`ValidationError`] | via repair loop | only as an advisory flag |
//! | [`RateLimitError`] | no | immediately |
//! | [`StorageError`] | no | never from the pipeline (logged) |
//!
//! # Examples
//!
//! ```
//! use postforge_error::{InputError, InputErrorKind, PostforgeResult};
//!
//! fn check_prompt(prompt: &str) -> PostforgeResult<()> {
//!     if prompt.trim().is_empty() {
//!         Err(InputError::new(InputErrorKind::MissingField("prompt".to_string())))?
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_prompt("").is_err());
//! assert!(check_prompt("write about fees").is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod input;
mod json;
mod parse;
mod rate_limit;
mod storage;
mod timeout;
mod upstream;
mod validation;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::{ConfigError, ConfigErrorKind};
pub use error::{PostforgeError, PostforgeErrorKind, PostforgeResult};
pub use input::{InputError, InputErrorKind};
pub use json::JsonError;
pub use parse::ParseError;
pub use rate_limit::RateLimitError;
pub use storage::{StorageError, StorageErrorKind};
pub use timeout::TimeoutError;
pub use upstream::{RetryableError, UpstreamError, UpstreamErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
