//! Configuration, retry policy and per-caller rate limiting.
//!
//! [`PostforgeConfig`] layers the bundled `postforge.toml` under optional
//! user files. [`RetryPolicy`] turns the `[retry]` section into a
//! `tokio-retry2` backoff schedule, and [`CallerRateLimiter`] gates requests
//! per caller with a governor token bucket.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;
mod retry;

pub use config::{
    PipelineConfig, PostforgeConfig, RateLimitConfig, RepairAcceptance, RetryConfig,
    RotationPolicy, StorageBackend, StorageConfig, UpstreamConfig,
};
pub use limiter::CallerRateLimiter;
pub use retry::RetryPolicy;
