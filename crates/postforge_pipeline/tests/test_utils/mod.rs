//! Test utilities for pipeline tests.
//!
//! This module provides a scripted completion driver and shared fixtures.

pub mod mock_driver;

#[allow(unused_imports)]
pub use mock_driver::{MockBehavior, MockDriver, MockResponse};

use postforge_rate_limit::PostforgeConfig;

/// Body that passes every content check.
#[allow(dead_code)]
pub const COMPLIANT_BODY: &str = "BTC 在区块 840000 完成第四次减半，区块奖励从 6.25 降至 3.125。矿工收入更依赖手续费，算力短期波动后逐步恢复。";

/// Raw text that fails the detail and technical-analysis checks.
#[allow(dead_code)]
pub const HYPE_TEXT: &str = "BTC rose to the moon, buy now!!";

/// Structured response wrapping `body` under `title`.
#[allow(dead_code)]
pub fn structured_response(title: &str, body: &str) -> String {
    serde_json::json!({
        "title": title,
        "body": body,
        "hashtags": ["#BTC", "#减半"],
        "tickers": ["$btc"],
        "mentions": [],
        "verifiable_detail": "区块 840000"
    })
    .to_string()
}

/// Default configuration with synchronous persistence and no continuation.
#[allow(dead_code)]
pub fn test_config() -> PostforgeConfig {
    let mut config = PostforgeConfig::default();
    config.pipeline.persist_in_background = false;
    config.pipeline.continuation = false;
    config
}
