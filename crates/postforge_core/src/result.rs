//! Generation output returned to callers.

use crate::Usage;
use serde::{Deserialize, Serialize};

/// Advisory compliance record attached to every result.
///
/// A result is returned even when `ok` is false; `needs_review` tells the
/// caller that full compliance was never reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFlags {
    /// Token symbol appears in the text or the ticker field
    pub token_mentioned: bool,
    /// A hash, block height or timestamp is present
    pub includes_verifiable_detail: bool,
    /// Technical-analysis or price-prediction language was found
    pub ta_violation: bool,
    /// All three checks passed
    pub ok: bool,
    /// Repair re-prompts issued
    pub repair_attempts: u32,
    /// Compliance was never reached
    pub needs_review: bool,
    /// Final candidate parsed as structured data
    pub structured: bool,
    /// A continuation call extended the body
    pub continuation_used: bool,
    /// Filler sentences were appended to reach the minimum length
    pub padded: bool,
    /// Body was cut to the maximum length
    pub truncated: bool,
    /// Body is below the minimum length even after padding
    pub below_min_length: bool,
    /// A repair or continuation step was skipped for lack of time
    pub skipped_for_deadline: bool,
}

impl ValidationFlags {
    /// Number of the three content checks that pass.
    pub fn passed_checks(&self) -> u8 {
        self.token_mentioned as u8
            + self.includes_verifiable_detail as u8
            + (!self.ta_violation) as u8
    }
}

/// One publishable post.
///
/// # Examples
///
/// ```
/// use postforge_core::GenerationResult;
///
/// let result = GenerationResult::default();
/// let json = serde_json::to_value(&result).unwrap();
/// assert!(json.get("flags").is_some());
/// assert!(json["tags"].as_array().unwrap().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Title, at most 48 characters
    pub title: String,
    /// Body text
    pub text: String,
    /// Up to two hashtags without `#`
    pub tags: Vec<String>,
    /// Up to one uppercase ticker without `$`
    pub tickers: Vec<String>,
    /// Up to one mention without `@`
    pub mentions: Vec<String>,
    /// Verifiable detail the model cited
    pub verifiable_detail: Option<String>,
    /// Topic selected by rotation
    pub topic_used: Option<String>,
    /// Format label selected by rotation
    pub format_hint: Option<String>,
    /// Model that produced the final candidate
    pub model: String,
    /// Summed usage across every call made for this result
    pub usage: Usage,
    /// Compliance record
    pub flags: ValidationFlags,
}
