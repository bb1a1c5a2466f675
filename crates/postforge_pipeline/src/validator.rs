//! Content contract checks.

use crate::Draft;
use postforge_error::{ValidationError, ValidationErrorKind};
use regex::Regex;
use std::sync::LazyLock;

static DETAIL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Transaction hash fragments
        r"0x[0-9a-fA-F]{6,}",
        r"[0-9a-fA-F]{16,}",
        // Block heights
        r"(?i)(?:block|height|区块|高度)\s*[#:：]?\s*\d{4,}",
        r"#\d{6,}",
        // Dates and timestamps
        r"\d{4}-\d{2}-\d{2}(?:[ T]\d{2}:\d{2})?",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Valid detail regex"))
    .collect()
});

static TA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(?:K线|均线|支撑位|阻力位|目标价|抄底|金叉|死叉|布林带|突破阻力",
        r"|(?:^|[^A-Za-z0-9_])(?:macd|rsi|price target|support level|resistance level|to the moon|buy now)(?:$|[^A-Za-z0-9_])",
        r"|will reach \$)",
    ))
    .expect("Valid TA regex")
});

/// Regex matching `token` with ASCII word boundaries and an optional `$`.
///
/// CJK neighbours count as boundaries, so `聊聊BTC：` matches `BTC`.
pub fn token_pattern(token: &str) -> Regex {
    let pattern = format!(
        r"(?i)(?:^|[^A-Za-z0-9_])\$?{}(?:$|[^A-Za-z0-9_])",
        regex::escape(token)
    );
    Regex::new(&pattern).expect("Valid escaped token regex")
}

/// Outcome of the three content checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Token symbol present
    pub token_mentioned: bool,
    /// Hash, block height or timestamp present
    pub includes_verifiable_detail: bool,
    /// Forbidden TA or price language present
    pub ta_violation: bool,
}

impl ValidationReport {
    /// All checks pass.
    pub fn ok(&self) -> bool {
        self.token_mentioned && self.includes_verifiable_detail && !self.ta_violation
    }

    /// Number of passing checks, zero to three.
    pub fn passed(&self) -> u8 {
        self.token_mentioned as u8 + self.includes_verifiable_detail as u8 + (!self.ta_violation) as u8
    }

    /// Failing checks in a stable order.
    pub fn failures(&self) -> Vec<ValidationErrorKind> {
        let mut failures = Vec::new();
        if !self.token_mentioned {
            failures.push(ValidationErrorKind::TokenNotMentioned);
        }
        if !self.includes_verifiable_detail {
            failures.push(ValidationErrorKind::MissingVerifiableDetail);
        }
        if self.ta_violation {
            failures.push(ValidationErrorKind::TechnicalAnalysis);
        }
        failures
    }

    /// `Err` carrying the failures unless every check passed.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing failed checks.
    #[track_caller]
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.ok() {
            Ok(())
        } else {
            Err(ValidationError::new(self.failures()))
        }
    }
}

/// Checks a draft against the contract for one token symbol.
///
/// # Examples
///
/// ```
/// use postforge_pipeline::{Draft, OutputValidator};
///
/// let validator = OutputValidator::new("BTC");
/// let report = validator.validate(&Draft::unstructured("BTC rose to the moon, buy now!!"));
/// assert!(report.token_mentioned);
/// assert!(!report.includes_verifiable_detail);
/// assert!(report.ta_violation);
/// assert!(!report.ok());
/// ```
#[derive(Debug, Clone)]
pub struct OutputValidator {
    token: String,
    token_regex: Regex,
}

impl OutputValidator {
    /// Validator for `token`.
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let token_regex = token_pattern(&token);
        Self { token, token_regex }
    }

    /// Token symbol being checked.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// True when `text` mentions the token.
    pub fn mentions_token(&self, text: &str) -> bool {
        self.token_regex.is_match(text)
    }

    /// Run every check on the draft's title, body and ticker field.
    pub fn validate(&self, draft: &Draft) -> ValidationReport {
        let text = draft.merged_text();
        let in_tickers = draft.tickers.iter().any(|t| {
            t.trim()
                .trim_start_matches('$')
                .eq_ignore_ascii_case(&self.token)
        });

        ValidationReport {
            token_mentioned: in_tickers || self.mentions_token(&text),
            includes_verifiable_detail: has_verifiable_detail(&text),
            ta_violation: has_ta_language(&text),
        }
    }
}

/// True when `text` carries a hash fragment, block height or timestamp.
pub fn has_verifiable_detail(text: &str) -> bool {
    DETAIL_PATTERNS.iter().any(|re| re.is_match(text))
}

/// True when `text` uses forbidden TA or price-prediction language.
pub fn has_ta_language(text: &str) -> bool {
    TA_PATTERN.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_needs_word_boundaries() {
        let validator = OutputValidator::new("BTC");
        assert!(validator.mentions_token("$btc is up"));
        assert!(validator.mentions_token("聊聊BTC：手续费"));
        assert!(!validator.mentions_token("WBTC bridges"));
        assert!(!validator.mentions_token("BTCB"));
    }

    #[test]
    fn ticker_field_counts_as_mention() {
        let validator = OutputValidator::new("ETH");
        let draft = Draft {
            body: "Blob fees fell after block 19426587.".to_string(),
            tickers: vec!["$eth".to_string()],
            ..Draft::default()
        };
        let report = validator.validate(&draft);
        assert!(report.ok());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn detail_shapes() {
        assert!(has_verifiable_detail("tx 0xabc123ef"));
        assert!(has_verifiable_detail("区块高度：840000"));
        assert!(has_verifiable_detail("height #840000"));
        assert!(has_verifiable_detail("2024-04-20T00:09 UTC"));
        assert!(has_verifiable_detail("on 2024-04-20"));
        assert!(!has_verifiable_detail("block 12"));
        assert!(!has_verifiable_detail("0xabc"));
    }

    #[test]
    fn ta_terms() {
        assert!(has_ta_language("MACD 金叉"));
        assert!(has_ta_language("关注支撑位"));
        assert!(has_ta_language("it will reach $100k"));
        assert!(has_ta_language("RSI is hot"));
        assert!(!has_ta_language("versions and prices"));
        assert!(!has_ta_language("the first-price auction"));
    }

    #[test]
    fn failures_are_ordered() {
        let report = ValidationReport {
            token_mentioned: false,
            includes_verifiable_detail: false,
            ta_violation: true,
        };
        assert_eq!(report.passed(), 0);
        assert_eq!(
            report.failures(),
            vec![
                ValidationErrorKind::TokenNotMentioned,
                ValidationErrorKind::MissingVerifiableDetail,
                ValidationErrorKind::TechnicalAnalysis,
            ]
        );
    }
}
