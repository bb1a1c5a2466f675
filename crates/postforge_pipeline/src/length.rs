//! Body length enforcement.
//!
//! Lengths are counted in Unicode scalar values. Continuation calls are the
//! pipeline's job; this module only pads and truncates.
//!
//! Each filler sentence is used at most once per body, so a padded body is
//! still free of repeated sentences. When the fillers run out first the body
//! stays below the band and [`FitOutcome::short`] says so.

use crate::sanitizer::sentences;
use postforge_core::LengthBand;
use std::collections::HashSet;

/// Characters padding may run past the band maximum when finishing its last
/// filler sentence.
pub const PAD_OVERFLOW_TOLERANCE: usize = 16;

const ZH_FILLERS: &[&str] = &[
    "以上信息均可在链上自行核验。",
    "具体数据以区块浏览器为准。",
    "相关细节仍在持续更新中。",
    "更多背景可参考官方文档。",
    "这一变化值得长期观察。",
    "不同来源的统计口径可能略有差异。",
    "社区对此仍有不同看法。",
    "本文仅作信息整理，不构成任何建议。",
    "后续进展值得继续跟踪。",
    "欢迎对照原始数据交叉验证。",
];

const EN_FILLERS: &[&str] = &[
    "Every figure above can be checked on-chain.",
    "Block explorers remain the source of truth.",
    "Details may change as more data arrives.",
    "The official docs give more background.",
    "This is worth watching over time.",
    "Sources may count things slightly differently.",
    "The community is still debating it.",
    "This is a summary, not advice.",
    "Further updates are worth following.",
    "Cross-check against the raw data.",
];

const TERMINATORS: &[char] = &['。', '！', '？', '!', '?', '.', '；', ';'];

/// Result of fitting a body into its band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitOutcome {
    /// Fitted body
    pub text: String,
    /// Filler sentences were appended
    pub padded: bool,
    /// Text was cut
    pub truncated: bool,
    /// Text is still below the band minimum
    pub short: bool,
}

/// Pads or truncates a body into a [`LengthBand`].
///
/// # Examples
///
/// ```
/// use postforge_core::LengthBand;
/// use postforge_pipeline::{LengthFitter, PAD_OVERFLOW_TOLERANCE};
///
/// let fitter = LengthFitter::new(LengthBand::new(140, 280), "zh");
/// let fitted = fitter.fit("BTC 在区块 840000 完成第四次减半。");
/// let len = fitted.text.chars().count();
/// assert!(fitted.padded);
/// assert!(!fitted.short);
/// assert!(len >= 140 && len <= 280 + PAD_OVERFLOW_TOLERANCE);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthFitter {
    band: LengthBand,
    chinese: bool,
}

impl LengthFitter {
    /// Fitter for `band`, padding in `language`.
    pub fn new(band: LengthBand, language: &str) -> Self {
        Self {
            band,
            chinese: language.to_ascii_lowercase().starts_with("zh"),
        }
    }

    /// Target band.
    pub fn band(&self) -> LengthBand {
        self.band
    }

    /// True when `text` is below the band minimum.
    pub fn is_short(&self, text: &str) -> bool {
        text.chars().count() < self.band.min()
    }

    /// Pad or truncate `text` into the band.
    pub fn fit(&self, text: &str) -> FitOutcome {
        let mut out = FitOutcome {
            text: text.to_string(),
            padded: false,
            truncated: false,
            short: false,
        };

        if self.is_short(&out.text) {
            out.text = self.pad(&out.text);
            out.padded = true;
        }

        let limit = if out.padded {
            self.band.max() + PAD_OVERFLOW_TOLERANCE
        } else {
            self.band.max()
        };
        if out.text.chars().count() > limit {
            out.text = self.truncate(&out.text);
            out.truncated = true;
        }
        out.short = self.is_short(&out.text);
        out
    }

    fn pad(&self, text: &str) -> String {
        let fillers = if self.chinese { ZH_FILLERS } else { EN_FILLERS };
        let mut padded = text.trim_end().to_string();
        let mut len = padded.chars().count();
        let present: HashSet<&str> = sentences(text).into_iter().collect();

        for filler in fillers.iter().filter(|f| !present.contains(*f)) {
            if len >= self.band.min() {
                break;
            }
            if !self.chinese && !padded.is_empty() {
                padded.push(' ');
                len += 1;
            }
            padded.push_str(filler);
            len += filler.chars().count();
        }
        padded
    }

    /// Cut at the last terminator inside the maximum whose prefix still
    /// reaches the minimum, else hard-cut at the maximum.
    fn truncate(&self, text: &str) -> String {
        let window: Vec<char> = text.chars().take(self.band.max()).collect();
        let cut = window
            .iter()
            .enumerate()
            .rev()
            .find(|&(i, &c)| TERMINATORS.contains(&c) && i + 1 >= self.band.min())
            .map(|(i, _)| i + 1);

        match cut {
            Some(end) => window[..end].iter().collect(),
            None => {
                let hard: String = window.into_iter().collect();
                let trimmed = hard.trim_end();
                if trimmed.chars().count() >= self.band.min() {
                    trimmed.to_string()
                } else {
                    hard
                }
            }
        }
    }
}
