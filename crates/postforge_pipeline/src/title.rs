//! Title derivation and de-duplication.

use crate::sanitizer::sentences;
use crate::validator::token_pattern;
use crate::{Chooser, choose};
use postforge_core::{LearningState, title_fingerprint};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// Hard bound on title length in characters.
pub const TITLE_MAX_CHARS: usize = 48;

/// Characters taken from the first line when the body has no sentence.
pub const FALLBACK_PREFIX_CHARS: usize = 24;

/// Label templates applied to derived titles that lack the token.
pub const TITLE_TEMPLATES: &[&str] = &[
    "{token}：{fragment}",
    "{token}观察｜{fragment}",
    "{token} | {fragment}",
    "聊聊{token}：{fragment}",
];

/// Suffixes appended when a title was used recently.
pub const COLLISION_TWEAKS: &[&str] = &["·续", "（二）", "·再看", "·速记"];

const MARKUP: &[char] = &['#', '*', '$', '@', '>'];
const CLAUSE_PUNCTUATION: &[char] = &[
    '。', '！', '？', '!', '?', '.', '；', ';', '，', ',', '：', ':', '、', '|', '｜',
];
const SENTENCE_END: &[char] = &['。', '！', '？', '!', '?', '.', '；', ';'];

/// Builds a bounded, recently-unused title.
#[derive(Debug, Clone)]
pub struct TitleSynthesizer {
    token: String,
    token_regex: Regex,
    chooser: Arc<dyn Chooser>,
    history: usize,
}

impl TitleSynthesizer {
    /// Synthesizer for `token`, remembering `history` fingerprints.
    pub fn new(token: impl Into<String>, chooser: Arc<dyn Chooser>, history: usize) -> Self {
        let token = token.into();
        Self {
            token_regex: token_pattern(&token),
            token,
            chooser,
            history,
        }
    }

    /// Produce the final title and record its fingerprint in `state`.
    ///
    /// A non-blank `explicit` title is kept, whitespace-normalized and cut
    /// to [`TITLE_MAX_CHARS`]. Otherwise a fragment is derived from `body`,
    /// preferring the sentence naming the token, then the sentence containing
    /// `keyword`, then the first sentence, then the start of the first line.
    ///
    /// # Examples
    ///
    /// ```
    /// use postforge_core::LearningState;
    /// use postforge_pipeline::{FixedChooser, TitleSynthesizer};
    /// use std::sync::Arc;
    ///
    /// let titles = TitleSynthesizer::new("BTC", Arc::new(FixedChooser(0)), 48);
    /// let mut state = LearningState::default();
    ///
    /// let title = titles.synthesize("", "手续费在区块 840000 后回落。其他内容。", None, &mut state);
    /// assert_eq!(title, "BTC：手续费在区块 840000 后回落");
    /// assert_eq!(state.recent_titles.len(), 1);
    /// ```
    pub fn synthesize(
        &self,
        explicit: &str,
        body: &str,
        keyword: Option<&str>,
        state: &mut LearningState,
    ) -> String {
        let base = self.base_title(explicit, body, keyword);
        let title = self.deduplicate(base, state);
        state.record_fingerprint(title_fingerprint(&title), self.history);
        title
    }

    fn base_title(&self, explicit: &str, body: &str, keyword: Option<&str>) -> String {
        let explicit = collapse_whitespace(explicit);
        if !explicit.is_empty() {
            return take_chars(&explicit, TITLE_MAX_CHARS);
        }

        let fragment = strip_markup(&self.derive_fragment(body, keyword));
        if fragment.is_empty() {
            return take_chars(&self.token, TITLE_MAX_CHARS);
        }
        if self.token_regex.is_match(&fragment) {
            return fit_fragment(&fragment, TITLE_MAX_CHARS);
        }

        let template = choose(self.chooser.as_ref(), TITLE_TEMPLATES)
            .copied()
            .unwrap_or("{token}：{fragment}")
            .replace("{token}", &self.token);
        let overhead = template.replace("{fragment}", "").chars().count();
        let fitted = fit_fragment(&fragment, TITLE_MAX_CHARS.saturating_sub(overhead));
        take_chars(&template.replace("{fragment}", &fitted), TITLE_MAX_CHARS)
    }

    fn derive_fragment(&self, body: &str, keyword: Option<&str>) -> String {
        let pieces = sentences(body);

        let by_token = pieces.iter().find(|s| self.token_regex.is_match(s));
        let by_keyword = || {
            let keyword = keyword.map(str::trim).filter(|k| !k.is_empty())?.to_lowercase();
            pieces.iter().find(|s| s.to_lowercase().contains(&keyword))
        };
        let first_sentence = || pieces.iter().find(|s| s.ends_with(SENTENCE_END));

        if let Some(sentence) = by_token.or_else(by_keyword).or_else(first_sentence) {
            return sentence.to_string();
        }
        body.lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(|l| take_chars(l, FALLBACK_PREFIX_CHARS))
            .unwrap_or_default()
    }

    fn deduplicate(&self, title: String, state: &LearningState) -> String {
        if !state.has_fingerprint(&title_fingerprint(&title)) {
            return title;
        }

        let start = self.chooser.pick(COLLISION_TWEAKS.len());
        let mut candidate = title.clone();
        for k in 0..COLLISION_TWEAKS.len() {
            let tweak = COLLISION_TWEAKS[(start + k) % COLLISION_TWEAKS.len()];
            let room = TITLE_MAX_CHARS - tweak.chars().count();
            candidate = format!("{}{}", take_chars(&title, room).trim_end(), tweak);
            if !state.has_fingerprint(&title_fingerprint(&candidate)) {
                break;
            }
        }
        debug!(title = %title, tweaked = %candidate, "Recent title collision");
        candidate
    }
}

/// Cut `fragment` to `width`, preferring a clause boundary that keeps at
/// least 60% of the width, and drop trailing punctuation.
fn fit_fragment(fragment: &str, width: usize) -> String {
    let fragment = trim_trailing_punctuation(fragment);
    if fragment.chars().count() <= width {
        return fragment.to_string();
    }

    let window: Vec<char> = fragment.chars().take(width).collect();
    let min_keep = (width * 6).div_ceil(10);
    let cut = window
        .iter()
        .enumerate()
        .rev()
        .find(|&(i, &c)| CLAUSE_PUNCTUATION.contains(&c) && i >= min_keep)
        .map(|(i, _)| i)
        .unwrap_or(window.len());

    let kept: String = window[..cut].iter().collect();
    trim_trailing_punctuation(&kept).to_string()
}

fn trim_trailing_punctuation(text: &str) -> &str {
    text.trim_end_matches(|c: char| c.is_whitespace() || CLAUSE_PUNCTUATION.contains(&c))
}

/// Remove markdown and sigil characters. A hyphen survives only between
/// two ASCII alphanumerics, so dates and compound words stay readable.
fn strip_markup(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut kept = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if MARKUP.contains(&c) {
            continue;
        }
        if c == '-' {
            let before = i.checked_sub(1).and_then(|j| chars.get(j));
            let after = chars.get(i + 1);
            let joins = matches!(
                (before, after),
                (Some(b), Some(a)) if b.is_ascii_alphanumeric() && a.is_ascii_alphanumeric()
            );
            if !joins {
                continue;
            }
        }
        kept.push(c);
    }
    collapse_whitespace(&kept)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn take_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}
