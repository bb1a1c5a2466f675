//! Deletion-only text cleanup.
//!
//! One pass strips banned marketing phrases, caps emoji, drops repeated
//! sentences and squeezes whitespace. [`sanitize`] repeats the pass until
//! the text stops changing, which makes it idempotent.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Hype phrases removed wherever they occur. Matching is literal and
/// case-sensitive.
pub const BANNED_PHRASES: &[&str] = &[
    "稳赚不赔",
    "闭眼入",
    "赶紧上车",
    "财富密码",
    "百倍币",
    "千倍币",
    "错过再等一年",
    "暴富",
    "guaranteed returns",
    "Guaranteed returns",
    "100x gem",
    "don't miss out",
    "Don't miss out",
    "not financial advice but",
];

/// Emoji-presentation characters kept per text.
pub const MAX_EMOJI: usize = 2;

static EMOJI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Emoji_Presentation}").expect("Valid emoji regex"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("Valid blank line regex"));
static SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("Valid space run regex"));

const TERMINATORS: &[char] = &['。', '！', '？', '!', '?', '；', ';'];

/// Clean `text` to its fixed point.
///
/// # Examples
///
/// ```
/// use postforge_pipeline::sanitize;
///
/// let raw = "BTC 稳赚不赔！  区块 840000 已确认。区块 840000 已确认。🚀🚀🚀";
/// let clean = sanitize(raw);
/// assert_eq!(clean, "BTC ！ 区块 840000 已确认。🚀🚀");
/// assert_eq!(sanitize(&clean), clean);
/// ```
pub fn sanitize(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn sanitize_once(text: &str) -> String {
    let stripped = strip_banned(text);
    let capped = cap_emoji(&stripped, MAX_EMOJI);
    let deduped = dedupe_sentences(&capped);
    normalize_whitespace(&deduped)
}

fn strip_banned(text: &str) -> String {
    BANNED_PHRASES
        .iter()
        .fold(text.to_string(), |acc, phrase| acc.replace(phrase, ""))
}

/// Drop emoji past the first `limit`, left to right.
pub fn cap_emoji(text: &str, limit: usize) -> String {
    let mut seen = 0usize;
    EMOJI
        .replace_all(text, |caps: &regex::Captures<'_>| {
            seen += 1;
            if seen <= limit {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

fn dedupe_sentences(text: &str) -> String {
    let mut seen = HashSet::new();
    let mut out = String::with_capacity(text.len());
    for piece in split_sentences(text) {
        let key = piece.trim();
        if key.is_empty() || seen.insert(key.to_string()) {
            out.push_str(piece);
            continue;
        }
        // Keep the surrounding whitespace so neighbours stay separated.
        let lead = &piece[..piece.len() - piece.trim_start().len()];
        let trail = &piece[piece.trim_end().len()..];
        out.push_str(lead);
        out.push_str(trail);
    }
    out
}

fn normalize_whitespace(text: &str) -> String {
    let text = BLANK_LINES.replace_all(text, "\n\n");
    let text = SPACE_RUNS.replace_all(&text, " ");
    text.trim().to_string()
}

/// Split into pieces that concatenate back to `text`.
///
/// A piece ends after a run of sentence terminators or a newline. A period
/// only terminates when followed by whitespace or the end of the text, so
/// decimals and domains stay intact.
fn split_sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let next_char = |k: usize| chars.get(k + 1).map(|(_, c)| *c);

    let mut pieces = Vec::new();
    let mut start = 0usize;
    let mut k = 0usize;
    while k < chars.len() {
        let ch = chars[k].1;
        if ch == '\n' || is_terminator(ch, next_char(k)) {
            // Swallow the whole run, e.g. "!!" or "？！".
            if ch != '\n' {
                while k + 1 < chars.len() && is_terminator(chars[k + 1].1, next_char(k + 1)) {
                    k += 1;
                }
            }
            let end = chars.get(k + 1).map(|(i, _)| *i).unwrap_or(text.len());
            pieces.push(&text[start..end]);
            start = end;
        }
        k += 1;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn is_terminator(ch: char, next: Option<char>) -> bool {
    TERMINATORS.contains(&ch) || (ch == '.' && next.is_none_or(char::is_whitespace))
}

/// Sentences of `text`, trimmed, without empty entries.
pub(crate) fn sentences(text: &str) -> Vec<&str> {
    split_sentences(text)
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pieces_cover_the_text() {
        let text = "One. Two!! 三。四？\nfive 3.14 six";
        assert_eq!(split_sentences(text).concat(), text);
        assert_eq!(
            sentences(text),
            vec!["One.", "Two!!", "三。", "四？", "five 3.14 six"]
        );
    }

    #[test]
    fn emoji_cap_keeps_first_two_in_order() {
        assert_eq!(cap_emoji("a🚀b🔥c💎d🌕e✨", 2), "a🚀b🔥cde");
    }

    #[test]
    fn banned_phrases_are_case_sensitive() {
        assert_eq!(sanitize("this is a 100X GEM"), "this is a 100X GEM");
        assert_eq!(sanitize("this is a 100x gem"), "this is a");
    }

    #[test]
    fn repeated_sentences_are_dropped() {
        assert_eq!(sanitize("A。B。A。C"), "A。B。C");
        assert_eq!(sanitize("Fees fell. Fees fell. Blocks filled."), "Fees fell. Blocks filled.");
    }

    #[test]
    fn whitespace_is_squeezed() {
        assert_eq!(sanitize("  a  b\n\n\n\nc  "), "a b\n\nc");
    }

    #[test]
    fn idempotent_on_mixed_input() {
        let inputs = [
            "赶紧上车！赶紧上车！ BTC 🚀🚀🚀 区块 840000。",
            "x.  x.  x.\n\n\n\ny",
            "闭眼闭眼入入",
            "",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }
}
