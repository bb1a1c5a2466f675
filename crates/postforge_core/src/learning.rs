//! Per-token rotation counters and recent-title memory.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, VecDeque};

/// Default bound on remembered title fingerprints.
pub const DEFAULT_TITLE_HISTORY: usize = 48;

/// Deterministic fingerprint of a title.
///
/// Whitespace runs collapse to one space, the result is trimmed and
/// lower-cased, and the first 16 hex digits of its SHA-256 are kept.
///
/// # Examples
///
/// ```
/// use postforge_core::title_fingerprint;
///
/// let a = title_fingerprint("BTC  Fee Market");
/// let b = title_fingerprint(" btc fee\tmarket ");
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 16);
/// ```
pub fn title_fingerprint(title: &str) -> String {
    let normalized = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    digest
        .iter()
        .take(8)
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Rotation memory for one token symbol.
///
/// Counts only ever grow. Missing fields default so older blobs still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningState {
    /// Topic label to usage count
    #[serde(default)]
    pub topic_stats: BTreeMap<String, u64>,
    /// Format label to usage count
    #[serde(default)]
    pub format_stats: BTreeMap<String, u64>,
    /// Round-robin position in the topic pool
    #[serde(default)]
    pub topic_cursor: u64,
    /// Round-robin position in the format pool
    #[serde(default)]
    pub format_cursor: u64,
    /// Oldest-first title fingerprints
    #[serde(default)]
    pub recent_titles: VecDeque<String>,
}

impl LearningState {
    /// True when the fingerprint is remembered.
    pub fn has_fingerprint(&self, fingerprint: &str) -> bool {
        self.recent_titles.iter().any(|f| f == fingerprint)
    }

    /// Append a fingerprint, evicting the oldest entries past `bound`.
    ///
    /// # Examples
    ///
    /// ```
    /// use postforge_core::LearningState;
    ///
    /// let mut state = LearningState::default();
    /// for i in 0..5 {
    ///     state.record_fingerprint(format!("fp{}", i), 3);
    /// }
    /// assert_eq!(state.recent_titles.len(), 3);
    /// assert_eq!(state.recent_titles.front().map(String::as_str), Some("fp2"));
    /// ```
    pub fn record_fingerprint(&mut self, fingerprint: String, bound: usize) {
        self.recent_titles.push_back(fingerprint);
        while self.recent_titles.len() > bound {
            self.recent_titles.pop_front();
        }
    }

    /// Usage count for a topic.
    pub fn topic_usage(&self, topic: &str) -> u64 {
        self.topic_stats.get(topic).copied().unwrap_or(0)
    }

    /// Usage count for a format.
    pub fn format_usage(&self, label: &str) -> u64 {
        self.format_stats.get(label).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_hex_prefix_of_sha256() {
        let fp = title_fingerprint("abc");
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(fp, "ba7816bf8f01cfea");
    }

    #[test]
    fn fingerprint_ignores_case_and_spacing() {
        assert_eq!(
            title_fingerprint("聊聊BTC：  手续费"),
            title_fingerprint("聊聊btc： 手续费")
        );
        assert_ne!(title_fingerprint("a b"), title_fingerprint("ab"));
    }

    #[test]
    fn older_blobs_load_with_defaults() {
        let state: LearningState =
            serde_json::from_str(r#"{"topic_stats":{"fees":3}}"#).unwrap();
        assert_eq!(state.topic_usage("fees"), 3);
        assert_eq!(state.format_cursor, 0);
        assert!(state.recent_titles.is_empty());
    }

    #[test]
    fn ring_never_exceeds_bound() {
        let mut state = LearningState::default();
        for i in 0..100 {
            state.record_fingerprint(i.to_string(), DEFAULT_TITLE_HISTORY);
            assert!(state.recent_titles.len() <= DEFAULT_TITLE_HISTORY);
        }
        assert!(state.has_fingerprint("99"));
        assert!(!state.has_fingerprint("0"));
    }
}
