//! Topic and format candidate pools used by rotation.

use serde::{Deserialize, Serialize};

/// A named presentation style and the instruction that asks for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct FormatHint {
    /// Stable label, used as the rotation counter key
    label: String,
    /// Prompt instruction describing the layout
    instruction: String,
}

impl FormatHint {
    /// Create a format hint.
    pub fn new(label: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instruction: instruction.into(),
        }
    }
}

/// Ordered topics and formats to rotate through.
///
/// Pool order matters: ties in usage are broken in favour of earlier entries.
///
/// # Examples
///
/// ```
/// use postforge_core::{CandidatePool, FormatHint};
///
/// let pool = CandidatePool::new(
///     vec!["fees".to_string(), "custody".to_string()],
///     vec![FormatHint::new("list", "Use a numbered list")],
/// );
/// assert_eq!(pool.topics().len(), 2);
/// assert!(!pool.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct CandidatePool {
    /// Topic strings
    topics: Vec<String>,
    /// Format hints
    formats: Vec<FormatHint>,
}

impl CandidatePool {
    /// Create a pool from topics and formats.
    pub fn new(topics: Vec<String>, formats: Vec<FormatHint>) -> Self {
        Self { topics, formats }
    }

    /// Replace the topics, keeping the formats.
    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    /// True when there is nothing to rotate.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty() && self.formats.is_empty()
    }

    /// Format labels in pool order.
    pub fn format_labels(&self) -> Vec<String> {
        self.formats.iter().map(|f| f.label.clone()).collect()
    }

    /// Look up a format by label.
    pub fn format(&self, label: &str) -> Option<&FormatHint> {
        self.formats.iter().find(|f| f.label == label)
    }
}
