//! Topic and format rotation over persisted usage counters.

use postforge_core::{CandidatePool, FormatHint, LearningState};
use postforge_rate_limit::RotationPolicy;
use std::collections::BTreeMap;

/// Picks the next pool entry and bumps its usage count.
///
/// # Examples
///
/// ```
/// use postforge_pipeline::RotationSelector;
/// use postforge_rate_limit::RotationPolicy;
/// use std::collections::BTreeMap;
///
/// let pool: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
/// let mut stats = BTreeMap::from([("A".to_string(), 2), ("C".to_string(), 1)]);
/// let mut cursor = 0;
///
/// let selector = RotationSelector::new(RotationPolicy::LeastUsed);
/// assert_eq!(selector.select(&pool, &mut stats, &mut cursor).as_deref(), Some("B"));
/// assert_eq!(stats["B"], 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationSelector {
    policy: RotationPolicy,
}

impl RotationSelector {
    /// Selector using `policy`.
    pub fn new(policy: RotationPolicy) -> Self {
        Self { policy }
    }

    /// Active policy.
    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Next entry of `pool`, `None` when the pool is empty.
    ///
    /// Least-used takes the smallest count with ties going to the earlier
    /// entry. Round-robin takes `cursor % len` and advances the cursor. Both
    /// increment the chosen entry's count.
    pub fn select(
        &self,
        pool: &[String],
        stats: &mut BTreeMap<String, u64>,
        cursor: &mut u64,
    ) -> Option<String> {
        if pool.is_empty() {
            return None;
        }

        let index = match self.policy {
            RotationPolicy::LeastUsed => pool
                .iter()
                .enumerate()
                .min_by_key(|(_, entry)| stats.get(*entry).copied().unwrap_or(0))
                .map(|(i, _)| i)?,
            RotationPolicy::RoundRobin => {
                let i = (*cursor % pool.len() as u64) as usize;
                *cursor = cursor.wrapping_add(1);
                i
            }
        };

        let chosen = pool.get(index)?.clone();
        *stats.entry(chosen.clone()).or_insert(0) += 1;
        Some(chosen)
    }

    /// Pick a topic and a format from `pool`, recording both in `state`.
    pub fn rotate<'p>(
        &self,
        pool: &'p CandidatePool,
        state: &mut LearningState,
    ) -> (Option<String>, Option<&'p FormatHint>) {
        let topic = self.select(pool.topics(), &mut state.topic_stats, &mut state.topic_cursor);
        let format = self
            .select(
                &pool.format_labels(),
                &mut state.format_stats,
                &mut state.format_cursor,
            )
            .and_then(|label| pool.format(&label));
        tracing::debug!(
            policy = %self.policy,
            topic = topic.as_deref().unwrap_or("-"),
            format = format.map(|f| f.label().as_str()).unwrap_or("-"),
            "Rotated candidates"
        );
        (topic, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<String> {
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    }

    #[test]
    fn least_used_spreads_evenly() {
        let selector = RotationSelector::new(RotationPolicy::LeastUsed);
        let mut stats = BTreeMap::new();
        let mut cursor = 0;
        let picks: Vec<_> = (0..6)
            .filter_map(|_| selector.select(&pool(), &mut stats, &mut cursor))
            .collect();
        assert_eq!(picks, vec!["A", "B", "C", "A", "B", "C"]);
        assert_eq!(cursor, 0);
    }

    #[test]
    fn least_used_picks_lowest_count() {
        let selector = RotationSelector::new(RotationPolicy::LeastUsed);
        let mut stats = BTreeMap::from([
            ("A".to_string(), 2),
            ("B".to_string(), 0),
            ("C".to_string(), 1),
        ]);
        let mut cursor = 0;
        assert_eq!(selector.select(&pool(), &mut stats, &mut cursor).as_deref(), Some("B"));
        assert_eq!(stats["B"], 1);
    }

    #[test]
    fn round_robin_ignores_counts() {
        let selector = RotationSelector::new(RotationPolicy::RoundRobin);
        let mut stats = BTreeMap::from([("A".to_string(), 0), ("B".to_string(), 9)]);
        let mut cursor = 1;
        assert_eq!(selector.select(&pool(), &mut stats, &mut cursor).as_deref(), Some("B"));
        assert_eq!(selector.select(&pool(), &mut stats, &mut cursor).as_deref(), Some("C"));
        assert_eq!(selector.select(&pool(), &mut stats, &mut cursor).as_deref(), Some("A"));
        assert_eq!(cursor, 4);
        assert_eq!(stats["B"], 10);
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let selector = RotationSelector::default();
        let mut stats = BTreeMap::new();
        let mut cursor = 0;
        assert!(selector.select(&[], &mut stats, &mut cursor).is_none());
        assert!(stats.is_empty());
    }

    #[test]
    fn rotate_records_both_counters() {
        let pool = CandidatePool::new(
            pool(),
            vec![FormatHint::new("list", "numbered list"), FormatHint::new("qa", "Q&A")],
        );
        let mut state = LearningState::default();
        let selector = RotationSelector::default();
        let (topic, format) = selector.rotate(&pool, &mut state);
        assert_eq!(topic.as_deref(), Some("A"));
        assert_eq!(format.map(|f| f.label().as_str()), Some("list"));
        assert_eq!(state.topic_usage("A"), 1);
        assert_eq!(state.format_usage("list"), 1);
    }
}
