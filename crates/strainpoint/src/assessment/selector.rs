use super::domain::{CriterionKey, CriterionResult, ScoringThresholds, WeakestLink};

/// Default cap on how many weakest links are carried forward.
pub const DEFAULT_LINK_LIMIT: usize = 5;

/// Rank results ascending by weighted score and keep the first `limit`.
///
/// The sort is stable, so ties keep their incoming order. Ranks start at 1.
pub fn select<K: CriterionKey>(
    results: impl IntoIterator<Item = CriterionResult<K>>,
    limit: usize,
) -> Vec<WeakestLink<K>> {
    let mut ranked: Vec<_> = results.into_iter().collect();
    ranked.sort_by(|a, b| a.weighted_score.total_cmp(&b.weighted_score));
    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, result)| WeakestLink {
            rank: index + 1,
            result,
        })
        .collect()
}

/// Picks the criteria worth probing after stage 1.
#[derive(Debug, Clone, Copy)]
pub struct WeakestLinkSelector {
    thresholds: ScoringThresholds,
    limit: usize,
}

impl WeakestLinkSelector {
    pub fn new(thresholds: ScoringThresholds, limit: usize) -> Self {
        Self { thresholds, limit }
    }

    /// Results above the weak-link floor never get a deep dive, however few remain.
    pub fn deep_dive_candidates<K: CriterionKey>(
        &self,
        results: &[CriterionResult<K>],
    ) -> Vec<WeakestLink<K>> {
        select(
            results
                .iter()
                .filter(|result| self.thresholds.is_deep_dive_candidate(result.raw_score))
                .cloned(),
            self.limit,
        )
    }
}
