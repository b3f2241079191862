//! Deterministic ranking of composite scores

use std::cmp::Ordering;

use strengthscan_types::{CompositeScore, RankEntry};

/// Rank composites strongest first.
///
/// Ties are broken by ascending asset id, so the output depends only on the
/// set of composites and never on input order.
pub fn rank(composites: &[CompositeScore]) -> Vec<RankEntry> {
    let mut ordered: Vec<&CompositeScore> = composites.iter().collect();
    ordered.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.asset.cmp(&b.asset))
    });

    let n = ordered.len();
    ordered
        .into_iter()
        .enumerate()
        .map(|(index, composite)| {
            let rank = index + 1;
            let percentile = if n > 1 {
                (n - rank) as f64 / (n - 1) as f64
            } else {
                1.0
            };
            RankEntry {
                asset: composite.asset.clone(),
                composite_score: composite.value,
                rank,
                percentile,
            }
        })
        .collect()
}
