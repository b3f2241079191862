//! Pair confidence scoring
//!
//! Confidence is a weighted mean of three normalized components (gap size,
//! rank distance, timeframe agreement), scaled by a penalty when either leg was
//! built from incomplete data and clamped to [0, 1]. With non-negative weights
//! it is monotone non-decreasing in every component.

use strengthscan_config::ConfidenceWeights;
use strengthscan_types::{CompositeScore, Timeframe};

/// Normalized inputs to [`confidence`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInputs {
    pub normalized_gap: f64,
    pub normalized_rank_distance: f64,
    pub timeframe_agreement: f64,
    pub incomplete_input: bool,
}

/// `min(gap / gap_scale, 1)`, floored at zero
pub fn normalized_gap(gap: f64, gap_scale: f64) -> f64 {
    if gap_scale <= 0.0 {
        return 0.0;
    }
    (gap / gap_scale).clamp(0.0, 1.0)
}

/// `rank_distance / (N - 1)`; zero when fewer than two assets are ranked
pub fn normalized_rank_distance(rank_distance: usize, ranked: usize) -> f64 {
    if ranked < 2 {
        return 0.0;
    }
    (rank_distance as f64 / (ranked - 1) as f64).clamp(0.0, 1.0)
}

/// Fraction of `timeframes` where the strong leg's score strictly beats the weak
/// leg's. A timeframe missing from either composite counts as disagreement.
pub fn timeframe_agreement(
    strong: &CompositeScore,
    weak: &CompositeScore,
    timeframes: &[Timeframe],
) -> f64 {
    if timeframes.is_empty() {
        return 0.0;
    }
    let agreeing = timeframes
        .iter()
        .filter(|tf| match (strong.score_for(**tf), weak.score_for(**tf)) {
            (Some(s), Some(w)) => s > w,
            _ => false,
        })
        .count();
    agreeing as f64 / timeframes.len() as f64
}

pub fn confidence(inputs: &ConfidenceInputs, weights: &ConfidenceWeights) -> f64 {
    let total = weights.gap_weight + weights.rank_weight + weights.agreement_weight;
    if total <= 0.0 {
        return 0.0;
    }
    let blended = (weights.gap_weight * inputs.normalized_gap
        + weights.rank_weight * inputs.normalized_rank_distance
        + weights.agreement_weight * inputs.timeframe_agreement)
        / total;
    let penalty = if inputs.incomplete_input {
        weights.incomplete_penalty
    } else {
        1.0
    };
    (penalty * blended).clamp(0.0, 1.0)
}
