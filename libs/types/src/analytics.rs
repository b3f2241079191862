//! Strength scores, composites and ranking entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::identifiers::AssetId;
use crate::market_data::Timeframe;

/// Asset return minus benchmark return over one timeframe's lookback window.
/// Expressed as a fraction: `0.05` means five percentage points of outperformance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthScore {
    pub asset: AssetId,
    pub timeframe: Timeframe,
    pub value: f64,
    pub computed_at: DateTime<Utc>,
    /// Either input series had flagged gaps
    #[serde(default)]
    pub incomplete: bool,
}

/// Weighted aggregate of per-timeframe strength for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub asset: AssetId,
    pub value: f64,
    /// Timeframes that contributed to `value`
    pub contributing_timeframes: BTreeMap<Timeframe, StrengthScore>,
    /// Renormalized weights actually applied; sums to 1.0
    pub effective_weights: BTreeMap<Timeframe, f64>,
    /// Configured timeframes left out because they were missing or incomplete
    #[serde(default)]
    pub excluded_timeframes: Vec<Timeframe>,
    /// True when any configured timeframe was excluded
    #[serde(default)]
    pub incomplete: bool,
    pub computed_at: DateTime<Utc>,
}

impl CompositeScore {
    /// Per-timeframe strength value, if that timeframe contributed
    pub fn score_for(&self, timeframe: Timeframe) -> Option<f64> {
        self.contributing_timeframes
            .get(&timeframe)
            .map(|score| score.value)
    }
}

/// A single-timeframe strength reading above its configured alert threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthFlag {
    pub asset: AssetId,
    pub timeframe: Timeframe,
    pub value: f64,
    pub threshold: f64,
}

impl StrengthFlag {
    /// Flag label such as `STRONG_VS_BTC_1H`
    pub fn label(&self, benchmark: &AssetId) -> String {
        format!(
            "STRONG_VS_{}_{}",
            benchmark,
            self.timeframe.label().to_ascii_uppercase()
        )
    }
}

/// Position of one asset in the cycle's ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub asset: AssetId,
    pub composite_score: f64,
    /// 1 = strongest
    pub rank: usize,
    /// (N - rank) / (N - 1), 1.0 for a single-asset universe
    pub percentile: f64,
}
