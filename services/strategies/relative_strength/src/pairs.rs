//! Pair discovery
//!
//! **Purpose**: Turn a cycle's ranking into strong/weak pair opportunities with
//! a classification and a confidence estimate.
//!
//! **Integration Points**:
//! - Consumes the ranking from [`crate::ranker`] and the composites it was built from
//! - Reads the previous cycle's gaps through [`GapHistory`]; the cycle runner
//!   rebuilds that history from the last published snapshot
//! - Hands qualifying pairs to [`crate::emitter`]
//!
//! **Direction**: only pairs where the strong leg ranks strictly better than the
//! weak leg are evaluated, so (A, B) and (B, A) can never both appear.
//!
//! **Recorded gaps**: every evaluated pair's gap is recorded, qualifying or not,
//! so the next cycle can tell whether a gap widened.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use strengthscan_config::{ConfidenceWeights, EngineSettings};
use strengthscan_types::{
    AssetId, CompositeScore, OpportunityType, PairOpportunity, RankEntry, SupportingMetrics,
    Timeframe,
};

use crate::confidence::{
    confidence, normalized_gap, normalized_rank_distance, timeframe_agreement, ConfidenceInputs,
};

/// One pair's gap as stored in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedGap {
    pub strong: AssetId,
    pub weak: AssetId,
    pub gap: f64,
}

/// Gaps keyed by (strong, weak)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapHistory {
    gaps: BTreeMap<(AssetId, AssetId), f64>,
}

impl GapHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_recorded(recorded: &[RecordedGap]) -> Self {
        let gaps = recorded
            .iter()
            .map(|entry| ((entry.strong.clone(), entry.weak.clone()), entry.gap))
            .collect();
        Self { gaps }
    }

    pub fn record(&mut self, strong: &AssetId, weak: &AssetId, gap: f64) {
        self.gaps.insert((strong.clone(), weak.clone()), gap);
    }

    pub fn get(&self, strong: &AssetId, weak: &AssetId) -> Option<f64> {
        self.gaps.get(&(strong.clone(), weak.clone())).copied()
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn to_recorded(&self) -> Vec<RecordedGap> {
        self.gaps
            .iter()
            .map(|((strong, weak), gap)| RecordedGap {
                strong: strong.clone(),
                weak: weak.clone(),
                gap: *gap,
            })
            .collect()
    }
}

/// Output of one discovery pass
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutcome {
    /// Qualifying pairs, confidence descending
    pub pairs: Vec<PairOpportunity>,
    /// Gap of every evaluated pair
    pub recorded: GapHistory,
}

/// Sign of a nonzero score; `None` for zero or missing
fn sign(value: Option<f64>) -> Option<bool> {
    match value {
        Some(v) if v > 0.0 => Some(true),
        Some(v) if v < 0.0 => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct PairDiscovery {
    min_gap: f64,
    min_confidence: f64,
    short_timeframe: Timeframe,
    long_timeframe: Timeframe,
    timeframes: Vec<Timeframe>,
    weights: ConfidenceWeights,
}

impl PairDiscovery {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            min_gap: settings.min_gap,
            min_confidence: settings.min_confidence,
            short_timeframe: settings.short_timeframe,
            long_timeframe: settings.long_timeframe,
            timeframes: settings.timeframe_set(),
            weights: settings.confidence.clone(),
        }
    }

    /// Short and long leg of one composite agree (`Some(true)`), oppose
    /// (`Some(false)`), or cannot be compared (`None`)
    fn trend_alignment(&self, composite: &CompositeScore) -> Option<bool> {
        let short = sign(composite.score_for(self.short_timeframe))?;
        let long = sign(composite.score_for(self.long_timeframe))?;
        Some(short == long)
    }

    pub fn classify(
        &self,
        strong: &CompositeScore,
        weak: &CompositeScore,
        gap: f64,
        prior_gap: Option<f64>,
    ) -> OpportunityType {
        match (self.trend_alignment(strong), self.trend_alignment(weak)) {
            (Some(false), Some(false)) => OpportunityType::MeanReversion,
            (Some(true), Some(true)) if prior_gap.is_some_and(|prior| gap > prior) => {
                OpportunityType::Breakout
            }
            _ => OpportunityType::Divergence,
        }
    }

    pub fn discover(
        &self,
        ranking: &[RankEntry],
        composites: &BTreeMap<AssetId, CompositeScore>,
        prior: &GapHistory,
    ) -> DiscoveryOutcome {
        let mut outcome = DiscoveryOutcome::default();
        let ranked = ranking.len();

        for (i, strong_entry) in ranking.iter().enumerate() {
            for weak_entry in &ranking[i + 1..] {
                if weak_entry.rank <= strong_entry.rank {
                    continue;
                }
                let (Some(strong), Some(weak)) = (
                    composites.get(&strong_entry.asset),
                    composites.get(&weak_entry.asset),
                ) else {
                    continue;
                };

                let gap = strong.value - weak.value;
                outcome
                    .recorded
                    .record(&strong.asset, &weak.asset, gap);
                if gap <= self.min_gap {
                    continue;
                }

                let rank_distance = weak_entry.rank - strong_entry.rank;
                let inputs = ConfidenceInputs {
                    normalized_gap: normalized_gap(gap, self.weights.gap_scale),
                    normalized_rank_distance: normalized_rank_distance(rank_distance, ranked),
                    timeframe_agreement: timeframe_agreement(strong, weak, &self.timeframes),
                    incomplete_input: strong.incomplete || weak.incomplete,
                };
                let confidence = confidence(&inputs, &self.weights);
                if confidence <= self.min_confidence {
                    continue;
                }

                let prior_gap = prior.get(&strong.asset, &weak.asset);
                outcome.pairs.push(PairOpportunity {
                    strong_asset: strong.asset.clone(),
                    weak_asset: weak.asset.clone(),
                    strong_rank: strong_entry.rank,
                    weak_rank: weak_entry.rank,
                    opportunity_type: self.classify(strong, weak, gap, prior_gap),
                    confidence,
                    supporting_metrics: SupportingMetrics {
                        gap,
                        prior_gap,
                        rank_distance,
                        normalized_gap: inputs.normalized_gap,
                        normalized_rank_distance: inputs.normalized_rank_distance,
                        timeframe_agreement: inputs.timeframe_agreement,
                        incomplete_input: inputs.incomplete_input,
                    },
                });
            }
        }

        sort_by_confidence(&mut outcome.pairs);
        outcome
    }
}

/// Confidence descending, then (strong, weak) ascending
pub fn sort_by_confidence(pairs: &mut [PairOpportunity]) {
    pairs.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.strong_asset.cmp(&b.strong_asset))
            .then_with(|| a.weak_asset.cmp(&b.weak_asset))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use strengthscan_config::EngineConfig;
    use strengthscan_types::StrengthScore;

    use crate::ranker::rank;

    fn id(symbol: &str) -> AssetId {
        AssetId::new(symbol).unwrap()
    }

    fn composite(symbol: &str, short: f64, long: f64) -> CompositeScore {
        let computed_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let score = |timeframe, value| StrengthScore {
            asset: id(symbol),
            timeframe,
            value,
            computed_at,
            incomplete: false,
        };
        CompositeScore {
            asset: id(symbol),
            value: (short + long) / 2.0,
            contributing_timeframes: BTreeMap::from([
                (Timeframe::H1, score(Timeframe::H1, short)),
                (Timeframe::D1, score(Timeframe::D1, long)),
            ]),
            effective_weights: BTreeMap::from([(Timeframe::H1, 0.5), (Timeframe::D1, 0.5)]),
            excluded_timeframes: Vec::new(),
            incomplete: false,
            computed_at,
        }
    }

    fn discovery() -> PairDiscovery {
        let config = EngineConfig::from_toml_str(
            r#"
            [universe]
            assets = ["BTC", "ETH", "XRP", "SOL"]
            benchmark = "BTC"

            [[timeframes]]
            timeframe = "1h"
            weight = 0.5
            lookback_bars = 2

            [[timeframes]]
            timeframe = "1d"
            weight = 0.5
            lookback_bars = 2
            "#,
        )
        .unwrap();
        PairDiscovery::new(&config.validate().unwrap())
    }

    fn by_asset(composites: Vec<CompositeScore>) -> BTreeMap<AssetId, CompositeScore> {
        composites.into_iter().map(|c| (c.asset.clone(), c)).collect()
    }

    #[test]
    fn test_divergence_without_prior_gap() {
        let composites = by_asset(vec![
            composite("ETH", 0.05, 0.02),
            composite("XRP", -0.03, -0.01),
        ]);
        let ranking = rank(&composites.values().cloned().collect::<Vec<_>>());
        let outcome = discovery().discover(&ranking, &composites, &GapHistory::new());

        assert_eq!(outcome.pairs.len(), 1);
        let pair = &outcome.pairs[0];
        assert_eq!(pair.pair_label(), "ETH/XRP");
        assert_eq!(pair.opportunity_type, OpportunityType::Divergence);
        assert!((pair.supporting_metrics.gap - 0.055).abs() < 1e-12);
        assert_eq!(outcome.recorded.len(), 1);
    }

    #[test]
    fn test_breakout_needs_widening_gap() {
        let composites = by_asset(vec![
            composite("ETH", 0.05, 0.02),
            composite("XRP", -0.03, -0.01),
        ]);
        let ranking = rank(&composites.values().cloned().collect::<Vec<_>>());

        let mut narrower = GapHistory::new();
        narrower.record(&id("ETH"), &id("XRP"), 0.04);
        let outcome = discovery().discover(&ranking, &composites, &narrower);
        assert_eq!(outcome.pairs[0].opportunity_type, OpportunityType::Breakout);
        assert_eq!(outcome.pairs[0].supporting_metrics.prior_gap, Some(0.04));

        let mut wider = GapHistory::new();
        wider.record(&id("ETH"), &id("XRP"), 0.06);
        let outcome = discovery().discover(&ranking, &composites, &wider);
        assert_eq!(outcome.pairs[0].opportunity_type, OpportunityType::Divergence);
    }

    #[test]
    fn test_mean_reversion_when_both_legs_oppose_trend() {
        let composites = by_asset(vec![
            composite("ETH", -0.02, 0.12),
            composite("XRP", 0.01, -0.09),
        ]);
        let ranking = rank(&composites.values().cloned().collect::<Vec<_>>());
        let outcome = discovery().discover(&ranking, &composites, &GapHistory::new());
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].opportunity_type, OpportunityType::MeanReversion);
    }

    #[test]
    fn test_gap_threshold_is_strict_and_all_gaps_recorded() {
        let composites = by_asset(vec![
            composite("ETH", 0.03, 0.03),
            composite("SOL", 0.0, 0.0),
            composite("XRP", -0.001, -0.001),
        ]);
        let ranking = rank(&composites.values().cloned().collect::<Vec<_>>());
        let outcome = discovery().discover(&ranking, &composites, &GapHistory::new());

        // ETH/SOL sits exactly on the 0.03 threshold and is rejected
        assert!(outcome
            .pairs
            .iter()
            .all(|pair| pair.pair_label() != "ETH/SOL"));
        assert_eq!(outcome.recorded.len(), 3);
        assert!(outcome.recorded.get(&id("XRP"), &id("ETH")).is_none());
    }

    #[test]
    fn test_recorded_gaps_round_trip() {
        let mut history = GapHistory::new();
        history.record(&id("ETH"), &id("XRP"), 0.055);
        let restored = GapHistory::from_recorded(&history.to_recorded());
        assert_eq!(restored, history);
    }
}
