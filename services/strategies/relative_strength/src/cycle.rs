//! Cycle Runner
//!
//! **Purpose**: Run one complete analysis cycle over already-fetched market data
//! and produce an immutable [`CycleSnapshot`].
//!
//! **Integration Points**:
//! - Input: a [`MarketSnapshot`] from the data-fetch collaborator plus the gaps
//!   recorded by the previous published cycle
//! - Output: a snapshot for [`crate::snapshot::SnapshotStore`] whose signals go to
//!   the notification collaborator
//!
//! **Architecture Role**:
//! ```text
//! benchmark check ──► per-asset fan-out (JoinSet, blocking tasks)
//!                        normalize ─► strength per timeframe ─► composite
//!                  ──► join barrier ──► rank ──► pairs ──► signals
//!                  ──► strength flags + extreme move alerts ──► summary
//! ```
//!
//! **Failure Policy**:
//! - Benchmark fetch failure, missing timeframe, insufficiency or corruption
//!   aborts the cycle; nothing is published
//! - Any other asset failing is excluded for this cycle with its reason recorded
//! - A timeframe that is missing or too short for one asset only drops that
//!   timeframe; a corrupt bar excludes the whole asset
//! - No rankable assets left aborts the cycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

use strengthscan_config::{EngineSettings, TimeframeSpec};
use strengthscan_strategy_shared::MarketSnapshot;
use strengthscan_types::{
    AssetId, CompositeScore, EngineError, Notification, PairOpportunity, PriceSeries, RankEntry,
    Result, Signal, StrengthFlag, Timeframe,
};

use crate::aggregator::aggregate;
use crate::alerts::{extreme_move_alerts, flagged_assets, strength_flags};
use crate::calculator::relative_strength;
use crate::emitter::SignalEmitter;
use crate::normalizer::normalize;
use crate::pairs::{GapHistory, PairDiscovery, RecordedGap};
use crate::ranker::rank;
use crate::summary::MarketSummary;
use crate::{log_excluded, log_ranking};

/// An asset left out of a cycle, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionRecord {
    pub asset: AssetId,
    /// `fetch_failed`, `insufficient_data` or `computation`
    pub kind: String,
    pub reason: String,
}

/// Everything one cycle produced. Immutable once published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub cycle_id: u64,
    pub computed_at: DateTime<Utc>,
    pub rankings: Vec<RankEntry>,
    /// Composites in ranking order
    pub composites: Vec<CompositeScore>,
    pub pairs: Vec<PairOpportunity>,
    pub signals: Vec<Signal>,
    /// Gap of every evaluated pair, read back by the next cycle
    pub recorded_gaps: Vec<RecordedGap>,
    pub excluded: Vec<ExclusionRecord>,
    /// Per-asset, per-timeframe strength above the configured flag thresholds
    pub strength_flags: Vec<StrengthFlag>,
    /// Market alerts raised by this cycle
    pub alerts: Vec<Notification>,
    pub summary: MarketSummary,
}

impl CycleSnapshot {
    pub fn gap_history(&self) -> GapHistory {
        GapHistory::from_recorded(&self.recorded_gaps)
    }
}

pub struct CycleRunner {
    settings: Arc<EngineSettings>,
    discovery: PairDiscovery,
    emitter: SignalEmitter,
}

impl CycleRunner {
    pub fn new(settings: Arc<EngineSettings>) -> Self {
        let discovery = PairDiscovery::new(&settings);
        let emitter = SignalEmitter::from_settings(&settings);
        Self {
            settings,
            discovery,
            emitter,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Run one cycle.
    ///
    /// Returns `CycleAborted` when the benchmark is unusable or no asset could
    /// be ranked.
    pub async fn run(
        &self,
        mut market: MarketSnapshot,
        prior_gaps: &GapHistory,
        cycle_id: u64,
        computed_at: DateTime<Utc>,
    ) -> Result<CycleSnapshot> {
        let benchmark = Arc::new(self.prepare_benchmark(&market)?);

        let mut excluded = Vec::new();
        let mut tasks = JoinSet::new();
        for asset in self.settings.ranked_assets() {
            if let Some(reason) = market.failure_for(asset) {
                excluded.push(ExclusionRecord {
                    asset: asset.clone(),
                    kind: "fetch_failed".to_string(),
                    reason: reason.to_string(),
                });
                continue;
            }

            let series = market.series.remove(asset).unwrap_or_default();
            let benchmark = Arc::clone(&benchmark);
            let specs = self.settings.timeframes.clone();
            let asset = asset.clone();
            tasks.spawn_blocking(move || {
                let outcome = score_asset(&asset, series, &benchmark, &specs, computed_at);
                (asset, outcome)
            });
        }

        // Join barrier: ranking only starts once every asset is scored
        let mut composites = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (asset, outcome) = joined.map_err(|e| EngineError::CycleAborted {
                reason: format!("scoring task failed: {e}"),
            })?;
            match outcome {
                Ok(composite) => {
                    composites.insert(asset, composite);
                }
                Err(err) => excluded.push(ExclusionRecord {
                    asset,
                    kind: err.kind().to_string(),
                    reason: err.to_string(),
                }),
            }
        }
        excluded.sort_by(|a, b| a.asset.cmp(&b.asset));
        for record in &excluded {
            log_excluded!("Excluded {} from cycle {}: {}", record.asset, cycle_id, record.reason);
        }

        if composites.is_empty() {
            return Err(EngineError::CycleAborted {
                reason: format!("no rankable assets ({} excluded)", excluded.len()),
            });
        }

        let ordered: Vec<CompositeScore> = composites.values().cloned().collect();
        let rankings = rank(&ordered);
        if let (Some(top), Some(bottom)) = (rankings.first(), rankings.last()) {
            log_ranking!(
                "Cycle {}: {} ranked, strongest {} ({:+.4}), weakest {} ({:+.4})",
                cycle_id,
                rankings.len(),
                top.asset,
                top.composite_score,
                bottom.asset,
                bottom.composite_score
            );
        }

        let discovery = self.discovery.discover(&rankings, &composites, prior_gaps);
        let signals = self.emitter.emit(&discovery.pairs, computed_at);

        let composites: Vec<CompositeScore> = rankings
            .iter()
            .filter_map(|entry| composites.remove(&entry.asset))
            .collect();

        let strength_flags = strength_flags(&composites, &self.settings.strength_thresholds);
        for flag in &strength_flags {
            debug!(
                "{} {} ({:+.4} > {})",
                flag.asset,
                flag.label(&self.settings.benchmark),
                flag.value,
                flag.threshold
            );
        }
        let alerts = extreme_move_alerts(
            &composites,
            self.settings.extreme_move,
            &self.settings.benchmark,
            computed_at,
        );

        let summary = MarketSummary::build(
            &rankings,
            excluded.len(),
            flagged_assets(&strength_flags),
            &signals,
            self.settings.neutral_band,
        );

        Ok(CycleSnapshot {
            cycle_id,
            computed_at,
            rankings,
            composites,
            pairs: discovery.pairs,
            signals,
            recorded_gaps: discovery.recorded.to_recorded(),
            excluded,
            strength_flags,
            alerts,
            summary,
        })
    }

    /// Normalize every configured benchmark timeframe; any failure aborts
    fn prepare_benchmark(&self, market: &MarketSnapshot) -> Result<BTreeMap<Timeframe, PriceSeries>> {
        let benchmark = &self.settings.benchmark;
        let abort = |reason: String| EngineError::CycleAborted {
            reason: format!("benchmark {benchmark}: {reason}"),
        };

        if let Some(reason) = market.failure_for(benchmark) {
            return Err(abort(format!("fetch failed: {reason}")));
        }

        let mut prepared = BTreeMap::new();
        for spec in &self.settings.timeframes {
            let raw = market
                .series_for(benchmark, spec.timeframe)
                .ok_or_else(|| abort(format!("no {} series", spec.timeframe)))?;
            let normalized = normalize(raw, spec.lookback_bars).map_err(|e| abort(e.to_string()))?;
            prepared.insert(spec.timeframe, normalized);
        }
        Ok(prepared)
    }
}

/// Normalize, score and aggregate one asset. Runs on a blocking worker.
fn score_asset(
    asset: &AssetId,
    series: BTreeMap<Timeframe, PriceSeries>,
    benchmark: &BTreeMap<Timeframe, PriceSeries>,
    specs: &[TimeframeSpec],
    computed_at: DateTime<Utc>,
) -> Result<CompositeScore> {
    let mut scores = BTreeMap::new();
    for spec in specs {
        let (Some(raw), Some(benchmark_series)) =
            (series.get(&spec.timeframe), benchmark.get(&spec.timeframe))
        else {
            debug!("{asset}: no {} series, timeframe dropped", spec.timeframe);
            continue;
        };

        let scored = normalize(raw, spec.lookback_bars).and_then(|normalized| {
            relative_strength(&normalized, benchmark_series, spec.lookback_bars, computed_at)
        });
        match scored {
            Ok(score) => {
                scores.insert(spec.timeframe, score);
            }
            Err(EngineError::InsufficientData { detail, .. }) => {
                debug!("{asset}: {detail}, timeframe dropped");
            }
            Err(err) => return Err(err),
        }
    }

    aggregate(asset, &scores, specs, computed_at)
}
