//! Startup validation
//!
//! Converts [`EngineConfig`] into typed [`EngineSettings`]. Every rule that can
//! reject a configuration lives here so that configuration errors are fatal at
//! startup and can never surface mid-cycle.

use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use strengthscan_types::{AssetId, EngineError, Timeframe, ValidationError};

use crate::defaults;
use crate::engine_config::{ConfidenceWeights, EngineConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config_crate::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Configuration {
            message: err.to_string(),
        }
    }
}

/// A validated timeframe entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeframeSpec {
    pub timeframe: Timeframe,
    pub weight: f64,
    pub lookback_bars: usize,
}

/// Strength above which an asset is flagged strong on one timeframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrengthThreshold {
    pub timeframe: Timeframe,
    pub min_strength: f64,
}

/// Typed, validated configuration consumed by the engine
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Every ranked asset plus the benchmark, in configuration order
    pub universe: Vec<AssetId>,
    pub benchmark: AssetId,
    /// Sorted shortest first
    pub timeframes: Vec<TimeframeSpec>,
    pub short_timeframe: Timeframe,
    pub long_timeframe: Timeframe,
    pub min_gap: f64,
    pub min_confidence: f64,
    pub confidence: ConfidenceWeights,
    pub max_signals_per_cycle: usize,
    pub high_priority_confidence: f64,
    pub cycle_interval: Duration,
    pub fetch_limit: usize,
    pub neutral_band: f64,
    pub summary_every_cycles: u64,
    pub summary_top_pairs: usize,
    /// Only thresholds for configured timeframes, shortest first
    pub strength_thresholds: Vec<StrengthThreshold>,
    pub extreme_move: f64,
}

impl EngineSettings {
    /// Assets ranked against the benchmark (the universe minus the benchmark)
    pub fn ranked_assets(&self) -> impl Iterator<Item = &AssetId> {
        self.universe.iter().filter(move |id| **id != self.benchmark)
    }

    pub fn timeframe_set(&self) -> Vec<Timeframe> {
        self.timeframes.iter().map(|spec| spec.timeframe).collect()
    }

    pub fn max_lookback(&self) -> usize {
        self.timeframes
            .iter()
            .map(|spec| spec.lookback_bars)
            .max()
            .unwrap_or(0)
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

fn check_unit_interval(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(format!("{name} must be within [0, 1], got {value}")));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!(
            "{name} must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}

impl EngineConfig {
    /// Validate and convert into [`EngineSettings`]
    pub fn validate(&self) -> Result<EngineSettings, ConfigError> {
        // Universe
        let benchmark = AssetId::new(&self.universe.benchmark)?;
        let mut universe = Vec::with_capacity(self.universe.assets.len());
        let mut seen = BTreeSet::new();
        for symbol in &self.universe.assets {
            let id = AssetId::new(symbol)?;
            if !seen.insert(id.clone()) {
                return Err(invalid(format!("asset {id} listed more than once")));
            }
            universe.push(id);
        }
        if !seen.contains(&benchmark) {
            return Err(invalid(format!(
                "benchmark {benchmark} is not part of the asset universe"
            )));
        }
        if universe.len() < 2 {
            return Err(invalid("universe needs at least one asset besides the benchmark"));
        }

        // Timeframes
        if self.timeframes.is_empty() {
            return Err(invalid("at least one timeframe must be configured"));
        }
        let mut timeframes = Vec::with_capacity(self.timeframes.len());
        for entry in &self.timeframes {
            let timeframe: Timeframe = entry.timeframe.parse()?;
            if timeframes
                .iter()
                .any(|spec: &TimeframeSpec| spec.timeframe == timeframe)
            {
                return Err(invalid(format!("timeframe {timeframe} configured more than once")));
            }
            if !entry.weight.is_finite() || entry.weight <= 0.0 {
                return Err(invalid(format!(
                    "weight for {timeframe} must be positive, got {}",
                    entry.weight
                )));
            }
            if entry.lookback_bars < defaults::timeframes::MIN_LOOKBACK_BARS {
                return Err(invalid(format!(
                    "lookback for {timeframe} must be at least {} bars, got {}",
                    defaults::timeframes::MIN_LOOKBACK_BARS,
                    entry.lookback_bars
                )));
            }
            timeframes.push(TimeframeSpec {
                timeframe,
                weight: entry.weight,
                lookback_bars: entry.lookback_bars,
            });
        }
        timeframes.sort_by_key(|spec| spec.timeframe);

        let weight_sum: f64 = timeframes.iter().map(|spec| spec.weight).sum();
        if (weight_sum - 1.0).abs() > defaults::timeframes::WEIGHT_SUM_TOLERANCE {
            return Err(invalid(format!(
                "timeframe weights must sum to 1.0, got {weight_sum}"
            )));
        }

        let configured = |label: &Option<String>, fallback: Timeframe| -> Result<Timeframe, ConfigError> {
            match label {
                None => Ok(fallback),
                Some(label) => {
                    let timeframe: Timeframe = label.parse()?;
                    if timeframes.iter().any(|spec| spec.timeframe == timeframe) {
                        Ok(timeframe)
                    } else {
                        Err(invalid(format!(
                            "classification timeframe {timeframe} is not in the configured set"
                        )))
                    }
                }
            }
        };
        let shortest = timeframes[0].timeframe;
        let longest = timeframes[timeframes.len() - 1].timeframe;
        let short_timeframe = configured(&self.pairs.short_timeframe, shortest)?;
        let long_timeframe = configured(&self.pairs.long_timeframe, longest)?;
        if short_timeframe > long_timeframe {
            return Err(invalid(format!(
                "short timeframe {short_timeframe} is longer than long timeframe {long_timeframe}"
            )));
        }

        // Thresholds
        check_non_negative("pairs.min_gap", self.pairs.min_gap)?;
        check_unit_interval("pairs.min_confidence", self.pairs.min_confidence)?;

        let weights = &self.pairs.confidence;
        check_non_negative("confidence.gap_weight", weights.gap_weight)?;
        check_non_negative("confidence.rank_weight", weights.rank_weight)?;
        check_non_negative("confidence.agreement_weight", weights.agreement_weight)?;
        if weights.gap_weight + weights.rank_weight + weights.agreement_weight <= 0.0 {
            return Err(invalid("at least one confidence weight must be positive"));
        }
        if !weights.gap_scale.is_finite() || weights.gap_scale <= 0.0 {
            return Err(invalid(format!(
                "confidence.gap_scale must be positive, got {}",
                weights.gap_scale
            )));
        }
        check_unit_interval("confidence.incomplete_penalty", weights.incomplete_penalty)?;

        if self.signals.max_signals_per_cycle == 0 {
            return Err(invalid("signals.max_signals_per_cycle must be at least 1"));
        }
        check_unit_interval(
            "signals.high_priority_confidence",
            self.signals.high_priority_confidence,
        )?;

        if self.schedule.cycle_interval_secs == 0 {
            return Err(invalid("schedule.cycle_interval_secs must be at least 1"));
        }
        let max_lookback = timeframes
            .iter()
            .map(|spec| spec.lookback_bars)
            .max()
            .unwrap_or(0);
        if self.schedule.fetch_limit < max_lookback {
            return Err(invalid(format!(
                "schedule.fetch_limit ({}) is below the longest lookback ({max_lookback})",
                self.schedule.fetch_limit
            )));
        }
        check_non_negative("summary.neutral_band", self.summary.neutral_band)?;

        // Alerts
        let mut strength_thresholds = Vec::new();
        for entry in &self.alerts.strong_vs_benchmark {
            let timeframe: Timeframe = entry.timeframe.parse()?;
            check_non_negative("alerts.strong_vs_benchmark.min_strength", entry.min_strength)?;
            if !timeframes.iter().any(|spec| spec.timeframe == timeframe) {
                warn!("Ignoring strength flag for unconfigured timeframe {timeframe}");
                continue;
            }
            if strength_thresholds
                .iter()
                .any(|t: &StrengthThreshold| t.timeframe == timeframe)
            {
                return Err(invalid(format!(
                    "strength flag for {timeframe} configured more than once"
                )));
            }
            strength_thresholds.push(StrengthThreshold {
                timeframe,
                min_strength: entry.min_strength,
            });
        }
        strength_thresholds.sort_by_key(|t| t.timeframe);
        if !self.alerts.extreme_move.is_finite() || self.alerts.extreme_move <= 0.0 {
            return Err(invalid(format!(
                "alerts.extreme_move must be positive, got {}",
                self.alerts.extreme_move
            )));
        }

        info!(
            "Validated config: {} assets vs {}, {} timeframes",
            universe.len() - 1,
            benchmark,
            timeframes.len()
        );

        Ok(EngineSettings {
            universe,
            benchmark,
            timeframes,
            short_timeframe,
            long_timeframe,
            min_gap: self.pairs.min_gap,
            min_confidence: self.pairs.min_confidence,
            confidence: weights.clone(),
            max_signals_per_cycle: self.signals.max_signals_per_cycle,
            high_priority_confidence: self.signals.high_priority_confidence,
            cycle_interval: Duration::from_secs(self.schedule.cycle_interval_secs),
            fetch_limit: self.schedule.fetch_limit,
            neutral_band: self.summary.neutral_band,
            summary_every_cycles: self.summary.notify_every_cycles,
            summary_top_pairs: self.summary.top_pairs,
            strength_thresholds,
            extreme_move: self.alerts.extreme_move,
        })
    }
}
