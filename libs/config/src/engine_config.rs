//! Engine Configuration Module
//!
//! Raw configuration as read from files and the environment. Identifiers and
//! timeframe labels stay as strings here so that unknown values are reported by
//! [`EngineConfig::validate`] as configuration errors instead of opaque
//! deserialization failures.

use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::defaults;
use crate::validation::ConfigError;

/// Environment variable prefix for overrides, e.g.
/// `STRENGTHSCAN_SIGNALS__MAX_SIGNALS_PER_CYCLE=5`
pub const ENV_PREFIX: &str = "STRENGTHSCAN";

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "STRENGTHSCAN_CONFIG_PATH";

const DEFAULT_CONFIG_PATH: &str = "config/strengthscan.toml";

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub universe: UniverseConfig,
    pub timeframes: Vec<TimeframeSettings>,
    pub pairs: PairDiscoveryConfig,
    pub signals: SignalConfig,
    pub schedule: ScheduleConfig,
    pub summary: SummaryConfig,
    pub alerts: AlertConfig,
    pub logging: LoggingConfig,
}

/// Assets to rank and the benchmark they are measured against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// Asset symbols; must include the benchmark
    pub assets: Vec<String>,
    pub benchmark: String,
}

/// One analysed horizon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeframeSettings {
    /// Label such as `1h` or `1d`
    pub timeframe: String,
    /// Share of the composite score; all weights sum to 1.0
    pub weight: f64,
    /// Bars the return is measured over
    pub lookback_bars: usize,
}

/// Pair discovery thresholds and classification horizons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairDiscoveryConfig {
    /// Minimum strength gap (non-inclusive: gap > min_gap)
    pub min_gap: f64,
    /// Minimum confidence (non-inclusive: confidence > min_confidence)
    pub min_confidence: f64,
    /// Short horizon for classification; defaults to the shortest configured
    #[serde(default)]
    pub short_timeframe: Option<String>,
    /// Long horizon for classification; defaults to the longest configured
    #[serde(default)]
    pub long_timeframe: Option<String>,
    pub confidence: ConfidenceWeights,
}

/// Tunable confidence formula
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub gap_weight: f64,
    pub rank_weight: f64,
    pub agreement_weight: f64,
    /// Gap at which the gap component saturates at 1.0
    pub gap_scale: f64,
    /// Multiplier in [0, 1] applied when either leg is incomplete
    pub incomplete_penalty: f64,
}

/// Signal emission settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    pub max_signals_per_cycle: usize,
    /// Signals at or above this confidence are delivered with high priority
    pub high_priority_confidence: f64,
}

/// Cycle scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub cycle_interval_secs: u64,
    /// Bars requested per (asset, timeframe)
    pub fetch_limit: usize,
}

/// Market summary settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub neutral_band: f64,
    /// Send the summary notification every N published cycles; 0 disables it
    pub notify_every_cycles: u64,
    /// Pairs listed in the summary notification
    pub top_pairs: usize,
}

/// Strength flags and market alerts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Absolute strength on any timeframe above which a market alert is raised
    pub extreme_move: f64,
    /// Flag an asset whose strength on `timeframe` exceeds `min_strength`.
    /// Entries for timeframes outside the configured set are ignored.
    pub strong_vs_benchmark: Vec<StrengthThresholdSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrengthThresholdSettings {
    pub timeframe: String,
    pub min_strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            universe: UniverseConfig::default(),
            timeframes: defaults::timeframes::SETTINGS
                .iter()
                .map(|&(label, weight, lookback_bars)| TimeframeSettings {
                    timeframe: label.to_string(),
                    weight,
                    lookback_bars,
                })
                .collect(),
            pairs: PairDiscoveryConfig::default(),
            signals: SignalConfig::default(),
            schedule: ScheduleConfig::default(),
            summary: SummaryConfig::default(),
            alerts: AlertConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            assets: defaults::universe::ASSETS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            benchmark: defaults::universe::BENCHMARK.to_string(),
        }
    }
}

impl Default for PairDiscoveryConfig {
    fn default() -> Self {
        Self {
            min_gap: defaults::pairs::MIN_GAP,
            min_confidence: defaults::pairs::MIN_CONFIDENCE,
            short_timeframe: None,
            long_timeframe: None,
            confidence: ConfidenceWeights::default(),
        }
    }
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            gap_weight: defaults::pairs::GAP_WEIGHT,
            rank_weight: defaults::pairs::RANK_WEIGHT,
            agreement_weight: defaults::pairs::AGREEMENT_WEIGHT,
            gap_scale: defaults::pairs::GAP_SCALE,
            incomplete_penalty: defaults::pairs::INCOMPLETE_PENALTY,
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            max_signals_per_cycle: defaults::signals::MAX_SIGNALS_PER_CYCLE,
            high_priority_confidence: defaults::signals::HIGH_PRIORITY_CONFIDENCE,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cycle_interval_secs: defaults::schedule::CYCLE_INTERVAL_SECS,
            fetch_limit: defaults::schedule::FETCH_LIMIT,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            neutral_band: defaults::summary::NEUTRAL_BAND,
            notify_every_cycles: defaults::summary::NOTIFY_EVERY_CYCLES,
            top_pairs: defaults::summary::TOP_PAIRS,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            extreme_move: defaults::alerts::EXTREME_MOVE,
            strong_vs_benchmark: defaults::alerts::STRONG_VS_BENCHMARK
                .iter()
                .map(|&(label, min_strength)| StrengthThresholdSettings {
                    timeframe: label.to_string(),
                    min_strength,
                })
                .collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration: defaults, then `path` (if any), then environment
    /// overrides with the `STRENGTHSCAN` prefix
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            info!("Loading engine config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        } else {
            debug!("No config file supplied, using built-in defaults");
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Parse a TOML document layered over the defaults (no environment overrides)
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Render as TOML, e.g. to bootstrap a config file
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Resolve the configuration file: explicit CLI path, then `STRENGTHSCAN_CONFIG_PATH`,
/// then `config/strengthscan.toml` when it exists
pub fn resolve_config_path(cli_path: Option<PathBuf>) -> Option<PathBuf> {
    if cli_path.is_some() {
        return cli_path;
    }
    if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(env_path));
    }
    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    default_path.exists().then_some(default_path)
}
