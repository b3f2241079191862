//! # StrengthScan Centralized Configuration
//!
//! Configuration surface and startup validation for the relative strength engine.
//!
//! ## Features
//!
//! - **Layered Loading**: built-in defaults, then an optional TOML file, then
//!   `STRENGTHSCAN_*` environment overrides
//! - **Startup Validation**: `EngineConfig::validate` turns raw, string-keyed
//!   configuration into typed `EngineSettings`; every configuration error surfaces
//!   here, never during a cycle
//! - **Defaults**: the monitored universe, timeframe weights and thresholds in
//!   [`defaults`]
//!
//! ## Usage
//!
//! ```rust
//! use strengthscan_config::EngineConfig;
//!
//! let settings = EngineConfig::default().validate().unwrap();
//! assert_eq!(settings.benchmark.as_str(), "BTC");
//! ```

pub mod defaults;
pub mod engine_config;
pub mod validation;

pub use engine_config::{
    resolve_config_path, AlertConfig, ConfidenceWeights, EngineConfig, LoggingConfig,
    PairDiscoveryConfig, ScheduleConfig, SignalConfig, StrengthThresholdSettings, SummaryConfig,
    TimeframeSettings, UniverseConfig, CONFIG_PATH_ENV, ENV_PREFIX,
};
pub use validation::{ConfigError, EngineSettings, StrengthThreshold, TimeframeSpec};
