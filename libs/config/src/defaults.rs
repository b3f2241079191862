//! Default configuration values
//!
//! Used when no configuration file is supplied, and as the base layer that file
//! and environment overrides are merged onto.

/// Monitored universe
pub mod universe {
    /// Benchmark every relative score is measured against
    pub const BENCHMARK: &str = "BTC";

    pub const ASSETS: [&str; 15] = [
        "BTC", "ETH", "BNB", "XRP", "ADA", "SOL", "DOGE", "DOT", "MATIC", "AVAX", "LTC", "UNI",
        "LINK", "ATOM", "XLM",
    ];
}

/// Timeframe weights and lookback windows (label, weight, lookback bars)
pub mod timeframes {
    pub const SETTINGS: [(&str, f64, usize); 4] = [
        ("1h", 0.15, 24),
        ("4h", 0.30, 18),
        ("1d", 0.40, 14),
        ("1w", 0.15, 8),
    ];

    /// Tolerance when checking that weights sum to 1.0
    pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

    /// Fewest bars a return can be measured over
    pub const MIN_LOOKBACK_BARS: usize = 2;
}

/// Pair discovery thresholds
pub mod pairs {
    pub const MIN_GAP: f64 = 0.03;
    pub const MIN_CONFIDENCE: f64 = 0.6;

    pub const GAP_WEIGHT: f64 = 0.4;
    pub const RANK_WEIGHT: f64 = 0.3;
    pub const AGREEMENT_WEIGHT: f64 = 0.3;

    /// Gap at which the gap component of confidence saturates
    pub const GAP_SCALE: f64 = 0.10;

    /// Confidence multiplier when either leg used incomplete data
    pub const INCOMPLETE_PENALTY: f64 = 0.8;
}

/// Signal emission
pub mod signals {
    pub const MAX_SIGNALS_PER_CYCLE: usize = 3;
    pub const HIGH_PRIORITY_CONFIDENCE: f64 = 0.8;
}

/// Scheduling
pub mod schedule {
    /// 15 minutes
    pub const CYCLE_INTERVAL_SECS: u64 = 900;

    /// Bars requested per (asset, timeframe) from the data source
    pub const FETCH_LIMIT: usize = 200;
}

/// Market summary
pub mod summary {
    /// Mean composite within +/- this band reads as a neutral market
    pub const NEUTRAL_BAND: f64 = 0.005;

    /// Summary notification cadence in cycles: 96 x 15 minutes is once a day
    pub const NOTIFY_EVERY_CYCLES: u64 = 96;

    /// Pairs listed in the summary notification
    pub const TOP_PAIRS: usize = 3;
}

/// Per-asset strength flags and market alerts
pub mod alerts {
    /// (timeframe label, strength above which an asset is flagged strong)
    pub const STRONG_VS_BENCHMARK: [(&str, f64); 2] = [("1h", 0.02), ("4h", 0.05)];

    /// Absolute single-timeframe strength that raises an extreme move alert
    pub const EXTREME_MOVE: f64 = 0.10;
}
