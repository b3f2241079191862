//! Market data primitives: timeframes, OHLC bars and price series
//!
//! Series arrive from the data-fetch collaborator unnormalized. The normalizer in
//! the engine crate turns them into grid-aligned, deduplicated series whose gaps
//! are listed explicitly in `gaps` and summarized by the `incomplete` marker.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::errors::ValidationError;
use crate::common::identifiers::AssetId;

/// Supported analysis horizons, declared shortest first so `Ord` follows duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    M5,
    M15,
    H1,
    H4,
    D1,
    W1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 6] = [
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
        Timeframe::W1,
    ];

    /// Exchange-style label (`1h`, `1d`, ...)
    pub fn label(self) -> &'static str {
        match self {
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
        }
    }

    /// Grid step in milliseconds
    pub fn step_millis(self) -> i64 {
        const MINUTE: i64 = 60_000;
        match self {
            Timeframe::M5 => 5 * MINUTE,
            Timeframe::M15 => 15 * MINUTE,
            Timeframe::H1 => 60 * MINUTE,
            Timeframe::H4 => 4 * 60 * MINUTE,
            Timeframe::D1 => 24 * 60 * MINUTE,
            Timeframe::W1 => 7 * 24 * 60 * MINUTE,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::milliseconds(self.step_millis())
    }

    /// Floor a timestamp onto this timeframe's grid (multiples of the step since
    /// the Unix epoch)
    pub fn floor_to_grid(self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let step = self.step_millis();
        let floored = ts.timestamp_millis().div_euclid(step) * step;
        DateTime::from_timestamp_millis(floored).unwrap_or(ts)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.label() == normalized)
            .ok_or(ValidationError::UnknownTimeframe {
                label: s.to_string(),
            })
    }
}

impl TryFrom<String> for Timeframe {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.label().to_string()
    }
}

/// One OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Describe why the bar is corrupt, or `None` if it is usable
    pub fn defect(&self) -> Option<String> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (field, value) in prices {
            if !value.is_finite() {
                return Some(format!("non-finite {field} ({value}) at {}", self.timestamp));
            }
            if value <= 0.0 {
                return Some(format!("non-positive {field} ({value}) at {}", self.timestamp));
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Some(format!("invalid volume ({}) at {}", self.volume, self.timestamp));
        }
        if self.high < self.low {
            return Some(format!(
                "high {} below low {} at {}",
                self.high, self.low, self.timestamp
            ));
        }
        None
    }
}

/// A run of missing bars between two present ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    /// Timestamp of the last bar before the gap
    pub after: DateTime<Utc>,
    pub missing_bars: u32,
}

/// Ordered bars for one (asset, timeframe)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub asset: AssetId,
    pub timeframe: Timeframe,
    pub bars: Vec<PriceBar>,
    #[serde(default)]
    pub gaps: Vec<Gap>,
    #[serde(default)]
    pub incomplete: bool,
}

impl PriceSeries {
    /// Raw series as handed over by the data-fetch collaborator
    pub fn new(asset: AssetId, timeframe: Timeframe, bars: Vec<PriceBar>) -> Self {
        Self {
            asset,
            timeframe,
            bars,
            gaps: Vec::new(),
            incomplete: false,
        }
    }

    /// Normalized series with its gap list; `incomplete` follows from the gaps
    pub fn with_gaps(
        asset: AssetId,
        timeframe: Timeframe,
        bars: Vec<PriceBar>,
        gaps: Vec<Gap>,
    ) -> Self {
        let incomplete = !gaps.is_empty();
        Self {
            asset,
            timeframe,
            bars,
            gaps,
            incomplete,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// Total number of bars flagged missing across all gaps
    pub fn missing_bars(&self) -> u32 {
        self.gaps.iter().map(|gap| gap.missing_bars).sum()
    }
}
