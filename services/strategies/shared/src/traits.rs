//! Strategy traits and collaborator interfaces

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use strengthscan_types::{AssetId, Notification, PriceSeries, Signal, Timeframe};

/// Core trait that all strategy services implement
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Strategy name for identification
    fn name(&self) -> &'static str;

    /// Start the strategy
    async fn start(&mut self) -> Result<()>;

    /// Stop the strategy
    async fn stop(&mut self) -> Result<()>;

    /// Get current strategy metrics
    fn metrics(&self) -> StrategyMetrics;
}

/// Cycle-level strategy metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyMetrics {
    pub cycles_completed: u64,
    pub cycles_aborted: u64,
    pub assets_excluded: u64,
    pub pairs_discovered: u64,
    pub signals_emitted: u64,
    pub delivery_failures: u64,
}

/// What the engine asks the data-fetch collaborator for each cycle
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub assets: Vec<AssetId>,
    pub timeframes: Vec<Timeframe>,
    /// Bars per (asset, timeframe)
    pub limit: usize,
}

/// Already-fetched price data for one cycle.
///
/// Fetch failures are reported per asset; a failure for the benchmark aborts
/// the cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub series: BTreeMap<AssetId, BTreeMap<Timeframe, PriceSeries>>,
    #[serde(default)]
    pub failures: BTreeMap<AssetId, String>,
}

impl MarketSnapshot {
    pub fn new(fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at: Some(fetched_at),
            ..Self::default()
        }
    }

    /// Add a series under its own asset and timeframe, replacing any previous one
    pub fn insert_series(&mut self, series: PriceSeries) {
        self.series
            .entry(series.asset.clone())
            .or_default()
            .insert(series.timeframe, series);
    }

    pub fn record_failure(&mut self, asset: AssetId, reason: impl Into<String>) {
        self.failures.insert(asset, reason.into());
    }

    pub fn series_for(&self, asset: &AssetId, timeframe: Timeframe) -> Option<&PriceSeries> {
        self.series.get(asset).and_then(|by_tf| by_tf.get(&timeframe))
    }

    pub fn failure_for(&self, asset: &AssetId) -> Option<&str> {
        self.failures.get(asset).map(String::as_str)
    }
}

/// Data-fetch collaborator: exchange clients, caches and retries live behind this
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, request: &FetchRequest) -> Result<MarketSnapshot>;
}

/// Notification collaborator: receives fully rendered signals and market
/// notifications
#[async_trait]
pub trait SignalSink: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, signals: &[Signal]) -> Result<()>;

    /// Market summaries and alerts
    async fn notify(&self, notification: &Notification) -> Result<()>;
}
