//! Market data sources
//!
//! The exchange client lives outside this workspace. [`JsonFileSource`] replays
//! a recorded [`MarketSnapshot`] from disk so the service can run end-to-end.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use strengthscan_strategy_shared::{FetchRequest, MarketDataSource, MarketSnapshot};

/// Reads a JSON-encoded `MarketSnapshot` on every fetch
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MarketDataSource for JsonFileSource {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<MarketSnapshot> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read market fixture {:?}", self.path))?;
        let recorded: MarketSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse market fixture {:?}", self.path))?;

        let mut snapshot = MarketSnapshot {
            fetched_at: recorded.fetched_at,
            ..MarketSnapshot::default()
        };
        for asset in &request.assets {
            if let Some(reason) = recorded.failure_for(asset) {
                snapshot.record_failure(asset.clone(), reason);
                continue;
            }
            let mut found = false;
            for timeframe in &request.timeframes {
                if let Some(series) = recorded.series_for(asset, *timeframe) {
                    let mut series = series.clone();
                    let excess = series.bars.len().saturating_sub(request.limit);
                    series.bars.drain(..excess);
                    snapshot.insert_series(series);
                    found = true;
                }
            }
            if !found {
                snapshot.record_failure(asset.clone(), "no data in fixture");
            }
        }

        debug!(
            "Loaded {} assets ({} failures) from {:?}",
            snapshot.series.len(),
            snapshot.failures.len(),
            self.path
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use strengthscan_types::{AssetId, PriceBar, PriceSeries, Timeframe};
    use tempfile::tempdir;

    fn fixture() -> MarketSnapshot {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let bars = (0..5)
            .map(|i| {
                let close = 100.0 + i as f64;
                PriceBar::new(start + Duration::hours(i), close, close, close, close, 1.0)
            })
            .collect();
        let mut snapshot = MarketSnapshot::new(start);
        snapshot.insert_series(PriceSeries::new(
            AssetId::new("BTC").unwrap(),
            Timeframe::H1,
            bars,
        ));
        snapshot
    }

    #[tokio::test]
    async fn test_fetch_trims_to_limit_and_flags_missing_assets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("market.json");
        std::fs::write(&path, serde_json::to_string(&fixture()).unwrap()).unwrap();

        let source = JsonFileSource::new(&path);
        let request = FetchRequest {
            assets: vec![AssetId::new("BTC").unwrap(), AssetId::new("ETH").unwrap()],
            timeframes: vec![Timeframe::H1],
            limit: 3,
        };
        let snapshot = source.fetch(&request).await.unwrap();

        let btc = snapshot
            .series_for(&AssetId::new("BTC").unwrap(), Timeframe::H1)
            .unwrap();
        assert_eq!(btc.closes(), vec![102.0, 103.0, 104.0]);
        assert!(snapshot.failure_for(&AssetId::new("ETH").unwrap()).is_some());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let source = JsonFileSource::new("/nonexistent/market.json");
        let request = FetchRequest {
            assets: vec![],
            timeframes: vec![],
            limit: 1,
        };
        assert!(source.fetch(&request).await.is_err());
    }
}
