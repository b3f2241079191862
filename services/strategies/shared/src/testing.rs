//! Test doubles for strategy collaborators

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use strengthscan_types::{Notification, Signal};

use crate::traits::{FetchRequest, MarketDataSource, MarketSnapshot, SignalSink};

/// Source that hands out a fixed snapshot, or a fixed error
pub struct StaticMarketSource {
    snapshot: Mutex<Result<MarketSnapshot, String>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl StaticMarketSource {
    pub fn new(snapshot: MarketSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Ok(snapshot)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            snapshot: Mutex::new(Err(reason.into())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replace the snapshot served by later fetches
    pub fn set_snapshot(&self, snapshot: MarketSnapshot) {
        *self.snapshot.lock() = Ok(snapshot);
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl MarketDataSource for StaticMarketSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<MarketSnapshot> {
        self.requests.lock().push(request.clone());
        match &*self.snapshot.lock() {
            Ok(snapshot) => Ok(snapshot.clone()),
            Err(reason) => Err(anyhow!("{reason}")),
        }
    }
}

/// Sink that keeps every delivered signal and notification in memory
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Signal>>,
    notifications: Mutex<Vec<Notification>>,
    batches: Mutex<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Signal> {
        self.delivered.lock().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn batches(&self) -> usize {
        *self.batches.lock()
    }
}

#[async_trait]
impl SignalSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, signals: &[Signal]) -> Result<()> {
        self.delivered.lock().extend_from_slice(signals);
        *self.batches.lock() += 1;
        Ok(())
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.notifications.lock().push(notification.clone());
        Ok(())
    }
}

/// Sink whose every delivery fails, counting the attempts
#[derive(Default)]
pub struct FailingSink {
    attempts: Mutex<usize>,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait]
impl SignalSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    async fn deliver(&self, _signals: &[Signal]) -> Result<()> {
        *self.attempts.lock() += 1;
        Err(anyhow!("notification channel unavailable"))
    }

    async fn notify(&self, _notification: &Notification) -> Result<()> {
        *self.attempts.lock() += 1;
        Err(anyhow!("notification channel unavailable"))
    }
}

/// Test utilities for strategy validation
pub mod test_utils {
    pub fn assert_strategy_named<T: crate::Strategy>(strategy: &T, expected_name: &str) {
        assert_eq!(strategy.name(), expected_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strengthscan_types::{AssetId, Timeframe};

    fn request() -> FetchRequest {
        FetchRequest {
            assets: vec![AssetId::new("BTC").unwrap()],
            timeframes: vec![Timeframe::H1],
            limit: 10,
        }
    }

    #[tokio::test]
    async fn test_static_source_records_requests() {
        let source = StaticMarketSource::new(MarketSnapshot::default());
        source.fetch(&request()).await.unwrap();
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = StaticMarketSource::failing("exchange down");
        let err = source.fetch(&request()).await.unwrap_err();
        assert!(err.to_string().contains("exchange down"));
    }

    #[tokio::test]
    async fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.deliver(&[]).await.unwrap();
        assert_eq!(sink.batches(), 1);
        assert!(sink.delivered().is_empty());
        assert!(sink.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_failing_sink_counts_attempts() {
        let sink = FailingSink::new();
        assert!(sink.deliver(&[]).await.is_err());
        assert_eq!(sink.attempts(), 1);
    }
}
