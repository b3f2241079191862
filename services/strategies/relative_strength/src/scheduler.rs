//! Relative strength service
//!
//! Drives the cycle runner on a fixed interval: fetch, run, publish, deliver.
//! Missed ticks are skipped rather than bunched up, so a slow fetch never
//! triggers back-to-back cycles.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use strengthscan_config::EngineSettings;
use strengthscan_strategy_shared::{
    FetchRequest, MarketDataSource, MetricsCollector, SignalSink, Strategy, StrategyMetrics,
};

use strengthscan_types::Notification;

use crate::cycle::{CycleRunner, CycleSnapshot};
use crate::snapshot::SnapshotStore;
use crate::{log_cycle, log_error, log_metrics, log_success, log_timing};

pub struct RelativeStrengthService {
    runner: CycleRunner,
    source: Arc<dyn MarketDataSource>,
    sink: Arc<dyn SignalSink>,
    store: Arc<SnapshotStore>,
    metrics: Arc<MetricsCollector>,
    next_cycle_id: AtomicU64,
    shutdown: Arc<Notify>,
}

impl RelativeStrengthService {
    pub fn new(
        settings: Arc<EngineSettings>,
        source: Arc<dyn MarketDataSource>,
        sink: Arc<dyn SignalSink>,
    ) -> Self {
        Self {
            runner: CycleRunner::new(settings),
            source,
            sink,
            store: Arc::new(SnapshotStore::new()),
            metrics: Arc::new(MetricsCollector::new()),
            next_cycle_id: AtomicU64::new(1),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Dashboard boundary: the store holding the latest published cycle
    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.store)
    }

    /// Notify this handle to end the [`Strategy::start`] loop
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    fn fetch_request(&self) -> FetchRequest {
        let settings = self.runner.settings();
        FetchRequest {
            assets: settings.universe.clone(),
            timeframes: settings.timeframe_set(),
            limit: settings.fetch_limit,
        }
    }

    /// Summary notifications go out every `summary_every_cycles` cycle ids
    fn summary_due(&self, cycle_id: u64) -> bool {
        let every = self.runner.settings().summary_every_cycles;
        every > 0 && cycle_id % every == 0
    }

    async fn send_notification(&self, notification: &Notification) {
        if let Err(e) = self.sink.notify(notification).await {
            self.metrics.increment_delivery_failures();
            warn!(
                "Delivery of '{}' to {} failed: {:#}",
                notification.title(),
                self.sink.name(),
                e
            );
        }
    }

    /// Run a single cycle and publish it.
    ///
    /// A failed delivery is logged and counted; the snapshot stays published.
    pub async fn run_once(&self) -> Result<Arc<CycleSnapshot>> {
        let started = Instant::now();
        let cycle_id = self.next_cycle_id.fetch_add(1, Ordering::Relaxed);
        log_cycle!("Starting cycle {} via {}", cycle_id, self.source.name());

        let market = match self.source.fetch(&self.fetch_request()).await {
            Ok(market) => market,
            Err(e) => {
                self.metrics.increment_aborted();
                log_error!("Cycle {} aborted: market data fetch failed: {:#}", cycle_id, e);
                return Err(e.context(format!("cycle {cycle_id} fetch failed")));
            }
        };

        let prior_gaps = self.store.prior_gaps();
        let snapshot = match self
            .runner
            .run(market, &prior_gaps, cycle_id, Utc::now())
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.metrics.increment_aborted();
                log_error!("Cycle {} aborted: {}", cycle_id, e);
                return Err(anyhow!(e));
            }
        };

        self.metrics.record_cycle(
            snapshot.excluded.len(),
            snapshot.pairs.len(),
            snapshot.signals.len(),
        );
        let published = Arc::new(snapshot);
        self.store.swap(Arc::clone(&published));

        log_success!("Cycle {} published: {}", cycle_id, published.summary);

        if !published.signals.is_empty() {
            if let Err(e) = self.sink.deliver(&published.signals).await {
                self.metrics.increment_delivery_failures();
                warn!(
                    "Delivery of {} signals to {} failed: {:#}",
                    published.signals.len(),
                    self.sink.name(),
                    e
                );
            }
        }

        for alert in &published.alerts {
            self.send_notification(alert).await;
        }

        if self.summary_due(cycle_id) {
            let settings = self.runner.settings();
            let summary = published.summary.notification(
                &published.pairs,
                settings.summary_top_pairs,
                &settings.benchmark,
                published.computed_at,
            );
            self.send_notification(&summary).await;
        }

        log_timing!("Cycle {} finished in {:?}", cycle_id, started.elapsed());

        let metrics = self.metrics.get_metrics();
        log_metrics!(
            "Totals: {} cycles ({} aborted), {} pairs, {} signals, {} exclusions",
            metrics.cycles_completed,
            metrics.cycles_aborted,
            metrics.pairs_discovered,
            metrics.signals_emitted,
            metrics.assets_excluded
        );
        Ok(published)
    }
}

#[async_trait]
impl Strategy for RelativeStrengthService {
    fn name(&self) -> &'static str {
        "relative_strength"
    }

    async fn start(&mut self) -> Result<()> {
        let interval = self.runner.settings().cycle_interval;
        info!("Starting relative strength service, cycle every {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Failures are logged and counted inside; the next tick retries
                    let _ = self.run_once().await;
                }
                _ = self.shutdown.notified() => {
                    info!("Shutdown requested, leaving cycle loop");
                    break;
                }
            }
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let metrics = self.metrics.get_metrics();
        info!(
            "Relative strength service stopped after {:?}: {} cycles, {} aborted, {} signals, {} delivery failures",
            self.metrics.uptime(),
            metrics.cycles_completed,
            metrics.cycles_aborted,
            metrics.signals_emitted,
            metrics.delivery_failures
        );
        Ok(())
    }

    fn metrics(&self) -> StrategyMetrics {
        self.metrics.get_metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone};
    use strengthscan_config::EngineConfig;
    use strengthscan_strategy_shared::{
        test_utils, FailingSink, MarketSnapshot, RecordingSink, StaticMarketSource,
    };
    use strengthscan_types::{AssetId, NotificationKind, PriceBar, PriceSeries, Timeframe};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    const BASE: &str = r#"
        [universe]
        assets = ["BTC", "ETH", "XRP"]
        benchmark = "BTC"

        [[timeframes]]
        timeframe = "1h"
        weight = 1.0
        lookback_bars = 2

        [alerts]
        extreme_move = 0.5
    "#;

    fn settings_with(extra: &str) -> Arc<EngineSettings> {
        let config = EngineConfig::from_toml_str(&format!("{BASE}\n{extra}")).unwrap();
        Arc::new(config.validate().unwrap())
    }

    fn settings() -> Arc<EngineSettings> {
        settings_with("")
    }

    fn series(symbol: &str, first: f64, last: f64) -> PriceSeries {
        let bars = [first, last]
            .iter()
            .enumerate()
            .map(|(i, c)| PriceBar::new(start() + Duration::hours(i as i64), *c, *c, *c, *c, 1.0))
            .collect();
        PriceSeries::new(AssetId::new(symbol).unwrap(), Timeframe::H1, bars)
    }

    fn market(eth_last: f64) -> MarketSnapshot {
        let mut market = MarketSnapshot::new(start());
        market.insert_series(series("BTC", 100.0, 100.0));
        market.insert_series(series("ETH", 100.0, eth_last));
        market.insert_series(series("XRP", 100.0, 95.0));
        market
    }

    #[tokio::test]
    async fn test_run_once_publishes_and_delivers() {
        let source = Arc::new(StaticMarketSource::new(market(110.0)));
        let sink = Arc::new(RecordingSink::new());
        let service = RelativeStrengthService::new(settings(), source.clone(), sink.clone());

        let snapshot = service.run_once().await.unwrap();

        assert_eq!(snapshot.cycle_id, 1);
        assert_eq!(sink.delivered().len(), 1);
        assert_eq!(source.requests()[0].limit, 200);
        assert_eq!(service.metrics().cycles_completed, 1);
        assert!(service.store().latest().is_some());
    }

    #[tokio::test]
    async fn test_second_cycle_sees_prior_gaps() {
        let source = Arc::new(StaticMarketSource::new(market(110.0)));
        let sink = Arc::new(RecordingSink::new());
        let service = RelativeStrengthService::new(settings(), source.clone(), sink);

        service.run_once().await.unwrap();
        source.set_snapshot(market(120.0));
        let second = service.run_once().await.unwrap();

        assert_eq!(second.cycle_id, 2);
        let pair = &second.pairs[0];
        assert!((pair.supporting_metrics.prior_gap.unwrap() - 0.15).abs() < 1e-9);
        // Single timeframe: short and long legs coincide, so trends always align
        assert_eq!(
            pair.opportunity_type,
            strengthscan_types::OpportunityType::Breakout
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_snapshot() {
        let source = Arc::new(StaticMarketSource::new(market(110.0)));
        let sink = Arc::new(RecordingSink::new());
        let service = RelativeStrengthService::new(settings(), source.clone(), sink);
        service.run_once().await.unwrap();

        let mut broken = market(110.0);
        broken.record_failure(AssetId::new("BTC").unwrap(), "exchange down");
        source.set_snapshot(broken);
        assert!(service.run_once().await.is_err());

        assert_eq!(service.store().latest().unwrap().cycle_id, 1);
        assert_eq!(service.metrics().cycles_aborted, 1);
    }

    #[tokio::test]
    async fn test_source_error_aborts_without_publishing() {
        let source = Arc::new(StaticMarketSource::failing("connection refused"));
        let sink = Arc::new(RecordingSink::new());
        let service = RelativeStrengthService::new(settings(), source, sink.clone());

        let err = service.run_once().await.unwrap_err();

        assert!(format!("{err:#}").contains("connection refused"));
        assert!(service.store().latest().is_none());
        assert_eq!(service.metrics().cycles_aborted, 1);
        assert_eq!(sink.batches(), 0);
    }

    #[tokio::test]
    async fn test_delivery_failure_keeps_new_snapshot() {
        let source = Arc::new(StaticMarketSource::new(market(110.0)));
        let sink = Arc::new(FailingSink::new());
        let service = RelativeStrengthService::new(settings(), source, sink.clone());

        let snapshot = service.run_once().await.unwrap();

        assert_eq!(sink.attempts(), 1);
        let metrics = service.metrics();
        assert_eq!(metrics.delivery_failures, 1);
        assert_eq!(metrics.cycles_completed, 1);
        let latest = service.store().latest().unwrap();
        assert_eq!(latest.cycle_id, snapshot.cycle_id);
        assert_eq!(latest.signals.len(), 1);
    }

    #[tokio::test]
    async fn test_alerts_and_summary_are_notified() {
        let source = Arc::new(StaticMarketSource::new(market(110.0)));
        let sink = Arc::new(RecordingSink::new());
        let service = RelativeStrengthService::new(
            settings_with("[summary]\nnotify_every_cycles = 2\n"),
            source,
            sink.clone(),
        );

        // Cycle 1: no alert at a 50% threshold, summary not due yet
        service.run_once().await.unwrap();
        assert!(sink.notifications().is_empty());

        service.run_once().await.unwrap();
        let notifications = sink.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind(), NotificationKind::MarketSummary);
        assert!(notifications[0].message().contains("1. ETH/XRP"));

        let alerting = Arc::new(RecordingSink::new());
        let service = RelativeStrengthService::new(
            settings_with(""),
            Arc::new(StaticMarketSource::new(market(180.0))),
            alerting.clone(),
        );
        service.run_once().await.unwrap();
        let notifications = alerting.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind(), NotificationKind::MarketAlert);
        assert!(notifications[0].message().starts_with("Coins affected: ETH"));
    }

    #[tokio::test]
    async fn test_start_stops_on_shutdown() {
        let source = Arc::new(StaticMarketSource::new(market(110.0)));
        let sink = Arc::new(RecordingSink::new());
        let mut service = RelativeStrengthService::new(settings(), source, sink);
        test_utils::assert_strategy_named(&service, "relative_strength");

        service.shutdown_handle().notify_one();
        service.start().await.unwrap();
        service.stop().await.unwrap();
    }
}
