//! Strategy metrics collection

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Thread-safe metrics collector for strategies
#[derive(Debug)]
pub struct MetricsCollector {
    start_time: Instant,
    cycles_completed: AtomicU64,
    cycles_aborted: AtomicU64,
    assets_excluded: AtomicU64,
    pairs_discovered: AtomicU64,
    signals_emitted: AtomicU64,
    delivery_failures: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            cycles_completed: AtomicU64::new(0),
            cycles_aborted: AtomicU64::new(0),
            assets_excluded: AtomicU64::new(0),
            pairs_discovered: AtomicU64::new(0),
            signals_emitted: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
        }
    }

    /// Record a completed cycle and its output counts
    pub fn record_cycle(&self, assets_excluded: usize, pairs: usize, signals: usize) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        self.assets_excluded
            .fetch_add(assets_excluded as u64, Ordering::Relaxed);
        self.pairs_discovered.fetch_add(pairs as u64, Ordering::Relaxed);
        self.signals_emitted.fetch_add(signals as u64, Ordering::Relaxed);
    }

    pub fn increment_aborted(&self) {
        self.cycles_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_delivery_failures(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self) -> super::StrategyMetrics {
        super::StrategyMetrics {
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            cycles_aborted: self.cycles_aborted.load(Ordering::Relaxed),
            assets_excluded: self.assets_excluded.load(Ordering::Relaxed),
            pairs_discovered: self.pairs_discovered.load(Ordering::Relaxed),
            signals_emitted: self.signals_emitted.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = MetricsCollector::new();
        metrics.record_cycle(2, 5, 3);
        metrics.record_cycle(0, 1, 1);
        metrics.increment_aborted();

        let snapshot = metrics.get_metrics();
        assert_eq!(snapshot.cycles_completed, 2);
        assert_eq!(snapshot.cycles_aborted, 1);
        assert_eq!(snapshot.assets_excluded, 2);
        assert_eq!(snapshot.pairs_discovered, 6);
        assert_eq!(snapshot.signals_emitted, 4);
    }
}
