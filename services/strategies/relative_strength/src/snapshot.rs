//! Latest published cycle
//!
//! Readers clone the `Arc` and keep a consistent view for as long as they hold
//! it; publishing swaps the pointer and never touches a snapshot in place.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::cycle::CycleSnapshot;
use crate::pairs::GapHistory;

#[derive(Debug, Default)]
pub struct SnapshotStore {
    latest: RwLock<Option<Arc<CycleSnapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Arc<CycleSnapshot>> {
        self.latest.read().clone()
    }

    /// Replace the latest snapshot, returning the one it superseded
    pub fn publish(&self, snapshot: CycleSnapshot) -> Option<Arc<CycleSnapshot>> {
        self.swap(Arc::new(snapshot))
    }

    pub fn swap(&self, snapshot: Arc<CycleSnapshot>) -> Option<Arc<CycleSnapshot>> {
        self.latest.write().replace(snapshot)
    }

    /// Gaps recorded by the latest snapshot; empty before the first cycle
    pub fn prior_gaps(&self) -> GapHistory {
        self.latest()
            .map(|snapshot| snapshot.gap_history())
            .unwrap_or_default()
    }

    /// Latest snapshot as pretty JSON, for the dashboard boundary
    pub fn latest_json(&self) -> serde_json::Result<Option<String>> {
        self.latest()
            .map(|snapshot| serde_json::to_string_pretty(snapshot.as_ref()))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairs::RecordedGap;
    use crate::summary::MarketSummary;
    use chrono::{TimeZone, Utc};
    use strengthscan_types::AssetId;

    fn snapshot(cycle_id: u64) -> CycleSnapshot {
        CycleSnapshot {
            cycle_id,
            computed_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            rankings: Vec::new(),
            composites: Vec::new(),
            pairs: Vec::new(),
            signals: Vec::new(),
            recorded_gaps: vec![RecordedGap {
                strong: AssetId::new("ETH").unwrap(),
                weak: AssetId::new("XRP").unwrap(),
                gap: 0.04,
            }],
            excluded: Vec::new(),
            strength_flags: Vec::new(),
            alerts: Vec::new(),
            summary: MarketSummary::build(&[], 0, 0, &[], 0.005),
        }
    }

    #[test]
    fn test_publish_swaps_and_readers_keep_their_view() {
        let store = SnapshotStore::new();
        assert!(store.latest().is_none());
        assert!(store.prior_gaps().is_empty());

        store.publish(snapshot(1));
        let held = store.latest().unwrap();
        let previous = store.publish(snapshot(2)).unwrap();

        assert_eq!(held.cycle_id, 1);
        assert_eq!(previous.cycle_id, 1);
        assert_eq!(store.latest().unwrap().cycle_id, 2);
        assert_eq!(store.prior_gaps().len(), 1);
    }

    #[test]
    fn test_latest_json() {
        let store = SnapshotStore::new();
        assert!(store.latest_json().unwrap().is_none());
        store.publish(snapshot(7));
        let json = store.latest_json().unwrap().unwrap();
        assert!(json.contains("\"cycle_id\": 7"));
        assert!(json.contains("\"regime\": \"NEUTRAL\""));
    }
}
