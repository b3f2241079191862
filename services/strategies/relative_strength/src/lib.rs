//! # Relative Strength Strategy
//!
//! Ranks a crypto universe by strength relative to a benchmark (BTC) across
//! several timeframes and surfaces strong/weak pair opportunities.
//!
//! ## Pipeline
//!
//! ```text
//! MarketDataSource ─► normalizer ─► calculator ─► aggregator ─► ranker
//!                                                                 │
//!        SignalSink ◄─ emitter ◄─ pairs (classification + confidence)
//!            ▲
//!            └──── alerts (strength flags, extreme moves) + summary
//! ```
//!
//! Every stage is a pure function of its inputs plus [`EngineSettings`]. The
//! [`cycle::CycleRunner`] wires them together for one cycle and the
//! [`scheduler::RelativeStrengthService`] repeats that on an interval,
//! publishing each result to a [`snapshot::SnapshotStore`].
//!
//! [`EngineSettings`]: strengthscan_config::EngineSettings

pub mod logging;

pub mod aggregator;
pub mod alerts;
pub mod calculator;
pub mod confidence;
pub mod cycle;
pub mod emitter;
pub mod normalizer;
pub mod pairs;
pub mod ranker;
pub mod scheduler;
pub mod sinks;
pub mod snapshot;
pub mod sources;
pub mod summary;

pub use cycle::{CycleRunner, CycleSnapshot, ExclusionRecord};
pub use emitter::SignalEmitter;
pub use pairs::{DiscoveryOutcome, GapHistory, PairDiscovery, RecordedGap};
pub use scheduler::RelativeStrengthService;
pub use sinks::{JsonlFileSink, LogSink};
pub use snapshot::SnapshotStore;
pub use sources::JsonFileSource;
pub use summary::{MarketRegime, MarketSummary};
