//! # StrengthScan Types Library
//!
//! Shared data model for the relative strength engine: price series, per-timeframe
//! strength scores, composite rankings, pair opportunities and rendered signals.
//!
//! ## Design Philosophy
//!
//! - **Immutable Values**: Every entity is produced once per cycle and never mutated
//!   after handoff; `Signal` keeps its fields private to enforce this
//! - **Explicit Gaps**: Missing bars are recorded, never interpolated
//! - **Closed Vocabularies**: Timeframes and opportunity types are enums, so new
//!   cases are handled exhaustively at compile time
//! - **Deterministic Ordering**: `AssetId` ordering is the universal tie-breaker
//!
//! ## Quick Start
//!
//! ```rust
//! use strengthscan_types::{AssetId, PriceBar, PriceSeries, Timeframe};
//! use chrono::{TimeZone, Utc};
//!
//! let eth = AssetId::new("eth").unwrap();
//! assert_eq!(eth.as_str(), "ETH");
//!
//! let tf: Timeframe = "1h".parse().unwrap();
//! let bar = PriceBar::new(Utc.timestamp_opt(3_600, 0).unwrap(), 1.0, 1.1, 0.9, 1.05, 10.0);
//! let series = PriceSeries::new(eth, tf, vec![bar]);
//! assert_eq!(series.len(), 1);
//! ```
//!
//! ## Integration Points
//!
//! - **Config**: `Timeframe` and `AssetId` parsing backs configuration validation
//! - **Engine**: every pipeline stage consumes and produces these types
//! - **Dashboard / Notifier**: snapshots and signals serialize to JSON via serde

pub mod analytics;
pub mod common;
pub mod market_data;
pub mod signals;

pub use analytics::{CompositeScore, RankEntry, StrengthFlag, StrengthScore};
pub use common::errors::{EngineError, ValidationError};
pub use common::identifiers::AssetId;
pub use market_data::{Gap, PriceBar, PriceSeries, Timeframe};
pub use signals::{
    Notification, NotificationKind, OpportunityType, PairOpportunity, Signal, SignalPriority,
    SignalStats, SupportingMetrics,
};

/// Result alias used across the engine crates
pub type Result<T> = std::result::Result<T, EngineError>;
