//! Pair opportunity and signal definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::identifiers::AssetId;

/// How a strong/weak pair is expected to evolve.
///
/// Serialized as a snake_case tag; consumers outside this workspace should treat
/// the tag as an open set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityType {
    /// Short-term moves contradict the longer trend for both legs; the gap may compress
    MeanReversion,
    /// Both legs trend consistently and the gap widened since the prior cycle
    Breakout,
    /// Gap exceeds threshold without either pattern
    Divergence,
}

impl OpportunityType {
    pub fn label(self) -> &'static str {
        match self {
            OpportunityType::MeanReversion => "Mean Reversion",
            OpportunityType::Breakout => "Breakout",
            OpportunityType::Divergence => "Divergence",
        }
    }

    /// One-line reading of the opportunity for notification bodies
    pub fn entry_logic(self) -> &'static str {
        match self {
            OpportunityType::MeanReversion => "short-term moves oppose the trend, gap may compress",
            OpportunityType::Breakout => "trend aligned and gap widening, gap may extend",
            OpportunityType::Divergence => "strong vs weak relative momentum",
        }
    }
}

impl fmt::Display for OpportunityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs that went into a pair's classification and confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingMetrics {
    /// strong.composite - weak.composite
    pub gap: f64,
    /// Gap recorded for the same pair in the previous cycle
    pub prior_gap: Option<f64>,
    /// weak.rank - strong.rank
    pub rank_distance: usize,
    /// Gap scaled into [0, 1]
    pub normalized_gap: f64,
    /// Rank distance scaled into [0, 1]
    pub normalized_rank_distance: f64,
    /// Fraction of configured timeframes where strong individually beats weak
    pub timeframe_agreement: f64,
    /// Either composite was built from incomplete data
    pub incomplete_input: bool,
}

/// A strong asset paired against a weaker one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairOpportunity {
    pub strong_asset: AssetId,
    pub weak_asset: AssetId,
    pub strong_rank: usize,
    pub weak_rank: usize,
    pub opportunity_type: OpportunityType,
    /// Bounded to [0, 1]
    pub confidence: f64,
    pub supporting_metrics: SupportingMetrics,
}

impl PairOpportunity {
    /// `STRONG/WEAK` pair label
    pub fn pair_label(&self) -> String {
        format!("{}/{}", self.strong_asset, self.weak_asset)
    }
}

/// Delivery priority understood by push-notification channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalPriority {
    Min,
    Low,
    Default,
    High,
    Max,
}

impl SignalPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalPriority::Min => "min",
            SignalPriority::Low => "low",
            SignalPriority::Default => "default",
            SignalPriority::High => "high",
            SignalPriority::Max => "max",
        }
    }
}

/// Fully rendered alert handed to the notification collaborator.
///
/// Fields are private: a signal is never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pair: PairOpportunity,
    generated_at: DateTime<Utc>,
    title: String,
    message: String,
    tags: Vec<String>,
    priority: SignalPriority,
}

impl Signal {
    pub fn new(
        pair: PairOpportunity,
        generated_at: DateTime<Utc>,
        title: String,
        message: String,
        tags: Vec<String>,
        priority: SignalPriority,
    ) -> Self {
        Self {
            pair,
            generated_at,
            title,
            message,
            tags,
            priority,
        }
    }

    pub fn pair(&self) -> &PairOpportunity {
        &self.pair
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn priority(&self) -> SignalPriority {
        self.priority
    }

    pub fn confidence(&self) -> f64 {
        self.pair.confidence
    }
}

/// What a [`Notification`] reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Periodic market overview: regime, top pairs, breadth
    MarketSummary,
    /// Universe-level condition such as an extreme move against the benchmark
    MarketAlert,
}

/// Rendered notification that is not tied to a single pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    kind: NotificationKind,
    generated_at: DateTime<Utc>,
    title: String,
    message: String,
    tags: Vec<String>,
    priority: SignalPriority,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        generated_at: DateTime<Utc>,
        title: String,
        message: String,
        tags: Vec<String>,
        priority: SignalPriority,
    ) -> Self {
        Self {
            kind,
            generated_at,
            title,
            message,
            tags,
            priority,
        }
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn priority(&self) -> SignalPriority {
        self.priority
    }
}

/// Per-cycle signal statistics
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    pub total_signals: u64,
    pub mean_reversion_signals: u64,
    pub breakout_signals: u64,
    pub divergence_signals: u64,
    pub avg_confidence: f64,
}

impl SignalStats {
    pub fn record_signal(&mut self, signal: &Signal) {
        self.total_signals += 1;

        match signal.pair().opportunity_type {
            OpportunityType::MeanReversion => self.mean_reversion_signals += 1,
            OpportunityType::Breakout => self.breakout_signals += 1,
            OpportunityType::Divergence => self.divergence_signals += 1,
        }

        // Rolling average
        let total_confidence =
            self.avg_confidence * (self.total_signals - 1) as f64 + signal.confidence();
        self.avg_confidence = total_confidence / self.total_signals as f64;
    }

    pub fn from_signals(signals: &[Signal]) -> Self {
        let mut stats = Self::default();
        for signal in signals {
            stats.record_signal(signal);
        }
        stats
    }
}
