//! Signal emission
//!
//! Caps a cycle's qualifying pairs and renders each survivor into a
//! notification-ready [`Signal`]. Pairs beyond the cap are dropped, not queued.

use chrono::{DateTime, Utc};

use strengthscan_config::EngineSettings;
use strengthscan_types::{OpportunityType, PairOpportunity, Signal, SignalPriority};

use crate::pairs::sort_by_confidence;

#[derive(Debug, Clone)]
pub struct SignalEmitter {
    max_signals: usize,
    high_priority_confidence: f64,
}

impl SignalEmitter {
    pub fn new(max_signals: usize, high_priority_confidence: f64) -> Self {
        Self {
            max_signals,
            high_priority_confidence,
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(
            settings.max_signals_per_cycle,
            settings.high_priority_confidence,
        )
    }

    /// Top `max_signals` pairs by confidence, rendered
    pub fn emit(&self, pairs: &[PairOpportunity], generated_at: DateTime<Utc>) -> Vec<Signal> {
        let mut ranked = pairs.to_vec();
        sort_by_confidence(&mut ranked);
        ranked.truncate(self.max_signals);
        ranked
            .into_iter()
            .map(|pair| self.render(pair, generated_at))
            .collect()
    }

    fn priority(&self, confidence: f64) -> SignalPriority {
        if confidence >= self.high_priority_confidence {
            SignalPriority::High
        } else {
            SignalPriority::Default
        }
    }

    fn render(&self, pair: PairOpportunity, generated_at: DateTime<Utc>) -> Signal {
        let title = format!(
            "{} Pair Signal: {}",
            title_emoji(pair.opportunity_type),
            pair.pair_label()
        );
        let message = render_message(&pair);
        let tags = tags_for(pair.opportunity_type);
        let priority = self.priority(pair.confidence);
        Signal::new(pair, generated_at, title, message, tags, priority)
    }
}

fn title_emoji(opportunity_type: OpportunityType) -> &'static str {
    match opportunity_type {
        OpportunityType::MeanReversion => "↔️",
        OpportunityType::Breakout => "🚀",
        OpportunityType::Divergence => "📈",
    }
}

fn tags_for(opportunity_type: OpportunityType) -> Vec<String> {
    let (icon, kind) = match opportunity_type {
        OpportunityType::MeanReversion => ("left_right_arrow", "mean_reversion"),
        OpportunityType::Breakout => ("rocket", "breakout"),
        OpportunityType::Divergence => ("chart_increasing", "divergence"),
    };
    vec![icon.to_string(), kind.to_string(), "moneybag".to_string()]
}

/// Gap in percentage points, confidence in percent
fn render_message(pair: &PairOpportunity) -> String {
    let metrics = &pair.supporting_metrics;
    let mut lines = vec![
        format!(
            "Long {} (rank {}) / Short {} (rank {})",
            pair.strong_asset, pair.strong_rank, pair.weak_asset, pair.weak_rank
        ),
        format!("Type: {}", pair.opportunity_type),
        format!("Gap: {:.2} pp", metrics.gap * 100.0),
        format!("Confidence: {:.0}%", pair.confidence * 100.0),
    ];
    if let Some(prior) = metrics.prior_gap {
        lines.push(format!("Prior Gap: {:.2} pp", prior * 100.0));
    }
    lines.push(format!(
        "Timeframe Agreement: {:.0}%",
        metrics.timeframe_agreement * 100.0
    ));
    lines.push(format!(
        "Entry Logic: {}",
        pair.opportunity_type.entry_logic()
    ));
    if metrics.incomplete_input {
        lines.push("Note: scored from incomplete data".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use strengthscan_types::{AssetId, SupportingMetrics};

    fn pair(strong: &str, weak: &str, confidence: f64) -> PairOpportunity {
        PairOpportunity {
            strong_asset: AssetId::new(strong).unwrap(),
            weak_asset: AssetId::new(weak).unwrap(),
            strong_rank: 1,
            weak_rank: 3,
            opportunity_type: OpportunityType::Divergence,
            confidence,
            supporting_metrics: SupportingMetrics {
                gap: 0.055,
                prior_gap: None,
                rank_distance: 2,
                normalized_gap: 0.55,
                normalized_rank_distance: 1.0,
                timeframe_agreement: 1.0,
                incomplete_input: false,
            },
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_cap_keeps_highest_confidence() {
        let pairs = vec![
            pair("ETH", "XRP", 0.65),
            pair("SOL", "XRP", 0.91),
            pair("ADA", "XRP", 0.70),
            pair("BNB", "XRP", 0.62),
            pair("DOT", "XRP", 0.88),
        ];
        let signals = SignalEmitter::new(3, 0.8).emit(&pairs, now());

        let confidences: Vec<f64> = signals.iter().map(|s| s.confidence()).collect();
        assert_eq!(confidences, vec![0.91, 0.88, 0.70]);
    }

    #[test]
    fn test_rendering() {
        let signals = SignalEmitter::new(3, 0.8).emit(&[pair("ETH", "XRP", 0.82)], now());
        let signal = &signals[0];

        assert_eq!(signal.title(), "📈 Pair Signal: ETH/XRP");
        assert_eq!(signal.priority(), SignalPriority::High);
        assert_eq!(signal.generated_at(), now());
        assert!(signal.message().contains("Long ETH (rank 1) / Short XRP (rank 3)"));
        assert!(signal.message().contains("Gap: 5.50 pp"));
        assert!(signal.message().contains("Confidence: 82%"));
        assert!(signal.tags().contains(&"divergence".to_string()));
    }

    #[test]
    fn test_title_follows_opportunity_type() {
        let mut breakout = pair("ETH", "XRP", 0.7);
        breakout.opportunity_type = OpportunityType::Breakout;
        let mut reversion = pair("SOL", "XRP", 0.6);
        reversion.opportunity_type = OpportunityType::MeanReversion;

        let signals = SignalEmitter::new(3, 0.8).emit(&[breakout, reversion], now());
        assert_eq!(signals[0].title(), "🚀 Pair Signal: ETH/XRP");
        assert_eq!(signals[1].title(), "↔️ Pair Signal: SOL/XRP");
        assert_eq!(signals[1].tags()[0], "left_right_arrow");
    }

    #[test]
    fn test_default_priority_below_threshold() {
        let signals = SignalEmitter::new(3, 0.8).emit(&[pair("ETH", "XRP", 0.79)], now());
        assert_eq!(signals[0].priority(), SignalPriority::Default);
    }

    #[test]
    fn test_ties_are_stable_on_ids() {
        let signals = SignalEmitter::new(1, 0.8)
            .emit(&[pair("SOL", "XRP", 0.7), pair("ADA", "XRP", 0.7)], now());
        assert_eq!(signals[0].pair().strong_asset.as_str(), "ADA");
    }
}
