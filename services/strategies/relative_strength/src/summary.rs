//! Market breadth summary for one cycle, and its periodic notification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use strengthscan_types::{
    AssetId, Notification, NotificationKind, PairOpportunity, RankEntry, Signal, SignalPriority,
    SignalStats,
};

/// Universe-wide reading of relative strength against the benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRegime {
    /// Mean composite above the neutral band: the universe outperforms the benchmark
    Bullish,
    /// Mean composite below the negative neutral band
    Bearish,
    Neutral,
}

impl MarketRegime {
    pub fn from_mean(mean_composite: f64, neutral_band: f64) -> Self {
        if mean_composite > neutral_band {
            MarketRegime::Bullish
        } else if mean_composite < -neutral_band {
            MarketRegime::Bearish
        } else {
            MarketRegime::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MarketRegime::Bullish => "BULLISH",
            MarketRegime::Bearish => "BEARISH",
            MarketRegime::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub assets_ranked: usize,
    pub assets_excluded: usize,
    /// Composite above the neutral band
    pub outperforming: usize,
    /// Composite below the negative neutral band
    pub underperforming: usize,
    pub mean_composite: f64,
    pub strongest: Option<AssetId>,
    pub weakest: Option<AssetId>,
    pub regime: MarketRegime,
    /// Assets carrying at least one strength flag
    pub strong_assets: usize,
    pub signal_stats: SignalStats,
}

impl MarketSummary {
    pub fn build(
        rankings: &[RankEntry],
        assets_excluded: usize,
        strong_assets: usize,
        signals: &[Signal],
        neutral_band: f64,
    ) -> Self {
        let mean_composite = if rankings.is_empty() {
            0.0
        } else {
            rankings.iter().map(|e| e.composite_score).sum::<f64>() / rankings.len() as f64
        };

        Self {
            assets_ranked: rankings.len(),
            assets_excluded,
            outperforming: rankings
                .iter()
                .filter(|e| e.composite_score > neutral_band)
                .count(),
            underperforming: rankings
                .iter()
                .filter(|e| e.composite_score < -neutral_band)
                .count(),
            mean_composite,
            strongest: rankings.first().map(|e| e.asset.clone()),
            weakest: rankings.last().map(|e| e.asset.clone()),
            regime: MarketRegime::from_mean(mean_composite, neutral_band),
            strong_assets,
            signal_stats: SignalStats::from_signals(signals),
        }
    }

    /// Render the periodic summary notification. `pairs` are expected in
    /// confidence order; the first `top_pairs` are listed.
    pub fn notification(
        &self,
        pairs: &[PairOpportunity],
        top_pairs: usize,
        benchmark: &AssetId,
        generated_at: DateTime<Utc>,
    ) -> Notification {
        let mut lines = vec![
            format!("📅 Report Time: {}", generated_at.format("%Y-%m-%d %H:%M UTC")),
            format!("Market Status: {}", self.regime),
            format!(
                "Mean Strength vs {benchmark}: {:+.2} pp",
                self.mean_composite * 100.0
            ),
            String::new(),
            "🏆 Top Trading Pairs:".to_string(),
        ];
        if pairs.is_empty() || top_pairs == 0 {
            lines.push("No qualifying pairs".to_string());
        }
        for (i, pair) in pairs.iter().take(top_pairs).enumerate() {
            lines.push(format!(
                "{}. {} - {} (Confidence: {:.0}%)",
                i + 1,
                pair.pair_label(),
                pair.opportunity_type,
                pair.confidence * 100.0
            ));
        }
        lines.extend([
            String::new(),
            "⚡ Market Stats:".to_string(),
            format!("Total Coins Analyzed: {}", self.assets_ranked),
            format!("Excluded: {}", self.assets_excluded),
            format!(
                "Outperforming / Underperforming: {} / {}",
                self.outperforming, self.underperforming
            ),
            format!("Strong Signals: {}", self.strong_assets),
            format!("Pair Signals: {}", self.signal_stats.total_signals),
        ]);

        Notification::new(
            NotificationKind::MarketSummary,
            generated_at,
            "📊 Crypto Market Summary".to_string(),
            lines.join("\n"),
            vec!["bar_chart".to_string(), "calendar".to_string()],
            SignalPriority::Default,
        )
    }
}

impl fmt::Display for MarketSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | ranked {} (excluded {}) | {} up / {} down | mean {:+.2} pp | {} signals",
            self.regime,
            self.assets_ranked,
            self.assets_excluded,
            self.outperforming,
            self.underperforming,
            self.mean_composite * 100.0,
            self.signal_stats.total_signals
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use strengthscan_types::{OpportunityType, SupportingMetrics};

    fn entry(symbol: &str, score: f64, rank: usize) -> RankEntry {
        RankEntry {
            asset: AssetId::new(symbol).unwrap(),
            composite_score: score,
            rank,
            percentile: 0.0,
        }
    }

    #[test]
    fn test_breadth_counts() {
        let rankings = vec![
            entry("ETH", 0.035, 1),
            entry("SOL", -0.001, 2),
            entry("XRP", -0.02, 3),
        ];
        let summary = MarketSummary::build(&rankings, 1, 1, &[], 0.005);

        assert_eq!(summary.assets_ranked, 3);
        assert_eq!(summary.assets_excluded, 1);
        assert_eq!(summary.outperforming, 1);
        assert_eq!(summary.underperforming, 1);
        assert_eq!(summary.strongest.as_ref().map(|a| a.as_str()), Some("ETH"));
        assert_eq!(summary.weakest.as_ref().map(|a| a.as_str()), Some("XRP"));
        assert_eq!(summary.regime, MarketRegime::Neutral);
    }

    #[test]
    fn test_regime_thresholds() {
        assert_eq!(MarketRegime::from_mean(0.01, 0.005), MarketRegime::Bullish);
        assert_eq!(MarketRegime::from_mean(-0.01, 0.005), MarketRegime::Bearish);
        assert_eq!(MarketRegime::from_mean(0.005, 0.005), MarketRegime::Neutral);
    }

    #[test]
    fn test_empty_ranking() {
        let summary = MarketSummary::build(&[], 0, 0, &[], 0.005);
        assert_eq!(summary.mean_composite, 0.0);
        assert!(summary.strongest.is_none());
    }

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

    #[test]
    fn test_summary_notification_layout() {
        let rankings = vec![
            entry("ETH", 0.035, 1),
            entry("SOL", -0.001, 2),
            entry("XRP", -0.02, 3),
        ];
        let summary = MarketSummary::build(&rankings, 1, 1, &[], 0.005);
        let pairs = vec![
            pair("ETH", "XRP", 0.82),
            pair("ETH", "SOL", 0.7),
            pair("SOL", "XRP", 0.65),
            pair("ADA", "XRP", 0.61),
        ];
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let notification =
            summary.notification(&pairs, 3, &AssetId::new("BTC").unwrap(), at);

        assert_eq!(notification.kind(), NotificationKind::MarketSummary);
        assert_eq!(notification.title(), "📊 Crypto Market Summary");
        assert_eq!(notification.priority(), SignalPriority::Default);
        assert_eq!(notification.tags(), ["bar_chart", "calendar"]);

        let message = notification.message();
        assert!(message.starts_with("📅 Report Time: 2024-06-01 08:00 UTC\nMarket Status: NEUTRAL"));
        assert!(message.contains("1. ETH/XRP - Divergence (Confidence: 82%)"));
        assert!(message.contains("3. SOL/XRP"));
        assert!(!message.contains("ADA/XRP"));
        assert!(message.contains("Total Coins Analyzed: 3"));
        assert!(message.contains("Strong Signals: 1"));
    }

    #[test]
    fn test_summary_notification_without_pairs() {
        let summary = MarketSummary::build(&[entry("ETH", 0.01, 1)], 0, 0, &[], 0.005);
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let notification = summary.notification(&[], 3, &AssetId::new("BTC").unwrap(), at);
        assert!(notification.message().contains("No qualifying pairs"));
        assert!(notification.message().contains("Market Status: BULLISH"));
    }
}
