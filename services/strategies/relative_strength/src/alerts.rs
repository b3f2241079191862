//! Per-asset strength flags and market alerts
//!
//! Flags mark assets whose single-timeframe strength beats a configured
//! threshold (`STRONG_VS_BTC_1H` and friends). Extreme move alerts fire when an
//! asset moves further than `extreme_move` against the benchmark on any
//! timeframe, in either direction.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use strengthscan_config::StrengthThreshold;
use strengthscan_types::{
    AssetId, CompositeScore, Notification, NotificationKind, SignalPriority, StrengthFlag,
    Timeframe,
};

/// Coins named in an alert before the list is cut short
const AFFECTED_LISTED: usize = 3;

/// Flags for every (asset, threshold) whose strength is strictly above the threshold.
/// Follows the order of `composites`, then threshold order.
pub fn strength_flags(
    composites: &[CompositeScore],
    thresholds: &[StrengthThreshold],
) -> Vec<StrengthFlag> {
    let mut flags = Vec::new();
    for composite in composites {
        for threshold in thresholds {
            match composite.score_for(threshold.timeframe) {
                Some(value) if value > threshold.min_strength => flags.push(StrengthFlag {
                    asset: composite.asset.clone(),
                    timeframe: threshold.timeframe,
                    value,
                    threshold: threshold.min_strength,
                }),
                _ => {}
            }
        }
    }
    flags
}

/// Number of distinct assets carrying at least one flag
pub fn flagged_assets(flags: &[StrengthFlag]) -> usize {
    let mut assets: Vec<&AssetId> = flags.iter().map(|flag| &flag.asset).collect();
    assets.sort();
    assets.dedup();
    assets.len()
}

/// One alert per timeframe on which at least one asset's absolute strength
/// exceeds `extreme_move`, shortest timeframe first
pub fn extreme_move_alerts(
    composites: &[CompositeScore],
    extreme_move: f64,
    benchmark: &AssetId,
    generated_at: DateTime<Utc>,
) -> Vec<Notification> {
    let mut movers: BTreeMap<Timeframe, Vec<(&AssetId, f64)>> = BTreeMap::new();
    for composite in composites {
        for (timeframe, score) in &composite.contributing_timeframes {
            if score.value.abs() > extreme_move {
                movers
                    .entry(*timeframe)
                    .or_default()
                    .push((&composite.asset, score.value.abs()));
            }
        }
    }

    movers
        .into_iter()
        .map(|(timeframe, mut affected)| {
            affected.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            render_alert(timeframe, &affected, extreme_move, benchmark, generated_at)
        })
        .collect()
}

fn render_alert(
    timeframe: Timeframe,
    affected: &[(&AssetId, f64)],
    extreme_move: f64,
    benchmark: &AssetId,
    generated_at: DateTime<Utc>,
) -> Notification {
    let listed: Vec<String> = affected
        .iter()
        .take(AFFECTED_LISTED)
        .map(|(asset, _)| asset.to_string())
        .collect();
    let more = if affected.len() > AFFECTED_LISTED { "..." } else { "" };
    let largest = affected.first().map(|(_, value)| *value).unwrap_or(0.0);

    let message = [
        format!("Coins affected: {}{more}", listed.join(", ")),
        format!("Metric: absolute {timeframe} strength vs {benchmark} (%)"),
        format!("Current Value: {:.2}", largest * 100.0),
        format!("Threshold: {:.2}", extreme_move * 100.0),
        "Status: ABOVE threshold".to_string(),
    ]
    .join("\n");

    Notification::new(
        NotificationKind::MarketAlert,
        generated_at,
        "🚨 Market Alert: Extreme Move".to_string(),
        message,
        vec!["warning".to_string(), "exclamation".to_string()],
        SignalPriority::High,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use strengthscan_types::StrengthScore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn id(symbol: &str) -> AssetId {
        AssetId::new(symbol).unwrap()
    }

    fn composite(symbol: &str, scores: &[(Timeframe, f64)]) -> CompositeScore {
        let contributing: BTreeMap<Timeframe, StrengthScore> = scores
            .iter()
            .map(|&(timeframe, value)| {
                (
                    timeframe,
                    StrengthScore {
                        asset: id(symbol),
                        timeframe,
                        value,
                        computed_at: now(),
                        incomplete: false,
                    },
                )
            })
            .collect();
        CompositeScore {
            asset: id(symbol),
            value: scores.iter().map(|(_, v)| v).sum::<f64>() / scores.len() as f64,
            effective_weights: contributing
                .keys()
                .map(|tf| (*tf, 1.0 / scores.len() as f64))
                .collect(),
            contributing_timeframes: contributing,
            excluded_timeframes: Vec::new(),
            incomplete: false,
            computed_at: now(),
        }
    }

    fn thresholds() -> Vec<StrengthThreshold> {
        vec![
            StrengthThreshold {
                timeframe: Timeframe::H1,
                min_strength: 0.02,
            },
            StrengthThreshold {
                timeframe: Timeframe::H4,
                min_strength: 0.05,
            },
        ]
    }

    #[test]
    fn test_flags_are_strictly_above_threshold() {
        let composites = vec![
            composite("ETH", &[(Timeframe::H1, 0.03), (Timeframe::H4, 0.06)]),
            composite("SOL", &[(Timeframe::H1, 0.02), (Timeframe::H4, 0.051)]),
            composite("XRP", &[(Timeframe::H1, -0.04)]),
        ];
        let flags = strength_flags(&composites, &thresholds());

        let labels: Vec<String> = flags
            .iter()
            .map(|flag| format!("{} {}", flag.asset, flag.label(&id("BTC"))))
            .collect();
        assert_eq!(
            labels,
            vec![
                "ETH STRONG_VS_BTC_1H",
                "ETH STRONG_VS_BTC_4H",
                "SOL STRONG_VS_BTC_4H"
            ]
        );
        assert_eq!(flagged_assets(&flags), 2);
    }

    #[test]
    fn test_missing_timeframe_is_never_flagged() {
        let composites = vec![composite("ADA", &[(Timeframe::D1, 0.5)])];
        assert!(strength_flags(&composites, &thresholds()).is_empty());
    }

    #[test]
    fn test_extreme_moves_grouped_by_timeframe() {
        let composites = vec![
            composite("ETH", &[(Timeframe::H1, 0.12), (Timeframe::D1, 0.01)]),
            composite("SOL", &[(Timeframe::H1, 0.15)]),
            composite("DOGE", &[(Timeframe::H1, -0.11)]),
            composite("ADA", &[(Timeframe::H1, 0.105)]),
            composite("XRP", &[(Timeframe::H1, 0.05)]),
        ];
        let alerts = extreme_move_alerts(&composites, 0.10, &id("BTC"), now());

        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.kind(), NotificationKind::MarketAlert);
        assert_eq!(alert.title(), "🚨 Market Alert: Extreme Move");
        assert_eq!(alert.priority(), SignalPriority::High);
        assert_eq!(alert.tags(), ["warning", "exclamation"]);

        let lines: Vec<&str> = alert.message().lines().collect();
        assert_eq!(lines[0], "Coins affected: SOL, ETH, DOGE...");
        assert_eq!(lines[1], "Metric: absolute 1h strength vs BTC (%)");
        assert_eq!(lines[2], "Current Value: 15.00");
        assert_eq!(lines[3], "Threshold: 10.00");
    }

    #[test]
    fn test_calm_market_raises_no_alert() {
        let composites = vec![composite("ETH", &[(Timeframe::H1, 0.1)])];
        assert!(extreme_move_alerts(&composites, 0.10, &id("BTC"), now()).is_empty());
    }
}
