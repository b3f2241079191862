//! Multi-timeframe aggregation
//!
//! Missing or incomplete timeframes drop out of the weighted mean and the
//! remaining weights are renormalized so they still sum to 1.0. A composite
//! built from fewer timeframes than configured is marked incomplete.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use strengthscan_config::TimeframeSpec;
use strengthscan_types::{AssetId, CompositeScore, EngineError, Result, StrengthScore, Timeframe};

pub fn aggregate(
    asset: &AssetId,
    scores: &BTreeMap<Timeframe, StrengthScore>,
    timeframes: &[TimeframeSpec],
    computed_at: DateTime<Utc>,
) -> Result<CompositeScore> {
    let mut contributing = BTreeMap::new();
    let mut excluded = Vec::new();
    for spec in timeframes {
        match scores.get(&spec.timeframe) {
            Some(score) if !score.incomplete => {
                contributing.insert(spec.timeframe, (score.clone(), spec.weight));
            }
            _ => excluded.push(spec.timeframe),
        }
    }

    if contributing.is_empty() {
        let labels: Vec<&str> = excluded.iter().map(|tf| tf.label()).collect();
        return Err(EngineError::InsufficientData {
            asset: asset.clone(),
            detail: format!("no usable timeframe (excluded: {})", labels.join(", ")),
        });
    }

    let total_weight: f64 = contributing.values().map(|(_, weight)| weight).sum();
    let effective_weights: BTreeMap<Timeframe, f64> = contributing
        .iter()
        .map(|(tf, (_, weight))| (*tf, weight / total_weight))
        .collect();
    let value: f64 = contributing
        .iter()
        .map(|(tf, (score, _))| score.value * effective_weights[tf])
        .sum();

    if !value.is_finite() {
        return Err(EngineError::computation(
            asset,
            format!("non-finite composite ({value})"),
        ));
    }

    Ok(CompositeScore {
        asset: asset.clone(),
        value,
        contributing_timeframes: contributing
            .into_iter()
            .map(|(tf, (score, _))| (tf, score))
            .collect(),
        effective_weights,
        incomplete: !excluded.is_empty(),
        excluded_timeframes: excluded,
        computed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()
    }

    fn eth() -> AssetId {
        AssetId::new("ETH").unwrap()
    }

    fn score(timeframe: Timeframe, value: f64, incomplete: bool) -> (Timeframe, StrengthScore) {
        (
            timeframe,
            StrengthScore {
                asset: eth(),
                timeframe,
                value,
                computed_at: now(),
                incomplete,
            },
        )
    }

    fn specs(weights: &[(Timeframe, f64)]) -> Vec<TimeframeSpec> {
        weights
            .iter()
            .map(|(timeframe, weight)| TimeframeSpec {
                timeframe: *timeframe,
                weight: *weight,
                lookback_bars: 2,
            })
            .collect()
    }

    #[test]
    fn test_weighted_mean() {
        let scores = BTreeMap::from([
            score(Timeframe::H1, 0.05, false),
            score(Timeframe::D1, 0.02, false),
        ]);
        let composite = aggregate(
            &eth(),
            &scores,
            &specs(&[(Timeframe::H1, 0.5), (Timeframe::D1, 0.5)]),
            now(),
        )
        .unwrap();

        assert!((composite.value - 0.035).abs() < 1e-12);
        assert!(!composite.incomplete);
        assert_eq!(composite.contributing_timeframes.len(), 2);
    }

    #[test]
    fn test_renormalizes_over_remaining_timeframes() {
        let scores = BTreeMap::from([
            score(Timeframe::H1, -0.03, false),
            score(Timeframe::D1, -0.01, true),
        ]);
        let composite = aggregate(
            &eth(),
            &scores,
            &specs(&[
                (Timeframe::H1, 0.25),
                (Timeframe::H4, 0.25),
                (Timeframe::D1, 0.5),
            ]),
            now(),
        )
        .unwrap();

        assert!((composite.value - -0.03).abs() < 1e-12);
        assert_eq!(composite.effective_weights[&Timeframe::H1], 1.0);
        assert_eq!(composite.excluded_timeframes, vec![Timeframe::H4, Timeframe::D1]);
        assert!(composite.incomplete);
    }

    #[test]
    fn test_all_excluded_is_insufficient() {
        let scores = BTreeMap::from([score(Timeframe::H1, 0.01, true)]);
        let err = aggregate(&eth(), &scores, &specs(&[(Timeframe::H1, 1.0)]), now()).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData { .. }));
    }

    #[test]
    fn test_unconfigured_timeframes_ignored() {
        let scores = BTreeMap::from([
            score(Timeframe::H1, 0.01, false),
            score(Timeframe::W1, 0.9, false),
        ]);
        let composite = aggregate(&eth(), &scores, &specs(&[(Timeframe::H1, 1.0)]), now()).unwrap();
        assert!((composite.value - 0.01).abs() < 1e-12);
        assert!(composite.score_for(Timeframe::W1).is_none());
    }
}
