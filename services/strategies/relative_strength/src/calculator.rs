//! Relative strength of one asset against the benchmark on one timeframe

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use strengthscan_types::{EngineError, PriceSeries, Result, StrengthScore};

/// Close-to-close return over `closes`, as a fraction
pub fn window_return(closes: &[f64]) -> Option<f64> {
    let (first, last) = (closes.first()?, closes.last()?);
    Some(last / first - 1.0)
}

/// (timestamp, asset close, benchmark close) on timestamps present in both series
fn aligned_closes(
    asset: &PriceSeries,
    benchmark: &PriceSeries,
) -> Vec<(DateTime<Utc>, f64, f64)> {
    let mut aligned = Vec::with_capacity(asset.len().min(benchmark.len()));
    let (mut i, mut j) = (0, 0);
    while i < asset.bars.len() && j < benchmark.bars.len() {
        let (a, b) = (&asset.bars[i], &benchmark.bars[j]);
        match a.timestamp.cmp(&b.timestamp) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                aligned.push((a.timestamp, a.close, b.close));
                i += 1;
                j += 1;
            }
        }
    }
    aligned
}

/// True when one of the series' recorded gaps lies inside the window starting at
/// `window_start`. A gap's `after` bar is the last bar before the hole.
fn gap_in_window(series: &PriceSeries, window_start: DateTime<Utc>) -> bool {
    series.gaps.iter().any(|gap| gap.after >= window_start)
}

/// Strength = asset return - benchmark return over the last `window` common bars.
///
/// Both series must already be normalized onto the same timeframe grid. The
/// score is `incomplete` only when a gap falls inside the measured window; older
/// gaps stay listed on the series but do not affect the score.
pub fn relative_strength(
    asset: &PriceSeries,
    benchmark: &PriceSeries,
    window: usize,
    computed_at: DateTime<Utc>,
) -> Result<StrengthScore> {
    let timeframe = asset.timeframe;
    if window < 2 {
        return Err(EngineError::configuration(format!(
            "lookback window for {timeframe} must be at least 2 bars, got {window}"
        )));
    }
    if benchmark.timeframe != timeframe {
        return Err(EngineError::computation(
            &asset.asset,
            format!(
                "benchmark series is {} but asset series is {timeframe}",
                benchmark.timeframe
            ),
        ));
    }
    if benchmark.len() < window {
        return Err(EngineError::insufficient(
            &benchmark.asset,
            format!("{timeframe} benchmark series"),
            window,
            benchmark.len(),
        ));
    }
    if asset.len() < window {
        return Err(EngineError::insufficient(
            &asset.asset,
            format!("{timeframe} series"),
            window,
            asset.len(),
        ));
    }

    let aligned = aligned_closes(asset, benchmark);
    if aligned.len() < window {
        return Err(EngineError::insufficient(
            &asset.asset,
            format!("{timeframe} bars aligned with {}", benchmark.asset),
            window,
            aligned.len(),
        ));
    }

    let recent = &aligned[aligned.len() - window..];
    let window_start = recent[0].0;
    let asset_closes: Vec<f64> = recent.iter().map(|(_, a, _)| *a).collect();
    let benchmark_closes: Vec<f64> = recent.iter().map(|(_, _, b)| *b).collect();

    let value = match (window_return(&asset_closes), window_return(&benchmark_closes)) {
        (Some(asset_return), Some(benchmark_return)) => asset_return - benchmark_return,
        _ => f64::NAN,
    };
    if !value.is_finite() {
        return Err(EngineError::computation(
            &asset.asset,
            format!("non-finite {timeframe} strength ({value})"),
        ));
    }

    Ok(StrengthScore {
        asset: asset.asset.clone(),
        timeframe,
        value,
        computed_at,
        incomplete: gap_in_window(asset, window_start) || gap_in_window(benchmark, window_start),
    })
}
