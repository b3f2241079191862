//! Price series normalization
//!
//! Turns raw bars from the data-fetch collaborator into a grid-aligned series:
//! timestamps floored onto the timeframe grid, sorted, deduplicated with the
//! later input bar winning. Gaps are listed on the series and never filled.

use std::collections::BTreeMap;

use strengthscan_types::{EngineError, Gap, PriceBar, PriceSeries, Result};

/// Normalize one (asset, timeframe) series.
///
/// Fails with `Computation` on the first corrupt bar and with `InsufficientData`
/// when fewer than `min_bars` distinct grid bars remain.
pub fn normalize(raw: &PriceSeries, min_bars: usize) -> Result<PriceSeries> {
    let timeframe = raw.timeframe;

    let mut aligned: BTreeMap<_, PriceBar> = BTreeMap::new();
    for bar in &raw.bars {
        if let Some(defect) = bar.defect() {
            return Err(EngineError::computation(
                &raw.asset,
                format!("corrupt {timeframe} bar: {defect}"),
            ));
        }
        let slot = timeframe.floor_to_grid(bar.timestamp);
        aligned.insert(
            slot,
            PriceBar {
                timestamp: slot,
                ..*bar
            },
        );
    }

    let bars: Vec<PriceBar> = aligned.into_values().collect();
    if bars.len() < min_bars {
        return Err(EngineError::insufficient(
            &raw.asset,
            format!("{timeframe} series"),
            min_bars,
            bars.len(),
        ));
    }

    let step = timeframe.step_millis();
    let gaps = bars
        .windows(2)
        .filter_map(|pair| {
            let delta = pair[1].timestamp.timestamp_millis() - pair[0].timestamp.timestamp_millis();
            (delta > step).then(|| Gap {
                after: pair[0].timestamp,
                missing_bars: u32::try_from(delta / step - 1).unwrap_or(u32::MAX),
            })
        })
        .collect();

    Ok(PriceSeries::with_gaps(
        raw.asset.clone(),
        timeframe,
        bars,
        gaps,
    ))
}
