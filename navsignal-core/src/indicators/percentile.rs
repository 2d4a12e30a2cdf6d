//! Percentile rank over a trailing window.
//!
//! rank[t] = 100 * |{ x in window(t) : x < values[t] }| / |window(t)|
//!
//! The window is the last `lookback` observations ending at t (inclusive),
//! shortened at the start of the series. Windows with fewer than two points
//! resolve to the neutral percentile.

use super::warmup::{MIN_WINDOW_POINTS, NEUTRAL_PERCENTILE};

/// Percentile rank of the last element of `window` within `window`.
pub fn rank_of_last(window: &[f64]) -> f64 {
    let Some(&current) = window.last() else {
        return NEUTRAL_PERCENTILE;
    };
    if window.len() < MIN_WINDOW_POINTS {
        return NEUTRAL_PERCENTILE;
    }
    let below = window.iter().filter(|&&x| x < current).count();
    below as f64 / window.len() as f64 * 100.0
}

/// Percentile rank of the final observation over its trailing window.
pub fn percentile_rank_last(values: &[f64], lookback: usize) -> f64 {
    assert!(lookback >= 1, "percentile lookback must be >= 1");
    let start = values.len().saturating_sub(lookback);
    rank_of_last(&values[start..])
}

/// Aligned percentile-rank series.
pub fn percentile_rank(values: &[f64], lookback: usize) -> Vec<f64> {
    assert!(lookback >= 1, "percentile lookback must be >= 1");
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(lookback);
            rank_of_last(&values[start..=i])
        })
        .collect()
}
