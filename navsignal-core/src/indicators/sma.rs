//! Simple Moving Average (SMA) and rolling minimum.
//!
//! Trailing window of `period` observations. Positions with fewer than
//! `period` prior points average over everything available, so the output
//! never has gaps: `sma[0] == values[0]`.

/// Trailing arithmetic mean with a partial leading window.
pub fn moving_average(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "SMA period must be >= 1");
    let n = values.len();
    let mut result = Vec::with_capacity(n);

    let mut sum = 0.0;
    for i in 0..n {
        sum += values[i];
        if i >= period {
            sum -= values[i - period];
        }
        let count = (i + 1).min(period);
        result.push(sum / count as f64);
    }

    result
}

/// Trailing minimum with a partial leading window.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "rolling_min period must be >= 1");
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(period);
            values[start..=i]
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}
