//! Exponential Moving Average (EMA).
//!
//! alpha = 2 / (span + 1). Uses the bias-adjusted form: every past value
//! carries weight (1 - alpha)^age and the weights are renormalized at each
//! step, so the series is defined from the first observation on with no
//! seed window:
//!
//! EMA[t] = sum_i (1-alpha)^i * x[t-i] / sum_i (1-alpha)^i

/// Bias-adjusted EMA over an arbitrary series, aligned with the input.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    assert!(span >= 1, "EMA span must be >= 1");
    let decay = 1.0 - 2.0 / (span as f64 + 1.0);

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    values
        .iter()
        .map(|&v| {
            weighted_sum = v + decay * weighted_sum;
            weight_total = 1.0 + decay * weight_total;
            weighted_sum / weight_total
        })
        .collect()
}
