//! Insufficient-window policy shared by every indicator and strategy.
//!
//! Indicators that cannot produce a value yet either report `None` (RSI) or
//! resolve to the neutral value defined here. Consumers must go through
//! these constants instead of inlining their own defaults.

/// RSI reported before `period` full deltas exist, or when the window is flat.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Percentile rank when the trailing window holds fewer than two points.
pub const NEUTRAL_PERCENTILE: f64 = 50.0;

/// Volatility when fewer than two return observations exist.
pub const NEUTRAL_VOLATILITY: f64 = 0.0;

/// Minimum number of points a window needs before a rank or deviation is meaningful.
pub const MIN_WINDOW_POINTS: usize = 2;

/// Resolve a not-yet-defined RSI reading to the neutral value.
pub fn rsi_or_neutral(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => NEUTRAL_RSI,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_nan_rsi_is_neutral() {
        assert_eq!(rsi_or_neutral(None), NEUTRAL_RSI);
        assert_eq!(rsi_or_neutral(Some(f64::NAN)), NEUTRAL_RSI);
        assert_eq!(rsi_or_neutral(Some(72.5)), 72.5);
    }
}
