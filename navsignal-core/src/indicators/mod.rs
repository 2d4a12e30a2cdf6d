//! Indicator library.
//!
//! Pure functions over an ordered slice of values, each returning an output
//! aligned with its input. Every window is trailing (anchored at the current
//! index, never looking ahead) and "period" always counts observations, not
//! calendar days. Leading positions follow the partial-window rules in each
//! module; the neutral values for undefined windows live in [`warmup`].

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod percentile;
pub mod rsi;
pub mod sma;
pub mod stats;
pub mod volatility;
pub mod warmup;

pub use bollinger::BollingerBands;
pub use ema::ema_of_series;
pub use macd::Macd;
pub use percentile::{percentile_rank, percentile_rank_last, rank_of_last};
pub use rsi::rsi;
pub use sma::{moving_average, rolling_min};
pub use volatility::{trailing_returns, volatility};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// Build a daily NAV series from unit values for tests.
#[cfg(test)]
pub fn make_series(values: &[f64]) -> crate::domain::NavSeries {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    crate::domain::NavSeries::from_values(start, values)
}
