//! Volatility — sample standard deviation of trailing daily returns.
//!
//! Input is an aligned return series in percent (`None` where no return is
//! known). The window takes the last `window` entries and drops the gaps;
//! fewer than two remaining returns resolve to the neutral volatility.

use super::stats::sample_std;
use super::warmup::NEUTRAL_VOLATILITY;

/// Volatility at the final position.
pub fn volatility(returns: &[Option<f64>], window: usize) -> f64 {
    assert!(window >= 1, "volatility window must be >= 1");
    let start = returns.len().saturating_sub(window);
    window_std(&returns[start..])
}

/// Present, finite returns inside the trailing `window`.
pub fn trailing_returns(returns: &[Option<f64>], window: usize) -> Vec<f64> {
    let start = returns.len().saturating_sub(window);
    returns[start..]
        .iter()
        .flatten()
        .copied()
        .filter(|r| r.is_finite())
        .collect()
}

fn window_std(window: &[Option<f64>]) -> f64 {
    let present: Vec<f64> = window
        .iter()
        .flatten()
        .copied()
        .filter(|r| r.is_finite())
        .collect();
    sample_std(&present).unwrap_or(NEUTRAL_VOLATILITY)
}
