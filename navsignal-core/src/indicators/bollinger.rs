//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(period), partial leading window
//! - Upper: middle + mult * stddev(period)
//! - Lower: middle - mult * stddev(period)
//!
//! Uses sample stddev (divide by N-1) over the same trailing window as the
//! middle band. Windows with a single point have zero width.

use super::sma::moving_average;
use super::stats::sample_std;

/// Aligned upper/middle/lower band series.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerBands {
    pub fn compute(values: &[f64], period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        let middle = moving_average(values, period);
        let n = values.len();
        let mut upper = Vec::with_capacity(n);
        let mut lower = Vec::with_capacity(n);

        for i in 0..n {
            let start = (i + 1).saturating_sub(period);
            let half_width = multiplier * sample_std(&values[start..=i]).unwrap_or(0.0);
            upper.push(middle[i] + half_width);
            lower.push(middle[i] - half_width);
        }

        Self {
            upper,
            middle,
            lower,
        }
    }

    /// Position of `price` inside the bands at index `i`, 0.0 at the lower band
    /// and 1.0 at the upper band. A collapsed band reports the midpoint.
    pub fn position(&self, i: usize, price: f64) -> f64 {
        let width = self.upper[i] - self.lower[i];
        if width > 0.0 {
            (price - self.lower[i]) / width
        } else {
            0.5
        }
    }
}
