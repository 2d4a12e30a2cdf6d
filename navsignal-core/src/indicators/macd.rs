//! Moving Average Convergence Divergence (MACD).
//!
//! - Line: EMA(fast) - EMA(slow)
//! - Signal: EMA(line, signal)
//! - Histogram: line - signal
//!
//! Built on the bias-adjusted EMA, so all three series are defined from the
//! first observation.

use super::ema::ema_of_series;

/// Three aligned MACD series.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    pub fn compute(values: &[f64], fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1, "MACD fast period must be >= 1");
        assert!(slow > fast, "MACD slow period must be > fast period");
        assert!(signal >= 1, "MACD signal period must be >= 1");

        let fast_ema = ema_of_series(values, fast);
        let slow_ema = ema_of_series(values, slow);
        let line: Vec<f64> = fast_ema
            .iter()
            .zip(&slow_ema)
            .map(|(f, s)| f - s)
            .collect();
        let signal_line = ema_of_series(&line, signal);
        let histogram = line
            .iter()
            .zip(&signal_line)
            .map(|(l, s)| l - s)
            .collect();

        Self {
            line,
            signal: signal_line,
            histogram,
        }
    }

    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }
}
