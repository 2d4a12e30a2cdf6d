//! Relative Strength Index (RSI).
//!
//! Simple trailing average of gains and of losses over `period` deltas.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! First defined value at index `period` (needs `period` full deltas);
//! earlier positions are `None`.
//! Edge cases: avg_loss == 0 → RSI = 100; no movement at all → neutral.

use super::warmup::NEUTRAL_RSI;

pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    assert!(period >= 1, "RSI period must be >= 1");
    let n = values.len();
    let mut result = vec![None; n];

    if n <= period {
        return result;
    }

    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    // changes[i - 1] is the delta ending at index i
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for (k, &ch) in changes.iter().enumerate() {
        if ch > 0.0 {
            gain_sum += ch;
        } else {
            loss_sum -= ch;
        }
        if k >= period {
            let leaving = changes[k - period];
            if leaving > 0.0 {
                gain_sum -= leaving;
            } else {
                loss_sum += leaving;
            }
        }
        if k + 1 >= period {
            let avg_gain = (gain_sum / period as f64).max(0.0);
            let avg_loss = (loss_sum / period as f64).max(0.0);
            result[k + 1] = Some(compute_rsi(avg_gain, avg_loss));
        }
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    // Rolling sums can leave float dust where the window is actually flat.
    const EPS: f64 = 1e-12;
    if avg_loss <= EPS && avg_gain <= EPS {
        NEUTRAL_RSI
    } else if avg_loss <= EPS {
        100.0
    } else if avg_gain <= EPS {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
