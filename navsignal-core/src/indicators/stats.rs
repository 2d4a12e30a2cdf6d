//! Small statistics helpers used by the indicators and strategies.

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (divide by N-1); `None` with fewer than two points.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Least-squares slope of `values` against their index (0, 1, 2, ...).
///
/// Returns 0.0 for fewer than two points.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Skewness of standardized values: mean of ((x - mean) / std)^3.
///
/// `std` is passed in so callers can reuse the deviation they already computed.
pub fn skewness(values: &[f64], mean: f64, std: f64) -> f64 {
    if values.is_empty() || std == 0.0 {
        return 0.0;
    }
    values
        .iter()
        .map(|v| {
            let z = (v - mean) / std;
            z * z * z
        })
        .sum::<f64>()
        / values.len() as f64
}
