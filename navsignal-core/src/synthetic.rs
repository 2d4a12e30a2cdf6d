//! Seeded synthetic NAV series for demos, benches and property tests.
//!
//! Daily returns are drawn from a normal distribution (Box-Muller over a
//! seeded `StdRng`), so the same seed always yields the same series.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{NavObservation, NavSeries};

/// Shape of a synthetic random walk.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkConfig {
    pub start_date: NaiveDate,
    pub start_value: f64,
    /// Mean daily return, percent.
    pub drift_pct: f64,
    /// Standard deviation of daily returns, percent.
    pub volatility_pct: f64,
    /// Mean daily volume; `None` leaves volume out.
    pub mean_volume: Option<f64>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default(),
            start_value: 1.0,
            drift_pct: 0.02,
            volatility_pct: 1.0,
            mean_volume: Some(1_000_000.0),
        }
    }
}

/// Random walk of `len` daily observations with the default shape.
pub fn random_walk(len: usize, seed: u64) -> NavSeries {
    random_walk_with(len, seed, &WalkConfig::default())
}

/// Random walk of `len` daily observations.
pub fn random_walk_with(len: usize, seed: u64, config: &WalkConfig) -> NavSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut value = config.start_value;
    let mut observations = Vec::with_capacity(len);

    for i in 0..len {
        if i > 0 {
            let step = config.drift_pct + config.volatility_pct * standard_normal(&mut rng);
            // Floor keeps the walk strictly positive.
            value = (value * (1.0 + step / 100.0)).max(config.start_value * 1e-3);
        }
        let date = config.start_date + chrono::Duration::days(i as i64);
        let mut observation = NavObservation::new(date, value);
        if let Some(mean_volume) = config.mean_volume {
            observation = observation.with_volume(mean_volume * rng.gen_range(0.5..1.5));
        }
        observations.push(observation);
    }

    NavSeries::from_ordered(observations)
}

fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
