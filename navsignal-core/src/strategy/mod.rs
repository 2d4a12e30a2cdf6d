//! Strategies — independent units that turn a NAV series into one signal.
//!
//! Strategies are stateless across calls: everything they need comes from the
//! series passed to `compute_signal` and their own immutable parameters.
//! `compute_signal` never fails. Series that are too short or contain
//! non-finite values, and any degenerate arithmetic reported by `evaluate`,
//! resolve to the insufficient-data HOLD.

pub mod dynamic_percentile;
pub mod factory;
pub mod ma_cross;
pub mod params;
pub mod trend_following;

pub use dynamic_percentile::DynamicPercentile;
pub use factory::{create_strategy, StrategyKind};
pub use ma_cross::MovingAverageCross;
pub use params::{ParamDoc, ParamError, ParamMap, ParamSpec};
pub use trend_following::TrendFollowing;

use crate::domain::NavSeries;
use crate::signal::{IndicatorMap, IndicatorValue, SignalType, StrategySignal};
use serde::Serialize;
use std::collections::BTreeMap;

/// Internal failure of a strategy's arithmetic on an otherwise usable series.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    #[error("series is empty")]
    EmptySeries,
    #[error("series has {len} points, {required} required")]
    TooShort { len: usize, required: usize },
    #[error("degenerate {what}: {value}")]
    Degenerate { what: &'static str, value: f64 },
}

/// Structured, serializable documentation of a configured strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyDescription {
    pub name: String,
    pub description: String,
    pub parameters: BTreeMap<String, ParamDoc>,
    /// Glossary of the indicators the strategy reports.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub indicators: BTreeMap<String, String>,
    /// What each signal type means for this strategy.
    pub signals: BTreeMap<SignalType, String>,
    /// BLAKE3 fingerprint of name plus effective parameters.
    pub config_hash: String,
}

/// Trait for signal strategies.
///
/// Implementations must only read the series they are given and must not
/// carry state between calls.
pub trait Strategy: Send + Sync {
    /// Stable identifier of the strategy kind (e.g., "ma_cross").
    fn name(&self) -> &str;

    /// Minimum number of observations before a signal is attempted.
    fn min_data_points(&self) -> usize;

    /// Effective parameters, defaults included.
    fn params(&self) -> ParamMap;

    fn describe(&self) -> StrategyDescription;

    /// Compute the signal for a series that already passed `is_series_usable`.
    fn evaluate(&self, series: &NavSeries) -> Result<StrategySignal, SignalError>;

    /// Build a fresh instance of the same strategy from a new parameter map.
    ///
    /// Parameters absent from `params` take their defaults, not the current values.
    fn rebuild(&self, params: &ParamMap) -> Result<Box<dyn Strategy>, ParamError>;

    /// Non-empty, all unit values finite, at least `min_data_points` long.
    fn is_series_usable(&self, series: &NavSeries) -> bool {
        !series.is_empty()
            && series.len() >= self.min_data_points()
            && series.all_values_finite()
    }

    /// Signal for `series`, never failing.
    fn compute_signal(&self, series: &NavSeries) -> StrategySignal {
        if !self.is_series_usable(series) {
            return StrategySignal::insufficient_data(series.as_of());
        }
        match self.evaluate(series) {
            Ok(signal) => signal,
            Err(err) => {
                tracing::debug!(
                    strategy = self.name(),
                    error = %err,
                    "strategy arithmetic degenerate, reporting insufficient data"
                );
                StrategySignal::insufficient_data(series.as_of())
            }
        }
    }
}

/// Guard a denominator: must be finite and non-zero.
pub(crate) fn nonzero(what: &'static str, value: f64) -> Result<f64, SignalError> {
    if value == 0.0 || !value.is_finite() {
        Err(SignalError::Degenerate { what, value })
    } else {
        Ok(value)
    }
}

/// Guard a computed quantity: must be finite.
pub(crate) fn finite(what: &'static str, value: f64) -> Result<f64, SignalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SignalError::Degenerate { what, value })
    }
}

/// Build an indicator snapshot from name/value pairs.
pub(crate) fn snapshot<const N: usize>(pairs: [(&str, IndicatorValue); N]) -> IndicatorMap {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Assemble a description from a strategy's parameter table.
pub(crate) fn describe_with(
    name: &str,
    description: &str,
    specs: &[ParamSpec],
    effective: &ParamMap,
    indicators: &[(&str, &str)],
    signals: [(SignalType, &str); 3],
) -> StrategyDescription {
    StrategyDescription {
        name: name.to_string(),
        description: description.to_string(),
        parameters: params::document(specs, effective),
        indicators: indicators
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        signals: signals
            .into_iter()
            .map(|(t, meaning)| (t, meaning.to_string()))
            .collect(),
        config_hash: crate::fingerprint::params_hash(name, effective),
    }
}
