//! Strategy parameters — a flat name → value map with documented defaults.
//!
//! Each strategy declares its parameters once as a `ParamSpec` table. The
//! table supplies defaults when building the typed parameter struct and the
//! parameter documentation in `describe()`.

use serde::Serialize;
use std::collections::BTreeMap;

/// Parameter overrides keyed by name. `BTreeMap` keeps serialization and hashing deterministic.
pub type ParamMap = BTreeMap<String, f64>;

/// Errors that can occur while building a strategy from a parameter map.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("parameter '{key}' must be finite, got {value}")]
    NotFinite { key: String, value: f64 },
    #[error("parameter '{key}' must be a whole number in [{min}, {max}], got {value}", max = MAX_COUNT)]
    InvalidCount { key: String, value: f64, min: usize },
    #[error("invalid parameters: {0}")]
    Constraint(String),
}

/// Declaration of one tunable parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub key: &'static str,
    pub default: f64,
    pub description: &'static str,
}

/// Documented parameter as reported by `describe()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDoc {
    pub value: f64,
    pub default: f64,
    pub description: String,
}

/// Largest accepted count parameter (period, window, lookback).
pub const MAX_COUNT: usize = u32::MAX as usize;

/// Shared by every strategy: minimum series length before a signal is attempted.
pub const MIN_DATA_POINTS_KEY: &str = "min_data_points";

/// Extract a named f64 parameter, falling back to `default`.
pub fn param(params: &ParamMap, key: &str, default: f64) -> Result<f64, ParamError> {
    match params.get(key) {
        None => Ok(default),
        Some(&v) if v.is_finite() => Ok(v),
        Some(&v) => Err(ParamError::NotFinite {
            key: key.to_string(),
            value: v,
        }),
    }
}

/// Extract a named count (period, window length), falling back to `default`.
///
/// Values must be whole numbers in `[min, MAX_COUNT]`.
pub fn param_count(
    params: &ParamMap,
    key: &str,
    default: usize,
    min: usize,
) -> Result<usize, ParamError> {
    let value = param(params, key, default as f64)?;
    if value.fract() != 0.0 || value < min as f64 || value > MAX_COUNT as f64 {
        return Err(ParamError::InvalidCount {
            key: key.to_string(),
            value,
            min,
        });
    }
    Ok(value as usize)
}

/// Look up a table default by key. Falls back to 0.0 for keys not in the table.
pub fn spec_default(specs: &[ParamSpec], key: &str) -> f64 {
    specs
        .iter()
        .find(|s| s.key == key)
        .map(|s| s.default)
        .unwrap_or(0.0)
}

/// Build parameter docs from a parameter table and the effective values.
pub fn document(specs: &[ParamSpec], effective: &ParamMap) -> BTreeMap<String, ParamDoc> {
    specs
        .iter()
        .map(|spec| {
            let value = effective.get(spec.key).copied().unwrap_or(spec.default);
            (
                spec.key.to_string(),
                ParamDoc {
                    value,
                    default: spec.default,
                    description: spec.description.to_string(),
                },
            )
        })
        .collect()
}
