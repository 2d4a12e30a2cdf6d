//! Signal model — the vocabulary every strategy and the consensus speak.
//!
//! A `StrategySignal` is immutable once built. Its strength is clamped to
//! [0, 1] in the constructor (and on deserialization), so no upstream
//! arithmetic can leak an out-of-range or NaN confidence to callers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Recommended action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
            SignalType::Hold => "HOLD",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single indicator reading attached to a signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Flag(bool),
    Number(f64),
}

impl IndicatorValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            IndicatorValue::Number(v) => Some(*v),
            IndicatorValue::Flag(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            IndicatorValue::Flag(b) => Some(*b),
            IndicatorValue::Number(_) => None,
        }
    }
}

impl From<f64> for IndicatorValue {
    fn from(v: f64) -> Self {
        IndicatorValue::Number(v)
    }
}

impl From<bool> for IndicatorValue {
    fn from(b: bool) -> Self {
        IndicatorValue::Flag(b)
    }
}

impl From<usize> for IndicatorValue {
    fn from(n: usize) -> Self {
        IndicatorValue::Number(n as f64)
    }
}

/// Indicator snapshot keyed by name. Ordered for deterministic output.
pub type IndicatorMap = BTreeMap<String, IndicatorValue>;

/// Reason attached to every insufficient-data fallback.
pub const INSUFFICIENT_DATA_REASON: &str = "insufficient or invalid data, no signal computed";

/// Output of a strategy (or of the consensus).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SignalRecord")]
pub struct StrategySignal {
    signal_type: SignalType,
    strength: f64,
    reason: String,
    indicators: IndicatorMap,
    /// Date of the observation the signal was computed from.
    timestamp: Option<NaiveDate>,
}

impl StrategySignal {
    pub fn new(
        signal_type: SignalType,
        strength: f64,
        reason: impl Into<String>,
        indicators: IndicatorMap,
        timestamp: Option<NaiveDate>,
    ) -> Self {
        Self {
            signal_type,
            strength: clamp_strength(strength),
            reason: reason.into(),
            indicators,
            timestamp,
        }
    }

    /// HOLD with zero strength, used whenever a strategy cannot evaluate the series.
    pub fn insufficient_data(timestamp: Option<NaiveDate>) -> Self {
        Self::new(
            SignalType::Hold,
            0.0,
            INSUFFICIENT_DATA_REASON,
            IndicatorMap::new(),
            timestamp,
        )
    }

    pub fn signal_type(&self) -> SignalType {
        self.signal_type
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn indicators(&self) -> &IndicatorMap {
        &self.indicators
    }

    pub fn indicator(&self, name: &str) -> Option<IndicatorValue> {
        self.indicators.get(name).copied()
    }

    pub fn timestamp(&self) -> Option<NaiveDate> {
        self.timestamp
    }
}

/// Clamp to [0, 1]; NaN maps to 0.
fn clamp_strength(strength: f64) -> f64 {
    if strength.is_nan() {
        0.0
    } else {
        strength.clamp(0.0, 1.0)
    }
}

/// Wire shape used for deserialization, routed back through the clamping constructor.
#[derive(Deserialize)]
struct SignalRecord {
    signal_type: SignalType,
    strength: f64,
    reason: String,
    #[serde(default)]
    indicators: IndicatorMap,
    #[serde(default)]
    timestamp: Option<NaiveDate>,
}

impl From<SignalRecord> for StrategySignal {
    fn from(r: SignalRecord) -> Self {
        StrategySignal::new(r.signal_type, r.strength, r.reason, r.indicators, r.timestamp)
    }
}
