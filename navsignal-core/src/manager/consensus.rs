//! Weighted consensus over per-strategy signals.
//!
//! buy  = Σ w·strength over BUY signals  / Σ w
//! sell = Σ w·strength over SELL signals / Σ w
//! hold = Σ w over HOLD signals          / Σ w
//!
//! BUY when buy > sell and buy > floor, SELL symmetrically, otherwise HOLD
//! with zero strength. Strategies with weight <= 0 (or no weight) are skipped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::signal::{SignalType, StrategySignal};
use crate::strategy::snapshot;

/// Default anti-noise floor a winning bucket must exceed.
pub const DEFAULT_ACTION_FLOOR: f64 = 0.3;

/// Consensus settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    pub action_floor: f64,
    /// Per-strategy weights. `None` means 1.0 for every registered strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<String, f64>>,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            action_floor: DEFAULT_ACTION_FLOOR,
            weights: None,
        }
    }
}

/// Equal weight for every name.
pub fn equal_weights<'a>(names: impl IntoIterator<Item = &'a String>) -> BTreeMap<String, f64> {
    names.into_iter().map(|name| (name.clone(), 1.0)).collect()
}

/// Aggregate per-strategy signals into one consensus signal.
pub fn aggregate(
    signals: &BTreeMap<String, StrategySignal>,
    weights: &BTreeMap<String, f64>,
    action_floor: f64,
    timestamp: Option<NaiveDate>,
) -> StrategySignal {
    if signals.is_empty() {
        return StrategySignal::new(
            SignalType::Hold,
            0.0,
            "no strategy signals available",
            Default::default(),
            timestamp,
        );
    }

    let mut buy = 0.0;
    let mut sell = 0.0;
    let mut hold = 0.0;
    let mut total = 0.0;
    let mut details = Vec::with_capacity(signals.len());

    for (name, signal) in signals {
        let weight = weights.get(name).copied().unwrap_or(0.0);
        if !(weight > 0.0 && weight.is_finite()) {
            continue;
        }
        total += weight;
        match signal.signal_type() {
            SignalType::Buy => buy += weight * signal.strength(),
            SignalType::Sell => sell += weight * signal.strength(),
            SignalType::Hold => hold += weight,
        }
        details.push(format!(
            "{name}: {} ({:.2})",
            signal.signal_type(),
            signal.strength()
        ));
    }

    if total == 0.0 {
        return StrategySignal::new(
            SignalType::Hold,
            0.0,
            "every strategy weight is zero",
            Default::default(),
            timestamp,
        );
    }

    buy /= total;
    sell /= total;
    hold /= total;

    let (signal_type, strength) = if buy > sell && buy > action_floor {
        (SignalType::Buy, buy)
    } else if sell > buy && sell > action_floor {
        (SignalType::Sell, sell)
    } else {
        (SignalType::Hold, 0.0)
    };

    let lean = match signal_type {
        SignalType::Buy => "consensus leans BUY",
        SignalType::Sell => "consensus leans SELL",
        SignalType::Hold => "consensus suggests HOLD",
    };
    let reason = format!(
        "{lean} (buy {buy:.3}, sell {sell:.3}, hold {hold:.3}) | {}",
        details.join(", ")
    );

    let active = signals.values().filter(|s| s.strength() > 0.0).count();
    let indicators = snapshot([
        ("buy_weight", buy.into()),
        ("sell_weight", sell.into()),
        ("hold_weight", hold.into()),
        ("total_strategies", signals.len().into()),
        ("active_strategies", active.into()),
    ]);

    StrategySignal::new(signal_type, strength, reason, indicators, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use crate::signal::IndicatorMap;

    fn sig(signal_type: SignalType, strength: f64) -> StrategySignal {
        StrategySignal::new(signal_type, strength, "t", IndicatorMap::new(), None)
    }

    fn three(a: StrategySignal, b: StrategySignal, c: StrategySignal) -> BTreeMap<String, StrategySignal> {
        [("a", a), ("b", b), ("c", c)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn bucket(signal: &StrategySignal, name: &str) -> f64 {
        signal.indicator(name).and_then(|v| v.as_f64()).unwrap()
    }

    #[test]
    fn weak_majority_stays_hold() {
        let signals = three(
            sig(SignalType::Buy, 0.5),
            sig(SignalType::Sell, 0.1),
            sig(SignalType::Hold, 0.0),
        );
        let weights = equal_weights(signals.keys());
        let consensus = aggregate(&signals, &weights, DEFAULT_ACTION_FLOOR, None);

        assert_eq!(consensus.signal_type(), SignalType::Hold);
        assert_eq!(consensus.strength(), 0.0);
        assert_approx(bucket(&consensus, "buy_weight"), 0.5 / 3.0, DEFAULT_EPSILON);
        assert_approx(bucket(&consensus, "sell_weight"), 0.1 / 3.0, DEFAULT_EPSILON);
        assert_approx(bucket(&consensus, "hold_weight"), 1.0 / 3.0, DEFAULT_EPSILON);
        assert_eq!(bucket(&consensus, "total_strategies"), 3.0);
        assert_eq!(bucket(&consensus, "active_strategies"), 2.0);
    }

    #[test]
    fn strong_agreement_is_buy_with_bucket_strength() {
        let signals = three(
            sig(SignalType::Buy, 0.9),
            sig(SignalType::Buy, 0.6),
            sig(SignalType::Hold, 0.0),
        );
        let weights = equal_weights(signals.keys());
        let consensus = aggregate(&signals, &weights, DEFAULT_ACTION_FLOOR, None);
        assert_eq!(consensus.signal_type(), SignalType::Buy);
        assert_approx(consensus.strength(), 0.5, DEFAULT_EPSILON);
    }

    #[test]
    fn sell_side_wins_symmetrically() {
        let signals = three(
            sig(SignalType::Sell, 0.8),
            sig(SignalType::Sell, 0.7),
            sig(SignalType::Buy, 0.2),
        );
        let weights = equal_weights(signals.keys());
        let consensus = aggregate(&signals, &weights, DEFAULT_ACTION_FLOOR, None);
        assert_eq!(consensus.signal_type(), SignalType::Sell);
        assert_approx(consensus.strength(), 0.5, DEFAULT_EPSILON);
    }

    #[test]
    fn tie_is_hold() {
        let signals = three(
            sig(SignalType::Buy, 0.9),
            sig(SignalType::Sell, 0.9),
            sig(SignalType::Hold, 0.0),
        );
        let weights = equal_weights(signals.keys());
        assert_eq!(
            aggregate(&signals, &weights, DEFAULT_ACTION_FLOOR, None).signal_type(),
            SignalType::Hold
        );
    }

    #[test]
    fn weights_shift_the_outcome() {
        let signals = three(
            sig(SignalType::Buy, 0.5),
            sig(SignalType::Sell, 0.1),
            sig(SignalType::Hold, 0.0),
        );
        let weights: BTreeMap<String, f64> = [("a".to_string(), 1.0)].into_iter().collect();
        let consensus = aggregate(&signals, &weights, DEFAULT_ACTION_FLOOR, None);
        assert_eq!(consensus.signal_type(), SignalType::Buy);
        assert_approx(consensus.strength(), 0.5, DEFAULT_EPSILON);
        assert!(!consensus.reason().contains("b: SELL"));
    }

    #[test]
    fn floor_is_configurable() {
        let signals = three(
            sig(SignalType::Buy, 0.5),
            sig(SignalType::Sell, 0.1),
            sig(SignalType::Hold, 0.0),
        );
        let weights = equal_weights(signals.keys());
        let consensus = aggregate(&signals, &weights, 0.1, None);
        assert_eq!(consensus.signal_type(), SignalType::Buy);
    }

    #[test]
    fn reason_carries_buckets_and_breakdown() {
        let signals = three(
            sig(SignalType::Buy, 0.5),
            sig(SignalType::Sell, 0.1),
            sig(SignalType::Hold, 0.0),
        );
        let weights = equal_weights(signals.keys());
        let reason = aggregate(&signals, &weights, DEFAULT_ACTION_FLOOR, None)
            .reason()
            .to_string();
        assert!(reason.contains("buy 0.167"), "{reason}");
        assert!(reason.contains("a: BUY (0.50)"), "{reason}");
        assert!(reason.contains("b: SELL (0.10)"), "{reason}");
        assert!(reason.contains("c: HOLD (0.00)"), "{reason}");
    }

    #[test]
    fn empty_and_zero_weight_are_hold() {
        let empty = aggregate(&BTreeMap::new(), &BTreeMap::new(), DEFAULT_ACTION_FLOOR, None);
        assert_eq!(empty.signal_type(), SignalType::Hold);

        let signals = three(
            sig(SignalType::Buy, 1.0),
            sig(SignalType::Buy, 1.0),
            sig(SignalType::Buy, 1.0),
        );
        let weights: BTreeMap<String, f64> = signals.keys().map(|k| (k.clone(), 0.0)).collect();
        let zero = aggregate(&signals, &weights, DEFAULT_ACTION_FLOOR, None);
        assert_eq!(zero.signal_type(), SignalType::Hold);
        assert_eq!(zero.strength(), 0.0);
    }
}
