//! Integration tests for the built-in strategies through the public API.
//!
//! Tests:
//! 1. Every strategy falls back to HOLD 0 on short, empty or non-finite series
//! 2. MA cross fires BUY on a golden cross and SELL on a death cross
//! 3. Dynamic DCA buys cheap history, sells expensive history, rates a linear ramp moderately cheap
//! 4. Trend following sells an overbought spike
//! 5. Evaluating the same series twice gives identical signals
//! 6. Descriptions and factory construction agree with effective parameters

use chrono::NaiveDate;
use navsignal_core::domain::{NavObservation, NavSeries};
use navsignal_core::fingerprint::params_hash;
use navsignal_core::signal::{SignalType, StrategySignal, INSUFFICIENT_DATA_REASON};
use navsignal_core::strategy::{
    create_strategy, DynamicPercentile, MovingAverageCross, ParamMap, Strategy, StrategyKind,
    TrendFollowing,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

fn series(values: &[f64]) -> NavSeries {
    NavSeries::from_values(start(), values)
}

fn all_strategies() -> Vec<Box<dyn Strategy>> {
    StrategyKind::ALL
        .into_iter()
        .map(|kind| create_strategy(kind, &ParamMap::new()).unwrap())
        .collect()
}

fn assert_fallback(signal: &StrategySignal) {
    assert_eq!(signal.signal_type(), SignalType::Hold);
    assert_eq!(signal.strength(), 0.0);
    assert_eq!(signal.reason(), INSUFFICIENT_DATA_REASON);
}

/// Declining leg then a sharp rally: short MA crosses above long MA on the last point.
fn golden_cross_values() -> Vec<f64> {
    let mut values: Vec<f64> = (0..30).map(|i| 100.0 - 0.5 * i as f64).collect();
    let last = values[29];
    values.extend((1..=5).map(|j| last + 1.5 * j as f64));
    values
}

fn accelerating(n: usize, sign: f64) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 * (sign * 1e-5 * (i * i) as f64).exp())
        .collect()
}

fn composite(signal: &StrategySignal) -> f64 {
    signal
        .indicator("composite_percentile")
        .and_then(|v| v.as_f64())
        .unwrap()
}

// ── 1. Insufficient data ─────────────────────────────────────────────

#[test]
fn empty_series_holds_for_every_strategy() {
    let empty = NavSeries::default();
    for strategy in all_strategies() {
        let signal = strategy.compute_signal(&empty);
        assert_fallback(&signal);
        assert_eq!(signal.timestamp(), None);
    }
}

#[test]
fn one_short_of_minimum_holds_for_every_strategy() {
    for strategy in all_strategies() {
        let n = strategy.min_data_points() - 1;
        let values = accelerating(n, 1.0);
        let short = series(&values);
        let signal = strategy.compute_signal(&short);
        assert_fallback(&signal);
        assert_eq!(signal.timestamp(), short.as_of(), "{}", strategy.name());
    }
}

#[test]
fn non_finite_value_holds_for_every_strategy() {
    let mut values = accelerating(300, 1.0);
    values[150] = f64::NAN;
    let bad = series(&values);
    for strategy in all_strategies() {
        assert_fallback(&strategy.compute_signal(&bad));
    }
}

// ── 2. Moving-average cross ──────────────────────────────────────────

#[test]
fn golden_cross_buys_with_cross_reason() {
    let signal = MovingAverageCross::default().compute_signal(&series(&golden_cross_values()));
    assert_eq!(signal.signal_type(), SignalType::Buy);
    assert!(signal.strength() > 0.5 && signal.strength() <= 1.0);
    assert!(signal.reason().contains("golden cross"), "{}", signal.reason());
}

#[test]
fn death_cross_sells() {
    let values: Vec<f64> = golden_cross_values().iter().map(|v| 200.0 - v).collect();
    let signal = MovingAverageCross::default().compute_signal(&series(&values));
    assert_eq!(signal.signal_type(), SignalType::Sell);
    assert!(signal.reason().contains("death cross"), "{}", signal.reason());
}

#[test]
fn golden_cross_reports_indicator_snapshot() {
    let signal = MovingAverageCross::default().compute_signal(&series(&golden_cross_values()));
    for key in ["short_ma", "long_ma", "ma_diff_pct", "volume_factor", "price_trend"] {
        assert!(signal.indicator(key).and_then(|v| v.as_f64()).is_some(), "missing {key}");
    }
    let short_ma = signal.indicator("short_ma").and_then(|v| v.as_f64()).unwrap();
    let long_ma = signal.indicator("long_ma").and_then(|v| v.as_f64()).unwrap();
    assert!(short_ma > long_ma);
}

// ── 3. Dynamic DCA ───────────────────────────────────────────────────

#[test]
fn expensive_history_sells() {
    let signal = DynamicPercentile::default().compute_signal(&series(&accelerating(300, 1.0)));
    assert_eq!(signal.signal_type(), SignalType::Sell);
    assert!(composite(&signal) > 95.0);
}

#[test]
fn linear_ramp_buys_on_low_proxy_ranks() {
    // Steady growth: price ranks near 100 but both valuation proxies rank at 0.
    let values: Vec<f64> = (0..300).map(|i| 1.0 + 0.001 * i as f64).collect();
    let signal = DynamicPercentile::default().compute_signal(&series(&values));
    assert_eq!(signal.signal_type(), SignalType::Buy);
    assert!((composite(&signal) - 29.88).abs() < 0.01, "composite {}", composite(&signal));
    assert!((signal.strength() - 0.402).abs() < 1e-3);
}

#[test]
fn linear_decline_buys_at_full_strength() {
    let values: Vec<f64> = (0..300).map(|i| 1.0 + 0.001 * (299 - i) as f64).collect();
    let signal = DynamicPercentile::default().compute_signal(&series(&values));
    assert_eq!(signal.signal_type(), SignalType::Buy);
    assert_eq!(composite(&signal), 0.0);
    assert_eq!(signal.strength(), 1.0);
}

#[test]
fn cheap_history_buys() {
    let signal = DynamicPercentile::default().compute_signal(&series(&accelerating(300, -1.0)));
    assert_eq!(signal.signal_type(), SignalType::Buy);
    assert!(composite(&signal) < 5.0);
    assert!(signal.strength() > 0.5);
}

#[test]
fn supplied_daily_returns_drive_sentiment() {
    let values = accelerating(120, 1.0);
    let observations = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            // Published returns disagree with the rising values: mean -2%, spread 1%.
            let published = if i % 2 == 0 { -1.0 } else { -3.0 };
            NavObservation::new(start() + chrono::Duration::days(i as i64), v)
                .with_daily_return(published)
        })
        .collect();
    let with_returns = NavSeries::new(observations).unwrap();
    let signal = DynamicPercentile::default().compute_signal(&with_returns);
    let sentiment = signal
        .indicator("market_sentiment")
        .and_then(|v| v.as_f64())
        .unwrap();
    assert!(sentiment < 0.0, "sentiment {sentiment}");
}

// ── 4. Trend following ───────────────────────────────────────────────

#[test]
fn overbought_spike_sells() {
    let mut values: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    let last = values[39];
    values.extend((1..=20).map(|j| last + 0.05 * j as f64));
    let top = values[values.len() - 1];
    values.push(top + 1.5);

    let signal = TrendFollowing::default().compute_signal(&series(&values));
    assert_eq!(signal.signal_type(), SignalType::Sell);
    assert!(signal.strength() > 0.7);
    for key in ["rsi", "macd", "macd_signal", "bb_upper", "bb_lower", "trend_strength"] {
        assert!(signal.indicator(key).is_some(), "missing {key}");
    }
}

// ── 5. Idempotence ───────────────────────────────────────────────────

#[test]
fn evaluation_is_idempotent() {
    let inputs = [
        series(&golden_cross_values()),
        series(&accelerating(300, 1.0)),
        series(&[1.0; 100]),
    ];
    for strategy in all_strategies() {
        for input in &inputs {
            assert_eq!(strategy.compute_signal(input), strategy.compute_signal(input));
        }
    }
}

#[test]
fn timestamp_is_last_observation() {
    let input = series(&accelerating(300, 1.0));
    for strategy in all_strategies() {
        assert_eq!(strategy.compute_signal(&input).timestamp(), input.as_of());
    }
}

// ── 6. Descriptions and construction ─────────────────────────────────

#[test]
fn descriptions_document_effective_params() {
    let mut params = ParamMap::new();
    params.insert("short_period".into(), 3.0);
    params.insert("long_period".into(), 10.0);
    let strategy = create_strategy(StrategyKind::MaCross, &params).unwrap();
    let description = strategy.describe();

    assert_eq!(description.name, "ma_cross");
    assert_eq!(description.parameters["short_period"].value, 3.0);
    assert_eq!(description.parameters["short_period"].default, 5.0);
    assert_eq!(description.signals.len(), 3);
    assert_eq!(description.config_hash, params_hash("ma_cross", &strategy.params()));
}

#[test]
fn every_kind_describes_itself() {
    for strategy in all_strategies() {
        let description = strategy.describe();
        assert_eq!(description.name, strategy.name());
        assert!(!description.description.is_empty());
        assert!(!description.parameters.is_empty());
        assert!(serde_json::to_string(&description).is_ok());
    }
}

#[test]
fn invalid_params_are_rejected_at_construction() {
    let mut params = ParamMap::new();
    params.insert("low_percentile".into(), 80.0);
    params.insert("high_percentile".into(), 20.0);
    assert!(create_strategy(StrategyKind::DynamicDca, &params).is_err());

    let mut params = ParamMap::new();
    params.insert("rsi_period".into(), 0.0);
    assert!(create_strategy(StrategyKind::TrendFollowing, &params).is_err());
}

#[test]
fn rebuild_changes_params_not_name() {
    let strategy = TrendFollowing::default();
    let mut params = ParamMap::new();
    params.insert("rsi_period".into(), 7.0);
    let rebuilt = strategy.rebuild(&params).unwrap();
    assert_eq!(rebuilt.name(), strategy.name());
    assert_eq!(rebuilt.params()["rsi_period"], 7.0);
    assert_ne!(rebuilt.describe().config_hash, strategy.describe().config_hash);
}
