//! Trend following strategy — RSI, MACD and Bollinger sub-signals fused by vote.
//!
//! Each indicator votes BUY, SELL or HOLD with its own strength. A direction
//! wins when at least two sub-signals agree on it, or when it has a single
//! vote whose (trend-boosted) strength exceeds the single-signal floor.
//! BUY is checked before SELL. The final strength is the mean strength of the
//! agreeing votes, capped at 1.
//!
//! Trend strength in [-1, 1]:
//!   0.7 * alignment(price, MA5, MA10, MA20) + 0.3 * 10 * momentum(10)
//! Above 0.3 boosts the BUY side ×1.2; below -0.3 boosts the SELL side.

use crate::domain::NavSeries;
use crate::indicators::warmup::rsi_or_neutral;
use crate::indicators::{moving_average, rsi, volatility, BollingerBands, Macd};
use crate::signal::{SignalType, StrategySignal};

use super::params::{param, param_count, spec_default, ParamMap, ParamSpec, MIN_DATA_POINTS_KEY};
use super::{describe_with, nonzero, snapshot, ParamError, SignalError, Strategy, StrategyDescription};

const NAME: &str = "trend_following";

/// Trend strength beyond which the matching side is boosted.
const TREND_BOOST_THRESHOLD: f64 = 0.3;
const TREND_BOOST: f64 = 1.2;
const MOMENTUM_POINTS: usize = 10;
const PRICE_CHANGE_POINTS: usize = 5;
const VOLATILITY_WINDOW: usize = 20;

/// RSI band treated as neutral; readings outside it lean weakly.
const RSI_LEAN_LOW: f64 = 45.0;
const RSI_LEAN_HIGH: f64 = 55.0;

const PARAMS: &[ParamSpec] = &[
    ParamSpec {
        key: "rsi_period",
        default: 14.0,
        description: "RSI period (observations)",
    },
    ParamSpec {
        key: "rsi_oversold",
        default: 30.0,
        description: "RSI at or below which the fund is oversold",
    },
    ParamSpec {
        key: "rsi_overbought",
        default: 70.0,
        description: "RSI at or above which the fund is overbought",
    },
    ParamSpec {
        key: "macd_fast",
        default: 12.0,
        description: "MACD fast EMA span",
    },
    ParamSpec {
        key: "macd_slow",
        default: 26.0,
        description: "MACD slow EMA span",
    },
    ParamSpec {
        key: "macd_signal",
        default: 9.0,
        description: "MACD signal line EMA span",
    },
    ParamSpec {
        key: "bb_period",
        default: 20.0,
        description: "Bollinger band period (observations)",
    },
    ParamSpec {
        key: "bb_std",
        default: 2.0,
        description: "Bollinger band width in standard deviations",
    },
    ParamSpec {
        key: "single_signal_floor",
        default: 0.6,
        description: "strength a lone sub-signal needs to be reported",
    },
    ParamSpec {
        key: MIN_DATA_POINTS_KEY,
        default: 30.0,
        description: "minimum series length before a signal is attempted",
    },
];

const INDICATOR_GLOSSARY: &[(&str, &str)] = &[
    ("rsi", "relative strength index, 0-100"),
    ("macd", "MACD line: fast EMA minus slow EMA"),
    ("macd_signal", "EMA of the MACD line"),
    ("macd_histogram", "MACD line minus signal line"),
    ("bb_upper", "upper Bollinger band"),
    ("bb_middle", "middle Bollinger band (moving average)"),
    ("bb_lower", "lower Bollinger band"),
    ("bb_position", "price position inside the bands, 0 = lower, 100 = upper"),
    ("trend_strength", "moving-average alignment blended with momentum, -1 to 1"),
    ("price_change_5d", "percent change over the last 5 observations"),
    ("volatility", "standard deviation of the last 20 daily returns (%)"),
];

/// One indicator's vote.
#[derive(Debug, Clone, PartialEq)]
struct SubSignal {
    signal_type: SignalType,
    strength: f64,
    reason: String,
}

impl SubSignal {
    fn new(signal_type: SignalType, strength: f64, reason: String) -> Self {
        Self {
            signal_type,
            strength,
            reason,
        }
    }

    fn hold(reason: String) -> Self {
        Self::new(SignalType::Hold, 0.0, reason)
    }
}

/// Trend following strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendFollowing {
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_std: f64,
    pub single_signal_floor: f64,
    pub min_data_points: usize,
}

impl TrendFollowing {
    /// Build from a parameter map; missing keys take their defaults.
    pub fn from_params(params: &ParamMap) -> Result<Self, ParamError> {
        let get = |key: &str| param(params, key, spec_default(PARAMS, key));
        let count = |key: &str, min: usize| {
            param_count(params, key, spec_default(PARAMS, key) as usize, min)
        };

        let strategy = Self {
            rsi_period: count("rsi_period", 1)?,
            rsi_oversold: get("rsi_oversold")?,
            rsi_overbought: get("rsi_overbought")?,
            macd_fast: count("macd_fast", 1)?,
            macd_slow: count("macd_slow", 1)?,
            macd_signal: count("macd_signal", 1)?,
            bb_period: count("bb_period", 1)?,
            bb_std: get("bb_std")?,
            single_signal_floor: get("single_signal_floor")?,
            min_data_points: count(MIN_DATA_POINTS_KEY, 2)?,
        };

        if !(0.0 < strategy.rsi_oversold
            && strategy.rsi_oversold < strategy.rsi_overbought
            && strategy.rsi_overbought < 100.0)
        {
            return Err(ParamError::Constraint(format!(
                "RSI thresholds must satisfy 0 < oversold ({}) < overbought ({}) < 100",
                strategy.rsi_oversold, strategy.rsi_overbought
            )));
        }
        if strategy.macd_slow <= strategy.macd_fast {
            return Err(ParamError::Constraint(format!(
                "macd_slow ({}) must be > macd_fast ({})",
                strategy.macd_slow, strategy.macd_fast
            )));
        }
        if strategy.bb_std < 0.0 {
            return Err(ParamError::Constraint(format!(
                "bb_std must be >= 0, got {}",
                strategy.bb_std
            )));
        }
        if !(0.0..=1.0).contains(&strategy.single_signal_floor) {
            return Err(ParamError::Constraint(format!(
                "single_signal_floor must be in [0, 1], got {}",
                strategy.single_signal_floor
            )));
        }
        Ok(strategy)
    }

    fn rsi_signal(&self, rsi: f64) -> SubSignal {
        let (oversold, overbought) = (self.rsi_oversold, self.rsi_overbought);
        if rsi <= oversold {
            SubSignal::new(
                SignalType::Buy,
                (oversold - rsi) / oversold,
                format!("RSI({rsi:.1}) oversold"),
            )
        } else if rsi >= overbought {
            SubSignal::new(
                SignalType::Sell,
                (rsi - overbought) / (100.0 - overbought),
                format!("RSI({rsi:.1}) overbought"),
            )
        } else if rsi < RSI_LEAN_LOW {
            SubSignal::new(
                SignalType::Buy,
                (RSI_LEAN_LOW - rsi) / 15.0 * 0.3,
                format!("RSI({rsi:.1}) leaning oversold"),
            )
        } else if rsi > RSI_LEAN_HIGH {
            SubSignal::new(
                SignalType::Sell,
                (rsi - RSI_LEAN_HIGH) / 15.0 * 0.3,
                format!("RSI({rsi:.1}) leaning overbought"),
            )
        } else {
            SubSignal::hold(format!("RSI({rsi:.1}) neutral"))
        }
    }

    fn bollinger_signal(
        &self,
        price: f64,
        upper: f64,
        lower: f64,
        position: f64,
    ) -> Result<SubSignal, SignalError> {
        let signal = if price <= lower {
            let overshoot = (lower - price) / nonzero("lower band", lower)? * 100.0;
            SubSignal::new(
                SignalType::Buy,
                overshoot.min(0.8) + 0.2,
                "price at or below the lower band, oversold bounce possible".to_string(),
            )
        } else if price >= upper {
            let overshoot = (price - upper) / nonzero("upper band", upper)? * 100.0;
            SubSignal::new(
                SignalType::Sell,
                overshoot.min(0.8) + 0.2,
                "price at or above the upper band, pullback possible".to_string(),
            )
        } else if position < 0.2 {
            SubSignal::new(
                SignalType::Buy,
                (0.2 - position) * 2.0,
                format!("price near the lower band ({:.1}% position)", position * 100.0),
            )
        } else if position > 0.8 {
            SubSignal::new(
                SignalType::Sell,
                (position - 0.8) * 2.0,
                format!("price near the upper band ({:.1}% position)", position * 100.0),
            )
        } else {
            SubSignal::hold(format!(
                "price mid-band ({:.1}% position)",
                position * 100.0
            ))
        };
        Ok(signal)
    }

    /// 2-of-3 vote, with a single strong vote also carrying.
    fn fuse(&self, votes: &[SubSignal], trend_strength: f64) -> (SignalType, f64, String) {
        let buys: Vec<&SubSignal> = votes
            .iter()
            .filter(|v| v.signal_type == SignalType::Buy)
            .collect();
        let sells: Vec<&SubSignal> = votes
            .iter()
            .filter(|v| v.signal_type == SignalType::Sell)
            .collect();

        let mut buy_strength: f64 = buys.iter().map(|v| v.strength).sum();
        let mut sell_strength: f64 = sells.iter().map(|v| v.strength).sum();
        if trend_strength > TREND_BOOST_THRESHOLD {
            buy_strength *= TREND_BOOST;
        } else if trend_strength < -TREND_BOOST_THRESHOLD {
            sell_strength *= TREND_BOOST;
        }

        let carries = |count: usize, strength: f64| {
            count >= 2 || (count == 1 && strength > self.single_signal_floor)
        };

        if carries(buys.len(), buy_strength) {
            let mut reasons: Vec<String> = buys.iter().map(|v| v.reason.clone()).collect();
            if trend_strength > TREND_BOOST_THRESHOLD {
                reasons.push(format!("trend supportive (strength {trend_strength:.2})"));
            }
            let strength = (buy_strength / buys.len() as f64).min(1.0);
            return (SignalType::Buy, strength, reasons.join("; "));
        }

        if carries(sells.len(), sell_strength) {
            let mut reasons: Vec<String> = sells.iter().map(|v| v.reason.clone()).collect();
            if trend_strength < -TREND_BOOST_THRESHOLD {
                reasons.push(format!("trend weak (strength {trend_strength:.2})"));
            }
            let strength = (sell_strength / sells.len() as f64).min(1.0);
            return (SignalType::Sell, strength, reasons.join("; "));
        }

        let reason = if buys.len() == sells.len() && !buys.is_empty() {
            "indicators conflict, wait for a clear direction".to_string()
        } else {
            let weak: Vec<&str> = votes
                .iter()
                .filter(|v| v.strength > 0.0)
                .map(|v| v.reason.as_str())
                .collect();
            if weak.is_empty() {
                "all indicators neutral".to_string()
            } else {
                format!("weak signals: {}", weak.join("; "))
            }
        };
        (SignalType::Hold, 0.0, reason)
    }
}

impl Default for TrendFollowing {
    fn default() -> Self {
        let get = |key: &str| spec_default(PARAMS, key);
        let count = |key: &str| spec_default(PARAMS, key) as usize;
        Self {
            rsi_period: count("rsi_period"),
            rsi_oversold: get("rsi_oversold"),
            rsi_overbought: get("rsi_overbought"),
            macd_fast: count("macd_fast"),
            macd_slow: count("macd_slow"),
            macd_signal: count("macd_signal"),
            bb_period: count("bb_period"),
            bb_std: get("bb_std"),
            single_signal_floor: get("single_signal_floor"),
            min_data_points: count(MIN_DATA_POINTS_KEY),
        }
    }
}

impl Strategy for TrendFollowing {
    fn name(&self) -> &str {
        NAME
    }

    fn min_data_points(&self) -> usize {
        self.min_data_points
    }

    fn params(&self) -> ParamMap {
        [
            ("rsi_period", self.rsi_period as f64),
            ("rsi_oversold", self.rsi_oversold),
            ("rsi_overbought", self.rsi_overbought),
            ("macd_fast", self.macd_fast as f64),
            ("macd_slow", self.macd_slow as f64),
            ("macd_signal", self.macd_signal as f64),
            ("bb_period", self.bb_period as f64),
            ("bb_std", self.bb_std),
            ("single_signal_floor", self.single_signal_floor),
            (MIN_DATA_POINTS_KEY, self.min_data_points as f64),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn describe(&self) -> StrategyDescription {
        describe_with(
            NAME,
            "Trend following: RSI, MACD and Bollinger band votes, reported when two agree",
            PARAMS,
            &self.params(),
            INDICATOR_GLOSSARY,
            [
                (SignalType::Buy, "indicators agree the trend is turning or running up"),
                (SignalType::Sell, "indicators agree the trend is turning or running down"),
                (SignalType::Hold, "indicators conflict or are too weak"),
            ],
        )
    }

    fn evaluate(&self, series: &NavSeries) -> Result<StrategySignal, SignalError> {
        let values = series.values();
        let n = values.len();
        if n < 2 {
            return Err(SignalError::TooShort {
                len: n,
                required: 2,
            });
        }
        let price = values[n - 1];

        let current_rsi = rsi_or_neutral(rsi(&values, self.rsi_period)[n - 1]);
        let macd = Macd::compute(&values, self.macd_fast, self.macd_slow, self.macd_signal);
        let bands = BollingerBands::compute(&values, self.bb_period, self.bb_std);

        let (line, signal, histogram) = (macd.line[n - 1], macd.signal[n - 1], macd.histogram[n - 1]);
        let (prev_line, prev_signal) = (macd.line[n - 2], macd.signal[n - 2]);
        let (upper, middle, lower) = (bands.upper[n - 1], bands.middle[n - 1], bands.lower[n - 1]);
        let position = bands.position(n - 1, price);

        let votes = [
            self.rsi_signal(current_rsi),
            macd_signal(line, signal, prev_line, prev_signal, histogram),
            self.bollinger_signal(price, upper, lower, position)?,
        ];
        let trend_strength = trend_strength(&values)?;
        let (signal_type, strength, reason) = self.fuse(&votes, trend_strength);

        let returns = series.daily_returns_pct();
        let indicators = snapshot([
            ("rsi", current_rsi.into()),
            ("macd", line.into()),
            ("macd_signal", signal.into()),
            ("macd_histogram", histogram.into()),
            ("bb_upper", upper.into()),
            ("bb_middle", middle.into()),
            ("bb_lower", lower.into()),
            ("bb_position", (position * 100.0).into()),
            ("trend_strength", trend_strength.into()),
            ("price_change_5d", price_change_pct(&values, PRICE_CHANGE_POINTS)?.into()),
            ("volatility", volatility(&returns, VOLATILITY_WINDOW).into()),
        ]);

        Ok(StrategySignal::new(
            signal_type,
            strength,
            reason,
            indicators,
            series.as_of(),
        ))
    }

    fn rebuild(&self, params: &ParamMap) -> Result<Box<dyn Strategy>, ParamError> {
        Ok(Box::new(Self::from_params(params)?))
    }
}

fn macd_signal(line: f64, signal: f64, prev_line: f64, prev_signal: f64, histogram: f64) -> SubSignal {
    if prev_line <= prev_signal && line > signal {
        SubSignal::new(
            SignalType::Buy,
            (histogram.abs() * 1000.0).min(0.8) + 0.2,
            "MACD crossed above its signal line, momentum strengthening".to_string(),
        )
    } else if prev_line >= prev_signal && line < signal {
        SubSignal::new(
            SignalType::Sell,
            (histogram.abs() * 1000.0).min(0.8) + 0.2,
            "MACD crossed below its signal line, momentum weakening".to_string(),
        )
    } else if line > signal {
        if histogram > 0.0 {
            SubSignal::new(
                SignalType::Buy,
                (histogram * 500.0).min(0.6),
                "MACD holding above its signal line".to_string(),
            )
        } else {
            SubSignal::hold("MACD above its signal line but fading".to_string())
        }
    } else if histogram < 0.0 {
        SubSignal::new(
            SignalType::Sell,
            (histogram.abs() * 500.0).min(0.6),
            "MACD holding below its signal line".to_string(),
        )
    } else {
        SubSignal::hold("MACD below its signal line but stabilizing".to_string())
    }
}

/// Moving-average alignment blended 70/30 with 10-point momentum, in [-1, 1].
fn trend_strength(values: &[f64]) -> Result<f64, SignalError> {
    let n = values.len();
    let price = values[n - 1];
    let ma5 = moving_average(values, 5)[n - 1];
    let ma10 = moving_average(values, 10)[n - 1];
    let ma20 = moving_average(values, 20)[n - 1];

    let alignment = if price > ma5 && ma5 > ma10 && ma10 > ma20 {
        1.0
    } else if price < ma5 && ma5 < ma10 && ma10 < ma20 {
        -1.0
    } else {
        let step = |above: bool, weight: f64| if above { weight } else { -weight };
        step(price > ma5, 0.4) + step(ma5 > ma10, 0.3) + step(ma10 > ma20, 0.3)
    };

    let momentum = if n >= MOMENTUM_POINTS {
        let base = nonzero("momentum base", values[n - MOMENTUM_POINTS])?;
        (price - base) / base
    } else {
        0.0
    };

    Ok((alignment * 0.7 + momentum * 10.0 * 0.3).clamp(-1.0, 1.0))
}

/// Percent change over the last `points` observations; 0 when history is too short.
fn price_change_pct(values: &[f64], points: usize) -> Result<f64, SignalError> {
    let n = values.len();
    if n < points + 1 {
        return Ok(0.0);
    }
    let past = nonzero("past price", values[n - 1 - points])?;
    Ok((values[n - 1] - past) / past * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};

    fn vote(signal_type: SignalType, strength: f64) -> SubSignal {
        SubSignal::new(signal_type, strength, format!("{signal_type} {strength}"))
    }

    fn number(signal: &StrategySignal, name: &str) -> f64 {
        signal.indicator(name).and_then(|v| v.as_f64()).unwrap()
    }

    /// Steady climb, a quiet plateau, then a jump: RSI pinned at 100, price above
    /// the upper band, MACD still below its signal line after the plateau.
    fn overbought_spike() -> Vec<f64> {
        let mut values: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let last = values[39];
        values.extend((1..=20).map(|j| last + 0.05 * j as f64));
        let top = values[values.len() - 1];
        values.push(top + 1.5);
        values
    }

    #[test]
    fn overbought_spike_sells_on_agreement() {
        let series = make_series(&overbought_spike());
        let signal = TrendFollowing::default().compute_signal(&series);

        assert!(number(&signal, "rsi") > 80.0);
        assert!(number(&signal, "macd") < number(&signal, "macd_signal"));
        let price = series.last().unwrap().unit_value;
        assert!(price > number(&signal, "bb_upper"));

        assert_eq!(signal.signal_type(), SignalType::Sell);
        assert_approx(signal.strength(), 0.795, 5e-3);
        assert!(signal.reason().contains("overbought"));
    }

    #[test]
    fn oversold_drop_buys_on_agreement() {
        let mut values: Vec<f64> = (0..40).map(|i| 200.0 - i as f64).collect();
        let last = values[39];
        values.extend((1..=20).map(|j| last - 0.05 * j as f64));
        let bottom = values[values.len() - 1];
        values.push(bottom - 1.5);

        let signal = TrendFollowing::default().compute_signal(&make_series(&values));
        assert_eq!(signal.signal_type(), SignalType::Buy);
        assert_approx(signal.strength(), 0.772, 5e-3);
    }

    #[test]
    fn constant_series_holds() {
        let signal = TrendFollowing::default().compute_signal(&make_series(&[1.0; 40]));
        assert_eq!(signal.signal_type(), SignalType::Hold);
        assert_eq!(signal.strength(), 0.0);
        assert_eq!(number(&signal, "rsi"), 50.0);
        assert_eq!(number(&signal, "bb_position"), 50.0);
    }

    #[test]
    fn two_agreeing_votes_carry() {
        let tf = TrendFollowing::default();
        let votes = [
            vote(SignalType::Buy, 0.3),
            vote(SignalType::Buy, 0.5),
            vote(SignalType::Sell, 0.9),
        ];
        let (t, strength, _) = tf.fuse(&votes, 0.0);
        assert_eq!(t, SignalType::Buy);
        assert_approx(strength, 0.4, DEFAULT_EPSILON);
    }

    #[test]
    fn single_vote_needs_floor() {
        let tf = TrendFollowing::default();
        let weak = [
            vote(SignalType::Sell, 0.6),
            vote(SignalType::Hold, 0.0),
            vote(SignalType::Hold, 0.0),
        ];
        let (t, strength, reason) = tf.fuse(&weak, 0.0);
        assert_eq!(t, SignalType::Hold);
        assert_eq!(strength, 0.0);
        assert!(reason.starts_with("weak signals:"));

        let strong = [
            vote(SignalType::Sell, 0.61),
            vote(SignalType::Hold, 0.0),
            vote(SignalType::Hold, 0.0),
        ];
        let (t, strength, _) = tf.fuse(&strong, 0.0);
        assert_eq!(t, SignalType::Sell);
        assert_approx(strength, 0.61, DEFAULT_EPSILON);
    }

    #[test]
    fn trend_boost_lifts_single_vote_over_floor() {
        let tf = TrendFollowing::default();
        let votes = [
            vote(SignalType::Buy, 0.55),
            vote(SignalType::Hold, 0.0),
            vote(SignalType::Hold, 0.0),
        ];
        let (t, _, _) = tf.fuse(&votes, 0.0);
        assert_eq!(t, SignalType::Hold);

        let (t, strength, reason) = tf.fuse(&votes, 0.5);
        assert_eq!(t, SignalType::Buy);
        assert_approx(strength, 0.66, DEFAULT_EPSILON);
        assert!(reason.contains("trend supportive"));
    }

    #[test]
    fn one_buy_one_sell_is_conflict() {
        let tf = TrendFollowing::default();
        let votes = [
            vote(SignalType::Buy, 0.5),
            vote(SignalType::Sell, 0.5),
            vote(SignalType::Hold, 0.0),
        ];
        let (t, _, reason) = tf.fuse(&votes, 0.0);
        assert_eq!(t, SignalType::Hold);
        assert!(reason.contains("conflict"));
    }

    #[test]
    fn all_hold_is_neutral() {
        let tf = TrendFollowing::default();
        let votes = [
            vote(SignalType::Hold, 0.0),
            vote(SignalType::Hold, 0.0),
            vote(SignalType::Hold, 0.0),
        ];
        assert_eq!(tf.fuse(&votes, 0.0).2, "all indicators neutral");
    }

    #[test]
    fn floor_is_configurable() {
        let mut params = ParamMap::new();
        params.insert("single_signal_floor".into(), 0.4);
        let tf = TrendFollowing::from_params(&params).unwrap();
        let votes = [
            vote(SignalType::Buy, 0.45),
            vote(SignalType::Hold, 0.0),
            vote(SignalType::Hold, 0.0),
        ];
        assert_eq!(tf.fuse(&votes, 0.0).0, SignalType::Buy);
    }

    #[test]
    fn rsi_bands() {
        let tf = TrendFollowing::default();
        assert_eq!(tf.rsi_signal(15.0).signal_type, SignalType::Buy);
        assert_approx(tf.rsi_signal(15.0).strength, 0.5, DEFAULT_EPSILON);
        assert_approx(tf.rsi_signal(85.0).strength, 0.5, DEFAULT_EPSILON);
        assert_approx(tf.rsi_signal(40.0).strength, 0.1, DEFAULT_EPSILON);
        assert_eq!(tf.rsi_signal(60.0).signal_type, SignalType::Sell);
        assert_eq!(tf.rsi_signal(50.0).signal_type, SignalType::Hold);
    }

    #[test]
    fn macd_cross_and_hold_states() {
        let up = macd_signal(0.02, 0.01, 0.0, 0.005, 0.01);
        assert_eq!(up.signal_type, SignalType::Buy);
        assert_approx(up.strength, 0.8 + 0.2, DEFAULT_EPSILON);

        let holding = macd_signal(-0.01, -0.0105, -0.01, -0.0102, 0.0005);
        assert_eq!(holding.signal_type, SignalType::Buy);
        assert_approx(holding.strength, 0.25, DEFAULT_EPSILON);

        let flat = macd_signal(0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(flat.signal_type, SignalType::Hold);
    }

    #[test]
    fn trend_strength_alignment() {
        let up: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let down: Vec<f64> = up.iter().rev().copied().collect();
        // full alignment 0.7 plus momentum (129 - 120) / 120 * 3
        assert_approx(trend_strength(&up).unwrap(), 0.7 + 0.075 * 3.0, DEFAULT_EPSILON);
        assert!(trend_strength(&down).unwrap() < -0.9);
        // flat: every strict comparison fails, -0.4 - 0.3 - 0.3 = -1, times 0.7
        assert_approx(trend_strength(&[5.0; 30]).unwrap(), -0.7, DEFAULT_EPSILON);
    }

    #[test]
    fn price_change_over_five_points() {
        let values = [100.0, 101.0, 102.0, 103.0, 104.0, 110.0];
        assert_approx(price_change_pct(&values, 5).unwrap(), 10.0, DEFAULT_EPSILON);
        assert_eq!(price_change_pct(&values[..5], 5).unwrap(), 0.0);
    }

    #[test]
    fn rejects_inverted_macd_and_rsi() {
        let mut params = ParamMap::new();
        params.insert("macd_slow".into(), 10.0);
        assert!(TrendFollowing::from_params(&params).is_err());

        let mut params = ParamMap::new();
        params.insert("rsi_oversold".into(), 75.0);
        assert!(TrendFollowing::from_params(&params).is_err());
    }

    #[test]
    fn rejects_oversized_period() {
        let mut params = ParamMap::new();
        params.insert("rsi_period".into(), 1e30);
        let err = TrendFollowing::from_params(&params).unwrap_err();
        assert!(matches!(err, ParamError::InvalidCount { .. }));
    }

    #[test]
    fn default_is_built_from_param_table() {
        let d = TrendFollowing::default();
        assert_eq!(d, TrendFollowing::from_params(&ParamMap::new()).unwrap());
        assert_eq!((d.rsi_period, d.macd_fast, d.macd_slow, d.macd_signal), (14, 12, 26, 9));
        assert_eq!((d.bb_period, d.min_data_points), (20, 30));
        assert_eq!(d.single_signal_floor, 0.6);
    }
}
