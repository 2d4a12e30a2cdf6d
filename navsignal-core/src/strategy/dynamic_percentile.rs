//! Dynamic percentile strategy ("dynamic DCA") — buy low, trim high by valuation percentile.
//!
//! Three percentile ranks over the lookback window are blended into one
//! composite valuation percentile:
//!   price:  the unit value itself
//!   PE proxy: value / 60-point moving average
//!   PB proxy: value / trailing 30-point minimum
//!
//! The composite is compared to the low/high thresholds. Pessimistic
//! sentiment and a falling trend reinforce BUY; the mirror reinforces SELL.
//! Between the thresholds the signal scales with distance from the midpoint
//! and falls back to HOLD below 0.2.

use crate::domain::NavSeries;
use crate::indicators::stats::{mean, sample_std, skewness};
use crate::indicators::warmup::NEUTRAL_PERCENTILE;
use crate::indicators::{moving_average, percentile_rank_last, rank_of_last, rolling_min};
use crate::indicators::{trailing_returns, volatility};
use crate::signal::{SignalType, StrategySignal};

use super::params::{param, param_count, spec_default, ParamMap, ParamSpec, MIN_DATA_POINTS_KEY};
use super::{describe_with, finite, nonzero, snapshot, ParamError, SignalError, Strategy, StrategyDescription};

const NAME: &str = "dynamic_dca";

/// Period of the moving average behind the PE proxy.
const VALUATION_MA_PERIOD: usize = 60;
/// Window of the trailing minimum behind the PB proxy.
const SUPPORT_WINDOW: usize = 30;
/// PE/PB histories shorter than this rank as neutral.
const MIN_PROXY_HISTORY: usize = 30;
const SENTIMENT_RETURNS: usize = 20;
const MIN_SENTIMENT_RETURNS: usize = 5;
/// Floor on the deviation used to scale mean return in the sentiment score.
const SENTIMENT_STD_FLOOR: f64 = 0.1;
const TREND_MIN_POINTS: usize = 20;
const VOLATILITY_WINDOW: usize = 30;
const ONE_YEAR_POINTS: usize = 252;
/// Neutral-zone strengths below this are reported as HOLD.
const NEUTRAL_ZONE_FLOOR: f64 = 0.2;

const PARAMS: &[ParamSpec] = &[
    ParamSpec {
        key: "low_percentile",
        default: 25.0,
        description: "composite percentile at or below which the fund is considered cheap",
    },
    ParamSpec {
        key: "high_percentile",
        default: 75.0,
        description: "composite percentile at or above which the fund is considered expensive",
    },
    ParamSpec {
        key: "lookback_days",
        default: 252.0,
        description: "history window for the percentile ranks (observations)",
    },
    ParamSpec {
        key: "price_weight",
        default: 0.3,
        description: "weight of the raw price percentile in the composite",
    },
    ParamSpec {
        key: "pe_weight",
        default: 0.4,
        description: "weight of the PE proxy percentile in the composite",
    },
    ParamSpec {
        key: "pb_weight",
        default: 0.3,
        description: "weight of the PB proxy percentile in the composite",
    },
    ParamSpec {
        key: MIN_DATA_POINTS_KEY,
        default: 60.0,
        description: "minimum series length before a signal is attempted",
    },
];

/// Dynamic percentile (valuation-driven DCA) strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicPercentile {
    pub low_percentile: f64,
    pub high_percentile: f64,
    pub lookback: usize,
    pub price_weight: f64,
    pub pe_weight: f64,
    pub pb_weight: f64,
    pub min_data_points: usize,
}

/// Intermediate readings behind one decision.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Valuation {
    price_percentile: f64,
    pe_proxy: f64,
    pe_percentile: f64,
    pb_proxy: f64,
    pb_percentile: f64,
}

impl DynamicPercentile {
    /// Build from a parameter map; missing keys take their defaults.
    pub fn from_params(params: &ParamMap) -> Result<Self, ParamError> {
        let get = |key: &str| param(params, key, spec_default(PARAMS, key));
        let low_percentile = get("low_percentile")?;
        let high_percentile = get("high_percentile")?;
        let lookback = param_count(
            params,
            "lookback_days",
            spec_default(PARAMS, "lookback_days") as usize,
            1,
        )?;
        let price_weight = get("price_weight")?;
        let pe_weight = get("pe_weight")?;
        let pb_weight = get("pb_weight")?;
        let min_data_points = param_count(
            params,
            MIN_DATA_POINTS_KEY,
            spec_default(PARAMS, MIN_DATA_POINTS_KEY) as usize,
            2,
        )?;

        if !(0.0 < low_percentile && low_percentile < high_percentile && high_percentile < 100.0) {
            return Err(ParamError::Constraint(format!(
                "percentile thresholds must satisfy 0 < low ({low_percentile}) < high ({high_percentile}) < 100"
            )));
        }
        if price_weight < 0.0 || pe_weight < 0.0 || pb_weight < 0.0 {
            return Err(ParamError::Constraint(
                "composite weights must be >= 0".to_string(),
            ));
        }

        Ok(Self {
            low_percentile,
            high_percentile,
            lookback,
            price_weight,
            pe_weight,
            pb_weight,
            min_data_points,
        })
    }

    fn valuation(&self, values: &[f64]) -> Result<Valuation, SignalError> {
        let n = values.len();
        let price_percentile = percentile_rank_last(values, self.lookback);

        // PE proxy: distance above the long average, ranked over its own history.
        let long_ma = moving_average(values, VALUATION_MA_PERIOD);
        let pe_series = ratios(values, &long_ma, "valuation moving average")?;
        let pe_proxy = pe_series[n - 1];
        let pe_history = self.lookback.min(n.saturating_sub(VALUATION_MA_PERIOD));
        let pe_percentile = if pe_history > MIN_PROXY_HISTORY {
            rank_of_last(&pe_series[n - pe_history..])
        } else {
            NEUTRAL_PERCENTILE
        };

        // PB proxy: distance above recent support.
        let support = rolling_min(values, SUPPORT_WINDOW);
        let pb_series = ratios(values, &support, "trailing minimum")?;
        let pb_proxy = pb_series[n - 1];
        let pb_percentile = if n > MIN_PROXY_HISTORY {
            rank_of_last(&pb_series[n - self.lookback.min(n)..])
        } else {
            NEUTRAL_PERCENTILE
        };

        Ok(Valuation {
            price_percentile,
            pe_proxy,
            pe_percentile,
            pb_proxy,
            pb_percentile,
        })
    }

    fn composite(&self, v: &Valuation) -> f64 {
        v.price_percentile * self.price_weight
            + v.pe_percentile * self.pe_weight
            + v.pb_percentile * self.pb_weight
    }

    /// Decision policy over the composite percentile.
    fn decide(&self, composite: f64, sentiment: f64, trend: f64) -> (SignalType, f64, String) {
        let low = self.low_percentile;
        let high = self.high_percentile;

        if composite <= low {
            let base = (low - composite) / low * 0.8 + 0.2;
            let strength = (base + (-sentiment).max(0.0) * 0.2 + (-trend).max(0.0) * 0.1).min(1.0);
            let mut reason = format!(
                "valuation low ({composite:.1}th percentile), accumulate on weakness"
            );
            if sentiment < -0.3 {
                reason.push_str(", pessimistic sentiment improves the entry");
            }
            return (SignalType::Buy, strength, reason);
        }

        if composite >= high {
            let base = (composite - high) / (100.0 - high) * 0.8 + 0.2;
            let strength = (base + sentiment.max(0.0) * 0.2 + trend.max(0.0) * 0.1).min(1.0);
            let mut reason = format!("valuation high ({composite:.1}th percentile), take profits");
            if sentiment > 0.3 {
                reason.push_str(", sentiment euphoric, stay cautious");
            }
            return (SignalType::Sell, strength, reason);
        }

        let mid = (low + high) / 2.0;
        let (signal_type, strength, reason) = if composite < mid {
            (
                SignalType::Buy,
                (mid - composite) / (mid - low) * 0.5,
                format!(
                    "valuation moderate-low ({composite:.1}th percentile), consider buying in tranches"
                ),
            )
        } else {
            (
                SignalType::Sell,
                (composite - mid) / (high - mid) * 0.5,
                format!(
                    "valuation moderate-high ({composite:.1}th percentile), consider trimming in tranches"
                ),
            )
        };

        if strength < NEUTRAL_ZONE_FLOOR {
            (
                SignalType::Hold,
                0.0,
                format!("neutral zone ({composite:.1}th percentile), watch and wait"),
            )
        } else {
            (signal_type, strength, reason)
        }
    }
}

impl Default for DynamicPercentile {
    fn default() -> Self {
        let get = |key: &str| spec_default(PARAMS, key);
        Self {
            low_percentile: get("low_percentile"),
            high_percentile: get("high_percentile"),
            lookback: get("lookback_days") as usize,
            price_weight: get("price_weight"),
            pe_weight: get("pe_weight"),
            pb_weight: get("pb_weight"),
            min_data_points: get(MIN_DATA_POINTS_KEY) as usize,
        }
    }
}

impl Strategy for DynamicPercentile {
    fn name(&self) -> &str {
        NAME
    }

    fn min_data_points(&self) -> usize {
        self.min_data_points
    }

    fn params(&self) -> ParamMap {
        [
            ("low_percentile", self.low_percentile),
            ("high_percentile", self.high_percentile),
            ("lookback_days", self.lookback as f64),
            ("price_weight", self.price_weight),
            ("pe_weight", self.pe_weight),
            ("pb_weight", self.pb_weight),
            (MIN_DATA_POINTS_KEY, self.min_data_points as f64),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn describe(&self) -> StrategyDescription {
        describe_with(
            NAME,
            "Dynamic DCA: scales purchases and sales by where the fund sits in its own valuation history",
            PARAMS,
            &self.params(),
            &[],
            [
                (SignalType::Buy, "valuation near the bottom of its history, buy"),
                (SignalType::Sell, "valuation near the top of its history, sell"),
                (SignalType::Hold, "valuation in the neutral zone, hold and watch"),
            ],
        )
    }

    fn evaluate(&self, series: &NavSeries) -> Result<StrategySignal, SignalError> {
        let values = series.values();
        let n = values.len();
        if n == 0 {
            return Err(SignalError::EmptySeries);
        }

        let valuation = self.valuation(&values)?;
        let composite = finite("composite percentile", self.composite(&valuation))?;

        let returns = series.daily_returns_pct();
        let sentiment = market_sentiment(&trailing_returns(&returns, SENTIMENT_RETURNS));
        let trend = trend_factor(&values)?;
        let (signal_type, strength, reason) = self.decide(composite, sentiment, trend);

        let current_price = values[n - 1];
        let year = &values[n - ONE_YEAR_POINTS.min(n)..];
        let avg_price_1y = mean(year).unwrap_or(current_price);

        let indicators = snapshot([
            ("price_percentile", valuation.price_percentile.into()),
            ("pe_proxy", valuation.pe_proxy.into()),
            ("pe_percentile", valuation.pe_percentile.into()),
            ("pb_proxy", valuation.pb_proxy.into()),
            ("pb_percentile", valuation.pb_percentile.into()),
            ("composite_percentile", composite.into()),
            ("market_sentiment", sentiment.into()),
            ("trend_factor", trend.into()),
            ("current_price", current_price.into()),
            ("avg_price_1y", avg_price_1y.into()),
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

/// Element-wise `values / base`, rejecting zero or non-finite denominators.
fn ratios(values: &[f64], base: &[f64], what: &'static str) -> Result<Vec<f64>, SignalError> {
    values
        .iter()
        .zip(base)
        .map(|(v, b)| Ok(v / nonzero(what, *b)?))
        .collect()
}

/// Sentiment in [-1, 1] from the mean/deviation ratio and skew of recent returns.
fn market_sentiment(returns: &[f64]) -> f64 {
    if returns.len() < MIN_SENTIMENT_RETURNS {
        return 0.0;
    }
    let (Some(mu), Some(sd)) = (mean(returns), sample_std(returns)) else {
        return 0.0;
    };
    if sd == 0.0 {
        return 0.0;
    }
    let sentiment = mu / sd.max(SENTIMENT_STD_FLOOR) * 0.7 + skewness(returns, mu, sd) * 0.3;
    sentiment.clamp(-1.0, 1.0)
}

/// Trend factor in [-1, 1] from the deviation of price above its 5- and 20-point averages.
fn trend_factor(values: &[f64]) -> Result<f64, SignalError> {
    let n = values.len();
    if n < TREND_MIN_POINTS {
        return Ok(0.0);
    }
    let price = values[n - 1];
    let ma5 = nonzero("5-point average", moving_average(values, 5)[n - 1])?;
    let ma20 = nonzero("20-point average", moving_average(values, 20)[n - 1])?;
    let factor = ((price - ma5) / ma5 * 0.6 + (price - ma20) / ma20 * 0.4) * 10.0;
    Ok(factor.clamp(-1.0, 1.0))
}
