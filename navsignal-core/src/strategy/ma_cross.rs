//! Moving average cross strategy — golden cross and death cross detection.
//!
//! BUY when the short MA crosses above the long MA at the latest point,
//! SELL when it crosses below. Without a cross, a gap wider than 1% between
//! the averages yields a weaker persistence signal in the gap's direction.
//!
//! Cross strength:
//!   min(|gap%| / 2, 0.8) + (volume_factor - 1) * 0.2 + max(±trend, 0) * 0.3
//!
//! where volume_factor = min(mean(last 5 volumes) / mean(all volumes), 2)
//! (1.0 without volume data) and trend is the least-squares slope over the
//! last 10 points, normalized by their average and scaled ×10 into [-1, 1].

use crate::domain::NavSeries;
use crate::indicators::moving_average;
use crate::indicators::stats::{linear_slope, mean};
use crate::signal::{SignalType, StrategySignal};

use super::params::{param, param_count, ParamMap, ParamSpec, MIN_DATA_POINTS_KEY};
use super::{describe_with, nonzero, snapshot, ParamError, SignalError, Strategy, StrategyDescription};

const NAME: &str = "ma_cross";

/// Gap (in percent of the long MA) beyond which a persistence signal fires.
const PERSISTENCE_GAP_PCT: f64 = 1.0;
const PERSISTENCE_MAX_STRENGTH: f64 = 0.6;
const CROSS_BASE_MAX_STRENGTH: f64 = 0.8;
const RECENT_VOLUME_POINTS: usize = 5;
const MAX_VOLUME_FACTOR: f64 = 2.0;
const TREND_POINTS: usize = 10;

const PARAMS: &[ParamSpec] = &[
    ParamSpec {
        key: "short_period",
        default: 5.0,
        description: "short moving average period (observations)",
    },
    ParamSpec {
        key: "long_period",
        default: 20.0,
        description: "long moving average period (observations)",
    },
    ParamSpec {
        key: "volume_threshold",
        default: 1.2,
        description: "volume factor above which a cross is reported as volume-confirmed",
    },
    ParamSpec {
        key: MIN_DATA_POINTS_KEY,
        default: 25.0,
        description: "minimum series length before a signal is attempted",
    },
];

/// Moving average cross strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverageCross {
    pub short_period: usize,
    pub long_period: usize,
    pub volume_threshold: f64,
    pub min_data_points: usize,
}

impl MovingAverageCross {
    pub fn new(short_period: usize, long_period: usize) -> Result<Self, ParamError> {
        let mut params = ParamMap::new();
        params.insert("short_period".into(), short_period as f64);
        params.insert("long_period".into(), long_period as f64);
        Self::from_params(&params)
    }

    /// Build from a parameter map; missing keys take their defaults.
    pub fn from_params(params: &ParamMap) -> Result<Self, ParamError> {
        let short_period = param_count(params, "short_period", default_count("short_period"), 1)?;
        let long_period = param_count(params, "long_period", default_count("long_period"), 1)?;
        let volume_threshold = param(
            params,
            "volume_threshold",
            super::params::spec_default(PARAMS, "volume_threshold"),
        )?;
        let min_data_points =
            param_count(params, MIN_DATA_POINTS_KEY, default_count(MIN_DATA_POINTS_KEY), 2)?;

        if short_period >= long_period {
            return Err(ParamError::Constraint(format!(
                "short_period ({short_period}) must be < long_period ({long_period})"
            )));
        }
        if volume_threshold < 0.0 {
            return Err(ParamError::Constraint(format!(
                "volume_threshold must be >= 0, got {volume_threshold}"
            )));
        }

        Ok(Self {
            short_period,
            long_period,
            volume_threshold,
            min_data_points,
        })
    }
}

impl Default for MovingAverageCross {
    fn default() -> Self {
        Self {
            short_period: default_count("short_period"),
            long_period: default_count("long_period"),
            volume_threshold: super::params::spec_default(PARAMS, "volume_threshold"),
            min_data_points: default_count(MIN_DATA_POINTS_KEY),
        }
    }
}

fn default_count(key: &str) -> usize {
    super::params::spec_default(PARAMS, key) as usize
}

impl Strategy for MovingAverageCross {
    fn name(&self) -> &str {
        NAME
    }

    fn min_data_points(&self) -> usize {
        self.min_data_points
    }

    fn params(&self) -> ParamMap {
        [
            ("short_period", self.short_period as f64),
            ("long_period", self.long_period as f64),
            ("volume_threshold", self.volume_threshold),
            (MIN_DATA_POINTS_KEY, self.min_data_points as f64),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn describe(&self) -> StrategyDescription {
        describe_with(
            NAME,
            "Moving average cross: trades golden and death crosses of a short and a long moving average",
            PARAMS,
            &self.params(),
            &[],
            [
                (SignalType::Buy, "short MA crossed above the long MA (golden cross)"),
                (SignalType::Sell, "short MA crossed below the long MA (death cross)"),
                (SignalType::Hold, "no cross and no clear gap between the averages"),
            ],
        )
    }

    fn evaluate(&self, series: &NavSeries) -> Result<StrategySignal, SignalError> {
        let values = series.values();
        let n = values.len();
        if n == 0 {
            return Err(SignalError::EmptySeries);
        }

        let short_ma = moving_average(&values, self.short_period);
        let long_ma = moving_average(&values, self.long_period);

        let (cur_short, cur_long) = (short_ma[n - 1], long_ma[n - 1]);
        let (prev_short, prev_long) = if n >= 2 {
            (short_ma[n - 2], long_ma[n - 2])
        } else {
            (cur_short, cur_long)
        };

        let gap = cur_short - cur_long;
        let gap_pct = gap / nonzero("long moving average", cur_long)? * 100.0;

        let golden_cross = prev_short <= prev_long && cur_short > cur_long;
        let death_cross = prev_short >= prev_long && cur_short < cur_long;

        let volume_factor = volume_factor(series);
        let trend = price_trend(&values, TREND_POINTS);

        let base = (gap_pct.abs() / 2.0).min(CROSS_BASE_MAX_STRENGTH);
        let volume_adjustment = (volume_factor - 1.0) * 0.2;
        let volume_note = if volume_factor > self.volume_threshold {
            format!(", volume up {volume_factor:.1}x")
        } else {
            String::new()
        };

        let (signal_type, strength, reason) = if golden_cross {
            (
                SignalType::Buy,
                (base + volume_adjustment + trend.max(0.0) * 0.3).min(1.0),
                format!(
                    "golden cross: MA{} crossed above MA{}{volume_note}",
                    self.short_period, self.long_period
                ),
            )
        } else if death_cross {
            (
                SignalType::Sell,
                (base + volume_adjustment + (-trend).max(0.0) * 0.3).min(1.0),
                format!(
                    "death cross: MA{} crossed below MA{}{volume_note}",
                    self.short_period, self.long_period
                ),
            )
        } else if gap_pct.abs() > PERSISTENCE_GAP_PCT {
            let strength = (gap_pct.abs() / 5.0).min(PERSISTENCE_MAX_STRENGTH);
            if gap > 0.0 {
                (
                    SignalType::Buy,
                    strength,
                    format!("short MA holding {gap_pct:.2}% above long MA, bullish"),
                )
            } else {
                (
                    SignalType::Sell,
                    strength,
                    format!("short MA holding {:.2}% below long MA, bearish", gap_pct.abs()),
                )
            }
        } else {
            (
                SignalType::Hold,
                0.0,
                "averages converged, no clear direction".to_string(),
            )
        };

        let indicators = snapshot([
            ("short_ma", cur_short.into()),
            ("long_ma", cur_long.into()),
            ("ma_diff_pct", gap_pct.into()),
            ("volume_factor", volume_factor.into()),
            ("price_trend", trend.into()),
            ("golden_cross", golden_cross.into()),
            ("death_cross", death_cross.into()),
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

/// Recent volume relative to the series average, capped at 2. 1.0 without usable volume.
fn volume_factor(series: &NavSeries) -> f64 {
    let volumes = series.volumes();
    let present: Vec<f64> = volumes
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    let Some(average) = mean(&present) else {
        return 1.0;
    };

    let start = volumes.len().saturating_sub(RECENT_VOLUME_POINTS);
    let recent: Vec<f64> = volumes[start..]
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    match mean(&recent) {
        Some(recent) if average > 0.0 => (recent / average).min(MAX_VOLUME_FACTOR),
        _ => 1.0,
    }
}

/// Normalized least-squares trend over the last `points` values, in [-1, 1].
pub(crate) fn price_trend(values: &[f64], points: usize) -> f64 {
    let k = points.min(values.len());
    if k == 0 {
        return 0.0;
    }
    let recent = &values[values.len() - k..];
    let average = recent.iter().sum::<f64>() / k as f64;
    if average == 0.0 {
        return 0.0;
    }
    let normalized = linear_slope(recent) * k as f64 / average;
    (normalized * 10.0).clamp(-1.0, 1.0)
}
