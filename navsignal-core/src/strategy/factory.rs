//! Factory — converts a strategy kind plus a parameter map into a runtime trait object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::params::{ParamError, ParamMap};
use super::{DynamicPercentile, MovingAverageCross, Strategy, TrendFollowing};

/// The strategy implementations the engine knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    MaCross,
    #[serde(alias = "dynamic_percentile")]
    DynamicDca,
    TrendFollowing,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::MaCross,
        StrategyKind::DynamicDca,
        StrategyKind::TrendFollowing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::MaCross => "ma_cross",
            StrategyKind::DynamicDca => "dynamic_dca",
            StrategyKind::TrendFollowing => "trend_following",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown strategy kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown strategy kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for StrategyKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ma_cross" => Ok(StrategyKind::MaCross),
            "dynamic_dca" | "dynamic_percentile" => Ok(StrategyKind::DynamicDca),
            "trend_following" => Ok(StrategyKind::TrendFollowing),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Create a strategy of `kind` from a parameter map. Missing keys take their defaults.
pub fn create_strategy(kind: StrategyKind, params: &ParamMap) -> Result<Box<dyn Strategy>, ParamError> {
    Ok(match kind {
        StrategyKind::MaCross => Box::new(MovingAverageCross::from_params(params)?),
        StrategyKind::DynamicDca => Box::new(DynamicPercentile::from_params(params)?),
        StrategyKind::TrendFollowing => Box::new(TrendFollowing::from_params(params)?),
    })
}
