//! NavObservation — one day of fund net-asset-value data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Net-asset-value record for a single fund on a single date.
///
/// `unit_value` is the only field every strategy requires. The optional
/// fields are passed through as supplied by the data layer; missing days
/// are not filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavObservation {
    pub date: NaiveDate,
    #[serde(alias = "net_value")]
    pub unit_value: f64,
    #[serde(default)]
    pub accumulated_value: Option<f64>,
    /// Daily return in percent, as published by the data source.
    #[serde(default)]
    pub daily_return: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl NavObservation {
    /// Observation carrying only the required fields.
    pub fn new(date: NaiveDate, unit_value: f64) -> Self {
        Self {
            date,
            unit_value,
            accumulated_value: None,
            daily_return: None,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_daily_return(mut self, daily_return: f64) -> Self {
        self.daily_return = Some(daily_return);
        self
    }

    pub fn with_accumulated_value(mut self, accumulated_value: f64) -> Self {
        self.accumulated_value = Some(accumulated_value);
        self
    }

    /// True when the unit value can be used in arithmetic.
    pub fn is_usable(&self) -> bool {
        self.unit_value.is_finite()
    }
}
