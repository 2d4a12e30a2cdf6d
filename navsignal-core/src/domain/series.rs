//! NavSeries — an ordered, duplicate-free run of NAV observations.
//!
//! Strategies only ever see a `NavSeries`, so the ordering invariant is
//! checked once at construction instead of inside every strategy.

use chrono::NaiveDate;
use serde::Serialize;

use super::NavObservation;

/// Errors raised while assembling a series from raw rows.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("observation {index} ({date}) is dated before its predecessor")]
    Unsorted { index: usize, date: NaiveDate },
    #[error("duplicate observation for {0}")]
    DuplicateDate(NaiveDate),
}

/// Immutable NAV series, strictly increasing by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NavSeries {
    observations: Vec<NavObservation>,
}

impl NavSeries {
    /// Wrap already-ordered observations, rejecting out-of-order or repeated dates.
    pub fn new(observations: Vec<NavObservation>) -> Result<Self, SeriesError> {
        for (index, pair) in observations.windows(2).enumerate() {
            let (prev, curr) = (&pair[0], &pair[1]);
            if curr.date == prev.date {
                return Err(SeriesError::DuplicateDate(curr.date));
            }
            if curr.date < prev.date {
                return Err(SeriesError::Unsorted {
                    index: index + 1,
                    date: curr.date,
                });
            }
        }
        Ok(Self { observations })
    }

    /// Sort rows by date first, then validate. Duplicate dates are still rejected.
    pub fn from_unsorted(mut observations: Vec<NavObservation>) -> Result<Self, SeriesError> {
        observations.sort_by_key(|o| o.date);
        Self::new(observations)
    }

    /// Build a daily series from bare unit values, one calendar day apart.
    pub fn from_values(start: NaiveDate, values: &[f64]) -> Self {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &v)| NavObservation::new(start + chrono::Duration::days(i as i64), v))
            .collect();
        Self { observations }
    }

    /// Wrap observations the caller built in strictly increasing date order.
    pub(crate) fn from_ordered(observations: Vec<NavObservation>) -> Self {
        debug_assert!(observations.windows(2).all(|w| w[0].date < w[1].date));
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[NavObservation] {
        &self.observations
    }

    pub fn last(&self) -> Option<&NavObservation> {
        self.observations.last()
    }

    /// Date of the most recent observation.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.last().map(|o| o.date)
    }

    /// Unit values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.unit_value).collect()
    }

    /// True when every observation has a finite unit value.
    pub fn all_values_finite(&self) -> bool {
        self.observations.iter().all(NavObservation::is_usable)
    }

    /// Volume column, `None` where the data layer supplied nothing.
    pub fn volumes(&self) -> Vec<Option<f64>> {
        self.observations.iter().map(|o| o.volume).collect()
    }

    pub fn has_volume(&self) -> bool {
        self.observations.iter().any(|o| o.volume.is_some())
    }

    /// Daily returns in percent, aligned with the observations.
    ///
    /// When the data source supplies `daily_return` on any row, those values
    /// are used as-is (missing rows stay `None`). Otherwise returns are derived
    /// as the percent change of `unit_value`; the first entry is always `None`.
    pub fn daily_returns_pct(&self) -> Vec<Option<f64>> {
        if self.observations.iter().any(|o| o.daily_return.is_some()) {
            return self.observations.iter().map(|o| o.daily_return).collect();
        }

        let mut returns = Vec::with_capacity(self.len());
        returns.push(None);
        for pair in self.observations.windows(2) {
            let (prev, curr) = (pair[0].unit_value, pair[1].unit_value);
            if prev == 0.0 || !prev.is_finite() || !curr.is_finite() {
                returns.push(None);
            } else {
                returns.push(Some((curr / prev - 1.0) * 100.0));
            }
        }
        returns.truncate(self.len());
        returns
    }
}
