//! Domain types: NAV observations and the ordered series strategies consume.

pub mod observation;
pub mod series;

pub use observation::NavObservation;
pub use series::{NavSeries, SeriesError};
