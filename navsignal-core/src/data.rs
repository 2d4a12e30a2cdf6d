//! NAV series loading from CSV.
//!
//! Expected header: `date,unit_value[,accumulated_value][,daily_return][,volume]`
//! (`net_value` is accepted for `unit_value`). Dates are `YYYY-MM-DD`. Empty
//! optional cells are read as missing. Rows may arrive in any order; they
//! are sorted by date before the series is validated.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::domain::{NavObservation, NavSeries, SeriesError};

/// Errors that can occur while loading a NAV series.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid series: {0}")]
    Series(#[from] SeriesError),
    #[error("No observations found")]
    Empty,
}

/// Read a NAV series from a CSV file.
pub fn read_nav_csv(path: &Path) -> Result<NavSeries, DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = read_nav_csv_from(file)?;
    tracing::debug!(path = %path.display(), rows = series.len(), "loaded NAV series");
    Ok(series)
}

/// Read a NAV series from any CSV source.
pub fn read_nav_csv_from<R: Read>(reader: R) -> Result<NavSeries, DataError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let observations = csv_reader
        .deserialize::<NavObservation>()
        .collect::<Result<Vec<_>, _>>()?;
    if observations.is_empty() {
        return Err(DataError::Empty);
    }
    Ok(NavSeries::from_unsorted(observations)?)
}

/// Write a NAV series as CSV (same layout `read_nav_csv` accepts).
pub fn write_nav_csv(series: &NavSeries) -> Result<String, DataError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    for observation in series.observations() {
        writer.serialize(observation)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DataError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
