//! Feature engineering over the historical table

use crate::data::HistoricalData;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use tracing::debug;

/// First calendar year of the later epidemic phase; earlier years carry
/// phase 0, this year and onward carry phase 1
pub const PHASE_THRESHOLD_YEAR: i32 = 2023;

/// Window length shared by the rolling mean and the trend
pub const ROLLING_WINDOW: usize = 7;

/// Binary epidemic-phase flag for a calendar year
pub fn epidemic_phase(year: i32) -> u8 {
    if year >= PHASE_THRESHOLD_YEAR {
        1
    } else {
        0
    }
}

/// One historical row augmented with the engineered fields
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub location: String,
    /// Lexicographic label encoding over the table's distinct locations
    pub location_encoded: u32,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub epidemic_phase: u8,
    /// Days elapsed since the earliest date anywhere in the table
    pub days_since_start: i64,
    pub total_cases: Option<f64>,
    pub new_cases: Option<f64>,
    pub total_deaths: Option<f64>,
    pub new_deaths: Option<f64>,
    /// Trailing 7-day mean of new cases; present once at least one valid
    /// day falls inside the window
    pub new_cases_rolling7: Option<f64>,
    /// New cases minus the value 7 rows prior; undefined for a location's
    /// first 7 rows
    pub trend_new_cases: Option<f64>,
}

/// Engineered historical table plus the series-wide context snapshot
/// selection and forecasting need
#[derive(Debug, Clone)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
    series_start: NaiveDate,
    max_year: i32,
}

impl FeatureTable {
    /// Engineered rows, sorted by (location, date)
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Earliest date anywhere in the historical table
    pub fn series_start(&self) -> NaiveDate {
        self.series_start
    }

    /// Latest calendar year present anywhere in the historical table
    pub fn max_year(&self) -> i32 {
        self.max_year
    }

    /// Number of engineered rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Derive the engineered feature table from the historical observations.
///
/// Rolling statistics are computed per location; the window resets at every
/// location boundary. Missing new-case values are skipped by the rolling
/// mean and propagate as missing through the trend.
pub fn build_features(data: &HistoricalData) -> Result<FeatureTable> {
    let observations = data.observations();
    if observations.is_empty() {
        return Err(ForecastError::DataError(
            "cannot engineer features from an empty historical table".to_string(),
        ));
    }

    let series_start = observations
        .iter()
        .map(|o| o.date)
        .min()
        .ok_or_else(|| ForecastError::DataError("historical table has no dates".to_string()))?;
    let max_year = observations
        .iter()
        .map(|o| o.date.year())
        .max()
        .ok_or_else(|| ForecastError::DataError("historical table has no dates".to_string()))?;

    let encodings = data.locations();

    let mut rows = Vec::with_capacity(observations.len());
    let mut window: Vec<Option<f64>> = Vec::new();
    let mut current_location: Option<&str> = None;

    for observation in observations {
        if current_location != Some(observation.location.as_str()) {
            window.clear();
            current_location = Some(observation.location.as_str());
        }
        window.push(observation.new_cases);

        let tail = &window[window.len().saturating_sub(ROLLING_WINDOW)..];
        let valid: Vec<f64> = tail.iter().flatten().copied().collect();
        let rolling = if valid.is_empty() {
            None
        } else {
            Some(valid.iter().sum::<f64>() / valid.len() as f64)
        };

        let trend = if window.len() > ROLLING_WINDOW {
            match (observation.new_cases, window[window.len() - 1 - ROLLING_WINDOW]) {
                (Some(current), Some(prior)) => Some(current - prior),
                _ => None,
            }
        } else {
            None
        };

        let location_encoded = encodings
            .binary_search(&observation.location.as_str())
            .map_err(|_| {
                ForecastError::DataError(format!(
                    "location '{}' missing from encoding table",
                    observation.location
                ))
            })? as u32;

        rows.push(FeatureRow {
            date: observation.date,
            location: observation.location.clone(),
            location_encoded,
            day: observation.date.day(),
            month: observation.date.month(),
            year: observation.date.year(),
            epidemic_phase: epidemic_phase(observation.date.year()),
            days_since_start: (observation.date - series_start).num_days(),
            total_cases: observation.total_cases,
            new_cases: observation.new_cases,
            total_deaths: observation.total_deaths,
            new_deaths: observation.new_deaths,
            new_cases_rolling7: rolling,
            trend_new_cases: trend,
        });
    }

    debug!(
        "engineered {} feature rows across {} locations (series start {}, max year {})",
        rows.len(),
        encodings.len(),
        series_start,
        max_year
    );

    Ok(FeatureTable {
        rows,
        series_start,
        max_year,
    })
}
