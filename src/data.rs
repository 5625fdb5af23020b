//! Historical observation loading and validation

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::warn;

/// Columns every historical source must provide
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "date",
    "location",
    "total_cases",
    "new_cases",
    "total_deaths",
    "new_deaths",
];

/// One historical row per (location, date), as ingested upstream.
///
/// Numeric fields are optional because real feeds carry gaps; snapshot
/// selection decides which gaps disqualify a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalObservation {
    pub date: NaiveDate,
    pub location: String,
    pub total_cases: Option<f64>,
    pub new_cases: Option<f64>,
    pub total_deaths: Option<f64>,
    pub new_deaths: Option<f64>,
}

/// Immutable historical table, kept sorted by (location, date)
#[derive(Debug, Clone)]
pub struct HistoricalData {
    observations: Vec<HistoricalObservation>,
}

impl HistoricalData {
    /// Load historical observations from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Build historical data from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        Self::validate_columns(&df)?;

        if df.height() == 0 {
            return Err(ForecastError::DataError(
                "historical source is empty".to_string(),
            ));
        }

        let dates = date_column(&df, "date")?;
        let locations = string_column(&df, "location")?;
        let total_cases = opt_f64_column(&df, "total_cases")?;
        let new_cases = opt_f64_column(&df, "new_cases")?;
        let total_deaths = opt_f64_column(&df, "total_deaths")?;
        let new_deaths = opt_f64_column(&df, "new_deaths")?;

        let mut observations = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let (date, location) = match (dates[i], locations[i].as_deref()) {
                (Some(date), Some(location)) => (date, location.to_string()),
                _ => {
                    warn!("skipping historical row {} with null date or location", i);
                    continue;
                }
            };

            observations.push(HistoricalObservation {
                date,
                location,
                total_cases: total_cases[i],
                new_cases: new_cases[i],
                total_deaths: total_deaths[i],
                new_deaths: new_deaths[i],
            });
        }

        Self::from_observations(observations)
    }

    /// Build historical data directly from typed observations
    pub fn from_observations(mut observations: Vec<HistoricalObservation>) -> Result<Self> {
        if observations.is_empty() {
            return Err(ForecastError::DataError(
                "historical source is empty".to_string(),
            ));
        }

        observations.sort_by(|a, b| a.location.cmp(&b.location).then(a.date.cmp(&b.date)));

        Ok(Self { observations })
    }

    fn validate_columns(df: &DataFrame) -> Result<()> {
        let column_names = df.get_column_names();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !column_names.contains(required))
            .copied()
            .collect();

        if !missing.is_empty() {
            return Err(ForecastError::DataError(format!(
                "historical source is missing required columns: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }

    /// Observations sorted by (location, date)
    pub fn observations(&self) -> &[HistoricalObservation] {
        &self.observations
    }

    /// Distinct location names, in sorted order
    pub fn locations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .observations
            .iter()
            .map(|o| o.location.as_str())
            .collect();
        names.dedup();
        names
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Check whether the table holds no observations
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Decode a date column stored either as strings or as a native date dtype
fn date_column(df: &DataFrame, column_name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let col = df.column(column_name)?;

    match col.dtype() {
        DataType::Utf8 => col
            .utf8()?
            .into_iter()
            .enumerate()
            .map(|(i, value)| match value {
                Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(Some)
                    .map_err(|e| {
                        ForecastError::DataError(format!(
                            "cannot parse date '{}' at row {}: {}",
                            s, i, e
                        ))
                    }),
                None => Ok(None),
            })
            .collect(),
        DataType::Date => Ok(col
            .date()?
            .into_iter()
            .map(|opt_days| {
                opt_days.and_then(|days| {
                    NaiveDate::from_ymd_opt(1970, 1, 1)
                        .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(days as i64)))
                })
            })
            .collect()),
        other => Err(ForecastError::DataError(format!(
            "column '{}' has unsupported dtype {:?} for dates",
            column_name, other
        ))),
    }
}

fn string_column(df: &DataFrame, column_name: &str) -> Result<Vec<Option<String>>> {
    let col = df.column(column_name)?;

    match col.dtype() {
        DataType::Utf8 => Ok(col
            .utf8()?
            .into_iter()
            .map(|value| value.map(|s| s.to_string()))
            .collect()),
        other => Err(ForecastError::DataError(format!(
            "column '{}' has unsupported dtype {:?} for names",
            column_name, other
        ))),
    }
}

/// Extract a numeric column preserving per-row nulls
fn opt_f64_column(df: &DataFrame, column_name: &str) -> Result<Vec<Option<f64>>> {
    let col = df.column(column_name)?;

    match col.dtype() {
        DataType::Float64 => Ok(col.f64()?.into_iter().collect()),
        DataType::Float32 => Ok(col
            .f32()?
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        DataType::Int64 => Ok(col
            .i64()?
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        DataType::Int32 => Ok(col
            .i32()?
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        DataType::UInt64 => Ok(col
            .u64()?
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        DataType::UInt32 => Ok(col
            .u32()?
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        other => Err(ForecastError::DataError(format!(
            "column '{}' cannot be converted to f64 from dtype {:?}",
            column_name, other
        ))),
    }
}
