//! Error types for the epi_forecast crate

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the epi_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error raised inside a prediction model
    #[error("Model error: {0}")]
    ModelError(String),

    /// Snapshot selection found no location with data in the latest year
    #[error("no eligible locations: no location has data for year {year}")]
    NoEligibleLocations { year: i32 },

    /// A single model invocation failed during the daily walk
    #[error("model '{model}' failed on {date}: {source}")]
    InferenceFailed {
        model: String,
        date: NaiveDate,
        #[source]
        source: Box<ForecastError>,
    },

    /// A generation run aborted; carries which locations finished and which
    /// one was in progress
    #[error(
        "forecast generation for {year} failed at location '{location}' after {} completed locations: {source}",
        .completed.len()
    )]
    GenerationFailed {
        year: i32,
        completed: Vec<String>,
        location: String,
        #[source]
        source: Box<ForecastError>,
    },

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON encoding or decoding
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from CSV export
    #[error("CSV error: {0}")]
    CsvError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}
