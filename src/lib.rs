//! # Epi Forecast
//!
//! A Rust library for generating daily epidemiological forecasts from
//! historical per-location time series, using pre-trained regression models.
//!
//! ## Features
//!
//! - Historical table ingestion and validation (CSV)
//! - Feature engineering (calendar fields, rolling means, week-over-week trend)
//! - Snapshot selection: one forecast seed per eligible location
//! - Chained day-by-day prediction across a full calendar year, three
//!   indicators per day (new cases, new deaths, reporting countries)
//! - Plausibility rules keeping predictions epidemiologically sound
//! - Persistence seam with idempotent location resolution and a filtered
//!   query layer
//!
//! ## Quick Start
//!
//! ```rust
//! use epi_forecast::data::{HistoricalData, HistoricalObservation};
//! use epi_forecast::engine::{ForecastConfig, ForecastPipeline};
//! use epi_forecast::models::mock::ConstantPredictor;
//! use epi_forecast::models::ModelSet;
//!
//! # fn main() -> Result<(), epi_forecast::ForecastError> {
//! // Historical observations normally come from HistoricalData::from_csv
//! let observations = (0..10)
//!     .map(|i| HistoricalObservation {
//!         date: chrono::NaiveDate::from_ymd_opt(2024, 12, 22).unwrap()
//!             + chrono::Duration::days(i),
//!         location: "Testland".to_string(),
//!         total_cases: Some(1000.0),
//!         new_cases: Some(5.0),
//!         total_deaths: Some(10.0),
//!         new_deaths: Some(0.0),
//!     })
//!     .collect();
//! let historical = HistoricalData::from_observations(observations)?;
//!
//! // Real runs load exported regressors via LinearModel::from_json_file
//! let models = ModelSet::new(
//!     Box::new(ConstantPredictor::new("cases_model", 120.0)),
//!     Box::new(ConstantPredictor::new("deaths_model", 3.0)),
//!     Box::new(ConstantPredictor::new("geo_model", 150.0)),
//! );
//!
//! let pipeline = ForecastPipeline::new(historical, models, ForecastConfig::default());
//! let forecasts = pipeline.generate_predictions(2025)?;
//! assert_eq!(forecasts.len(), 365);
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod engine;
pub mod error;
pub mod export;
pub mod features;
pub mod models;
pub mod persist;
pub mod rules;
pub mod snapshot;

// Re-export commonly used types
pub use crate::data::{HistoricalData, HistoricalObservation};
pub use crate::engine::{DailyForecast, ForecastConfig, ForecastEngine, ForecastPipeline};
pub use crate::error::ForecastError;
pub use crate::models::{FeatureVector, ModelSet, Predictor};
pub use crate::persist::{
    ForecastQuery, ForecastRecord, ForecastSink, Indicator, InMemoryStore, LocationDirectory,
};
pub use crate::rules::RulePolicy;
pub use crate::snapshot::LocationSnapshot;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
