//! Forecast engine: chained day-by-day prediction per location
//!
//! Each location walks every calendar day of the target year in order,
//! feeding each day's predictions back into the next day's features. The
//! walk is strictly sequential within a location and independent across
//! locations.

use crate::data::HistoricalData;
use crate::error::{ForecastError, Result};
use crate::features::{build_features, ROLLING_WINDOW};
use crate::models::{FeatureVector, ModelSet, Predictor};
use crate::rules::RulePolicy;
use crate::snapshot::{select_snapshots, LocationSnapshot};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Tunable constants for a forecast run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Ceiling applied to the rolling mean after each daily update
    pub rolling_mean_cap: f64,
    /// Optional ceiling on a single day's predicted cases
    pub daily_cases_cap: Option<f64>,
    /// Ceiling on the geographic-spread prediction: the number of known
    /// reporting countries
    pub max_reporting_countries: f64,
    /// Plausibility rules applied after generation
    pub rules: RulePolicy,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            rolling_mean_cap: 500_000.0,
            daily_cases_cap: None,
            max_reporting_countries: 195.0,
            rules: RulePolicy::default(),
        }
    }
}

/// One emitted forecast day for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub location: String,
    pub new_cases_pred: f64,
    pub new_deaths_pred: f64,
    pub countries_reporting_pred: f64,
}

/// Rolling state carried across one location's year-long walk.
///
/// `total_cases` and `total_deaths` stay fixed at the snapshot values for
/// the whole year; predictions are never accumulated into them. Only the
/// rolling fields evolve day to day.
#[derive(Debug, Clone)]
struct LocationState {
    total_cases: f64,
    total_deaths: f64,
    new_cases: f64,
    new_cases_rolling7: f64,
    trend_new_cases: f64,
    /// Last 7 predicted case counts, oldest first, seeded with the
    /// snapshot's observed value
    history: [f64; ROLLING_WINDOW],
}

impl LocationState {
    fn from_snapshot(snapshot: &LocationSnapshot) -> Self {
        Self {
            total_cases: snapshot.total_cases,
            total_deaths: snapshot.total_deaths,
            new_cases: snapshot.new_cases,
            new_cases_rolling7: snapshot.new_cases_rolling7,
            trend_new_cases: snapshot.trend_new_cases,
            history: [snapshot.new_cases; ROLLING_WINDOW],
        }
    }

    /// Fold today's prediction into the state the next day will see
    fn advance(&mut self, predicted_cases: f64, rolling_cap: f64) {
        self.trend_new_cases = predicted_cases - self.history[0];
        self.history.rotate_left(1);
        self.history[ROLLING_WINDOW - 1] = predicted_cases;
        self.new_cases = predicted_cases;

        let blended = (self.new_cases_rolling7 * (ROLLING_WINDOW - 1) as f64 + predicted_cases)
            / ROLLING_WINDOW as f64;
        self.new_cases_rolling7 = blended.min(rolling_cap);
    }
}

/// Generates chained daily predictions for each eligible location
#[derive(Debug)]
pub struct ForecastEngine {
    models: ModelSet,
    config: ForecastConfig,
}

impl ForecastEngine {
    /// Create an engine from a model set and run configuration
    pub fn new(models: ModelSet, config: ForecastConfig) -> Self {
        Self { models, config }
    }

    /// The run configuration
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// The model set
    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    /// Number of calendar days in a year
    pub fn days_in_year(year: i32) -> u32 {
        if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
            366
        } else {
            365
        }
    }

    /// Walk every calendar day of `year` for every snapshot, emitting one
    /// forecast tuple per (location, day).
    ///
    /// A model failure aborts the failing location's walk and the whole
    /// run; the returned error reports which locations completed and which
    /// was in progress. No tuples from the failing location escape.
    pub fn generate(
        &self,
        year: i32,
        snapshots: &[LocationSnapshot],
        series_start: NaiveDate,
    ) -> Result<Vec<DailyForecast>> {
        if snapshots.is_empty() {
            return Err(ForecastError::NoEligibleLocations { year });
        }
        NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| {
            ForecastError::InvalidParameter(format!("invalid forecast year {}", year))
        })?;

        let days = Self::days_in_year(year);
        let mut forecasts = Vec::with_capacity(days as usize * snapshots.len());
        let mut completed: Vec<String> = Vec::with_capacity(snapshots.len());

        for snapshot in snapshots {
            match self.walk_location(year, days, snapshot, series_start) {
                Ok(rows) => {
                    debug!("forecast complete for '{}' ({} days)", snapshot.location, days);
                    forecasts.extend(rows);
                    completed.push(snapshot.location.clone());
                }
                Err(source) => {
                    return Err(ForecastError::GenerationFailed {
                        year,
                        completed,
                        location: snapshot.location.clone(),
                        source: Box::new(source),
                    });
                }
            }
        }

        info!(
            "generated {} forecast tuples for {} ({} locations)",
            forecasts.len(),
            year,
            completed.len()
        );

        Ok(forecasts)
    }

    /// One location's sequential walk across the year
    fn walk_location(
        &self,
        year: i32,
        days: u32,
        snapshot: &LocationSnapshot,
        series_start: NaiveDate,
    ) -> Result<Vec<DailyForecast>> {
        let mut state = LocationState::from_snapshot(snapshot);
        let mut rows = Vec::with_capacity(days as usize);

        for ordinal in 1..=days {
            let date = NaiveDate::from_yo_opt(year, ordinal).ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "invalid calendar day {} of {}",
                    ordinal, year
                ))
            })?;

            let mut features = FeatureVector {
                total_cases: state.total_cases,
                location_encoded: snapshot.location_encoded as f64,
                day: date.day() as f64,
                month: date.month() as f64,
                year: year as f64,
                total_deaths: state.total_deaths,
                new_cases: state.new_cases,
                // the forecast horizon is always past the phase threshold
                epidemic_phase: 1.0,
                days_since_start: (date - series_start).num_days() as f64,
                new_cases_rolling7: state.new_cases_rolling7,
                trend_new_cases: state.trend_new_cases,
            };

            let mut cases = self.invoke(&*self.models.cases, &features, date)?.max(0.0);
            if let Some(cap) = self.config.daily_cases_cap {
                cases = cases.min(cap);
            }
            features.new_cases = cases;

            let deaths = self.invoke(&*self.models.deaths, &features, date)?.max(0.0);

            let reporting = self
                .invoke(&*self.models.geo, &features, date)?
                .max(0.0)
                .min(self.config.max_reporting_countries);

            rows.push(DailyForecast {
                date,
                location: snapshot.location.clone(),
                new_cases_pred: cases,
                new_deaths_pred: deaths,
                countries_reporting_pred: reporting,
            });

            state.advance(cases, self.config.rolling_mean_cap);
        }

        Ok(rows)
    }

    fn invoke(&self, model: &dyn Predictor, features: &FeatureVector, date: NaiveDate) -> Result<f64> {
        model.predict(features).map_err(|source| ForecastError::InferenceFailed {
            model: model.name().to_string(),
            date,
            source: Box::new(source),
        })
    }
}

/// End-to-end generation pipeline: features, snapshots, engine, rules.
///
/// Construction is explicit: the historical dataset, the trained models,
/// and the configuration are supplied once and owned by the pipeline, so
/// several pipelines with different datasets can coexist in one process.
#[derive(Debug)]
pub struct ForecastPipeline {
    historical: HistoricalData,
    engine: ForecastEngine,
}

impl ForecastPipeline {
    /// Create a pipeline over a historical dataset
    pub fn new(historical: HistoricalData, models: ModelSet, config: ForecastConfig) -> Self {
        Self {
            historical,
            engine: ForecastEngine::new(models, config),
        }
    }

    /// The underlying engine
    pub fn engine(&self) -> &ForecastEngine {
        &self.engine
    }

    /// Generate a full year of daily forecasts for every eligible location.
    ///
    /// Runs feature engineering, snapshot selection, the per-location daily
    /// walk, and the plausibility rules, in that order.
    pub fn generate_predictions(&self, year: i32) -> Result<Vec<DailyForecast>> {
        let table = build_features(&self.historical)?;
        info!(
            "engineered {} feature rows (series start {}, latest year {})",
            table.len(),
            table.series_start(),
            table.max_year()
        );

        let snapshots = select_snapshots(&table)?;

        let mut forecasts = self
            .engine
            .generate(year, &snapshots, table.series_start())?;

        self.engine.config().rules.apply_all(&mut forecasts);

        Ok(forecasts)
    }
}
