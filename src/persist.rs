//! Persistence seam and query layer for generated forecasts
//!
//! The core writes through two narrow traits: a location directory that
//! lazily assigns stable identifiers, and a sink that stores one record per
//! (location, day, indicator). [`InMemoryStore`] implements both and backs
//! tests, demos, and the filtered query surface.

use crate::engine::DailyForecast;
use crate::error::{ForecastError, Result};
use crate::models::ModelSet;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Stable identifier for a location
pub type LocationId = u64;

/// Identifier assigned to a stored forecast record
pub type RecordId = u64;

/// Page size used when a query does not specify one
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Largest page size the query layer accepts
pub const MAX_QUERY_LIMIT: usize = 1000;

/// The three forecast quantities; unknown names are rejected at the
/// boundary via [`FromStr`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    NewCases,
    NewDeaths,
    CountriesReporting,
}

impl Indicator {
    /// All indicators, in persistence order
    pub const ALL: [Indicator; 3] = [
        Indicator::NewCases,
        Indicator::NewDeaths,
        Indicator::CountriesReporting,
    ];

    /// The indicator's wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::NewCases => "new_cases",
            Indicator::NewDeaths => "new_deaths",
            Indicator::CountriesReporting => "countries_reporting",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Indicator {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "new_cases" => Ok(Indicator::NewCases),
            "new_deaths" => Ok(Indicator::NewDeaths),
            "countries_reporting" => Ok(Indicator::CountriesReporting),
            other => Err(ForecastError::ValidationError(format!(
                "unknown indicator '{}'",
                other
            ))),
        }
    }
}

/// A known location in the dimension table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
}

/// One persisted prediction fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub date_predicted: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub location_id: LocationId,
    pub indicator: Indicator,
    pub horizon_days: u32,
    pub predicted_value: f64,
    pub model_name: String,
}

/// Maps location names to stable identifiers, creating them lazily.
///
/// Resolution is idempotent and case-sensitive; an identifier is assigned
/// once and never reused.
pub trait LocationDirectory {
    fn resolve_or_create(&mut self, name: &str) -> Result<LocationId>;
}

/// Stores one forecast record per (location, day, indicator)
pub trait ForecastSink {
    fn store(&mut self, record: ForecastRecord) -> Result<RecordId>;
}

/// Persist a generated forecast set: three records per forecast day per
/// location, each stamped with the producing model's name.
///
/// The adapter is called once per record with no batching assumed, so a
/// full-year run makes `days_in_year x 3 x num_locations` store calls.
pub fn persist_forecasts<D, S>(
    directory: &mut D,
    sink: &mut S,
    forecasts: &[DailyForecast],
    models: &ModelSet,
    horizon_days: u32,
    generated_at: DateTime<Utc>,
) -> Result<usize>
where
    D: LocationDirectory + ?Sized,
    S: ForecastSink + ?Sized,
{
    let mut stored = 0;
    for forecast in forecasts {
        let location_id = directory.resolve_or_create(&forecast.location)?;

        let values = [
            (Indicator::NewCases, forecast.new_cases_pred, models.cases.name()),
            (Indicator::NewDeaths, forecast.new_deaths_pred, models.deaths.name()),
            (
                Indicator::CountriesReporting,
                forecast.countries_reporting_pred,
                models.geo.name(),
            ),
        ];

        for (indicator, value, model_name) in values {
            sink.store(ForecastRecord {
                date_predicted: forecast.date,
                generated_at,
                location_id,
                indicator,
                horizon_days,
                predicted_value: value,
                model_name: model_name.to_string(),
            })?;
            stored += 1;
        }
    }

    info!("persisted {} forecast records", stored);

    Ok(stored)
}

/// Filters for stored-forecast retrieval
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub location_id: Option<LocationId>,
    pub indicator: Option<Indicator>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub skip: usize,
    /// Page size; defaults to [`DEFAULT_QUERY_LIMIT`], capped at
    /// [`MAX_QUERY_LIMIT`]
    pub limit: Option<usize>,
}

/// In-memory store implementing both persistence traits
#[derive(Debug, Default)]
pub struct InMemoryStore {
    locations: Vec<Location>,
    records: BTreeMap<RecordId, ForecastRecord>,
    next_location_id: LocationId,
    next_record_id: RecordId,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Known locations, in creation order
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Fetch one record by identifier
    pub fn get(&self, id: RecordId) -> Option<&ForecastRecord> {
        self.records.get(&id)
    }

    /// Delete one record by identifier. This is the only deletion path;
    /// stored forecasts are otherwise immutable facts.
    pub fn delete(&mut self, id: RecordId) -> bool {
        self.records.remove(&id).is_some()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Filtered retrieval with skip/limit pagination, in record-id order
    pub fn query(&self, query: &ForecastQuery) -> Result<Vec<&ForecastRecord>> {
        let limit = query.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        if limit > MAX_QUERY_LIMIT {
            return Err(ForecastError::InvalidParameter(format!(
                "limit {} exceeds maximum page size {}",
                limit, MAX_QUERY_LIMIT
            )));
        }

        Ok(self
            .records
            .values()
            .filter(|r| query.location_id.map_or(true, |id| r.location_id == id))
            .filter(|r| query.indicator.map_or(true, |i| r.indicator == i))
            .filter(|r| query.from.map_or(true, |d| r.date_predicted >= d))
            .filter(|r| query.to.map_or(true, |d| r.date_predicted <= d))
            .skip(query.skip)
            .take(limit)
            .collect())
    }
}

impl LocationDirectory for InMemoryStore {
    fn resolve_or_create(&mut self, name: &str) -> Result<LocationId> {
        if let Some(location) = self.locations.iter().find(|l| l.name == name) {
            return Ok(location.id);
        }

        self.next_location_id += 1;
        let id = self.next_location_id;
        self.locations.push(Location {
            id,
            name: name.to_string(),
        });

        Ok(id)
    }
}

impl ForecastSink for InMemoryStore {
    fn store(&mut self, record: ForecastRecord) -> Result<RecordId> {
        if record.predicted_value < 0.0 {
            return Err(ForecastError::ValidationError(format!(
                "predicted value for {} on {} is negative ({})",
                record.indicator, record.date_predicted, record.predicted_value
            )));
        }

        self.next_record_id += 1;
        let id = self.next_record_id;
        self.records.insert(id, record);

        Ok(id)
    }
}
