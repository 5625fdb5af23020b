//! Snapshot selection: the seed state each location's forecast walk starts from

use crate::error::{ForecastError, Result};
use crate::features::{FeatureRow, FeatureTable};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// The most recent observed state for one location, cleaned for forecasting
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSnapshot {
    pub location: String,
    pub location_encoded: u32,
    pub total_cases: f64,
    pub total_deaths: f64,
    pub new_cases: f64,
    pub new_cases_rolling7: f64,
    pub trend_new_cases: f64,
}

/// Pick, for each location, the latest row within the dataset-wide maximum
/// year, then clean it into a forecast seed.
///
/// A location with no data in that year contributes no snapshot. Missing
/// new-case, rolling-mean, and trend values are zeroed; a row still missing
/// total_cases or total_deaths disqualifies its location.
pub fn select_snapshots(table: &FeatureTable) -> Result<Vec<LocationSnapshot>> {
    let max_year = table.max_year();

    let mut latest: BTreeMap<&str, &FeatureRow> = BTreeMap::new();
    for row in table.rows() {
        if row.year != max_year {
            continue;
        }
        // rows are sorted by (location, date), so later rows win
        latest.insert(row.location.as_str(), row);
    }

    let mut snapshots = Vec::with_capacity(latest.len());
    for (location, row) in latest {
        let (total_cases, total_deaths) = match (row.total_cases, row.total_deaths) {
            (Some(cases), Some(deaths)) => (cases, deaths),
            _ => {
                debug!(
                    "dropping location '{}': missing cumulative totals on {}",
                    location, row.date
                );
                continue;
            }
        };

        snapshots.push(LocationSnapshot {
            location: location.to_string(),
            location_encoded: row.location_encoded,
            total_cases,
            total_deaths,
            new_cases: row.new_cases.unwrap_or(0.0),
            new_cases_rolling7: row.new_cases_rolling7.unwrap_or(0.0),
            trend_new_cases: row.trend_new_cases.unwrap_or(0.0),
        });
    }

    if snapshots.is_empty() {
        return Err(ForecastError::NoEligibleLocations { year: max_year });
    }

    info!(
        "selected {} forecast seeds from year {}",
        snapshots.len(),
        max_year
    );

    Ok(snapshots)
}
