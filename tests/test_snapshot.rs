use epi_forecast::data::{HistoricalData, HistoricalObservation};
use epi_forecast::error::ForecastError;
use epi_forecast::features::build_features;
use epi_forecast::snapshot::select_snapshots;

fn obs(
    location: &str,
    date: &str,
    total_cases: Option<f64>,
    new_cases: Option<f64>,
    total_deaths: Option<f64>,
) -> HistoricalObservation {
    HistoricalObservation {
        date: date.parse().unwrap(),
        location: location.to_string(),
        total_cases,
        new_cases,
        total_deaths,
        new_deaths: Some(0.0),
    }
}

fn snapshots_for(
    observations: Vec<HistoricalObservation>,
) -> Result<Vec<epi_forecast::snapshot::LocationSnapshot>, ForecastError> {
    let data = HistoricalData::from_observations(observations).unwrap();
    let table = build_features(&data).unwrap();
    select_snapshots(&table)
}

#[test]
fn test_selects_latest_row_of_max_year() {
    let snapshots = snapshots_for(vec![
        obs("Testland", "2024-12-30", Some(995.0), Some(4.0), Some(10.0)),
        obs("Testland", "2024-12-31", Some(1000.0), Some(5.0), Some(10.0)),
    ])
    .unwrap();

    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].location, "Testland");
    assert_eq!(snapshots[0].total_cases, 1000.0);
    assert_eq!(snapshots[0].new_cases, 5.0);
    assert_eq!(snapshots[0].total_deaths, 10.0);
}

#[test]
fn test_location_without_max_year_data_is_excluded() {
    let snapshots = snapshots_for(vec![
        obs("Oldland", "2023-06-01", Some(400.0), Some(3.0), Some(2.0)),
        obs("Testland", "2024-12-31", Some(1000.0), Some(5.0), Some(10.0)),
    ])
    .unwrap();

    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].location, "Testland");
}

#[test]
fn test_missing_optional_fields_are_zeroed() {
    // a single row: rolling mean present, trend undefined, new_cases missing
    let snapshots = snapshots_for(vec![obs(
        "Testland",
        "2024-12-31",
        Some(1000.0),
        None,
        Some(10.0),
    )])
    .unwrap();

    assert_eq!(snapshots[0].new_cases, 0.0);
    assert_eq!(snapshots[0].new_cases_rolling7, 0.0);
    assert_eq!(snapshots[0].trend_new_cases, 0.0);
}

#[test]
fn test_snapshot_carries_rolling_state() {
    let observations = (1..=8)
        .map(|i| {
            obs(
                "Testland",
                &format!("2024-12-{:02}", i),
                Some(1000.0),
                Some(10.0 * i as f64),
                Some(10.0),
            )
        })
        .collect();
    let snapshots = snapshots_for(observations).unwrap();

    // mean of days 2..=8 (80+70+...+20)/7 and trend day8 - day1
    assert_eq!(snapshots[0].new_cases, 80.0);
    assert_eq!(snapshots[0].new_cases_rolling7, 50.0);
    assert_eq!(snapshots[0].trend_new_cases, 70.0);
}

#[test]
fn test_location_missing_totals_is_dropped() {
    let snapshots = snapshots_for(vec![
        obs("Gapland", "2024-12-31", None, Some(3.0), Some(2.0)),
        obs("Testland", "2024-12-31", Some(1000.0), Some(5.0), Some(10.0)),
    ])
    .unwrap();

    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].location, "Testland");
}

#[test]
fn test_no_eligible_locations() {
    // the only max-year row is missing its cumulative totals
    let result = snapshots_for(vec![obs(
        "Gapland",
        "2024-12-31",
        None,
        Some(3.0),
        None,
    )]);

    match result.unwrap_err() {
        ForecastError::NoEligibleLocations { year } => assert_eq!(year, 2024),
        other => panic!("expected NoEligibleLocations, got {:?}", other),
    }
}

#[test]
fn test_snapshots_sorted_by_location() {
    let snapshots = snapshots_for(vec![
        obs("Zulu", "2024-12-31", Some(10.0), Some(1.0), Some(1.0)),
        obs("Alpha", "2024-12-31", Some(20.0), Some(2.0), Some(2.0)),
    ])
    .unwrap();

    assert_eq!(snapshots[0].location, "Alpha");
    assert_eq!(snapshots[1].location, "Zulu");
    assert_eq!(snapshots[0].location_encoded, 0);
    assert_eq!(snapshots[1].location_encoded, 1);
}
