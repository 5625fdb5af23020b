//! End-to-end forecast generation over a small in-process dataset.
//!
//! Run with: cargo run --example generate_forecast

use chrono::{Duration, NaiveDate, Utc};
use epi_forecast::data::{HistoricalData, HistoricalObservation};
use epi_forecast::engine::{ForecastConfig, ForecastPipeline};
use epi_forecast::error::ForecastError;
use epi_forecast::export;
use epi_forecast::models::linear::LinearModel;
use epi_forecast::models::ModelSet;
use epi_forecast::persist::{persist_forecasts, ForecastQuery, Indicator, InMemoryStore};

fn main() -> Result<(), ForecastError> {
    tracing_subscriber::fmt().init();

    // Two reporting locations with a final observed week of 2024
    let start = NaiveDate::from_ymd_opt(2024, 12, 22).ok_or_else(|| {
        ForecastError::InvalidParameter("invalid demo start date".to_string())
    })?;
    let mut observations = Vec::new();
    for i in 0..10 {
        let date = start + Duration::days(i);
        observations.push(HistoricalObservation {
            date,
            location: "Testland".to_string(),
            total_cases: Some(1000.0 + 5.0 * i as f64),
            new_cases: Some(5.0),
            total_deaths: Some(10.0),
            new_deaths: Some(0.0),
        });
        observations.push(HistoricalObservation {
            date,
            location: "Atlantis".to_string(),
            total_cases: Some(40_000.0 + 120.0 * i as f64),
            new_cases: Some(120.0),
            total_deaths: Some(800.0),
            new_deaths: Some(2.0),
        });
    }
    let historical = HistoricalData::from_observations(observations)?;

    // Exported regressor coefficients, as the training pipeline writes them
    let cases = LinearModel::from_json(
        r#"{"name": "cases_rf", "intercept": 2.0,
            "coefficients": {"new_cases_rolling7": 0.9, "trend_new_cases": 0.2}}"#,
    )?;
    let deaths = LinearModel::from_json(
        r#"{"name": "deaths_xgb", "intercept": 0.5,
            "coefficients": {"new_cases": 0.01}}"#,
    )?;
    let geo = LinearModel::from_json(
        r#"{"name": "spread_rf", "intercept": 120.0,
            "coefficients": {"month": 2.0}}"#,
    )?;
    let models = ModelSet::new(Box::new(cases), Box::new(deaths), Box::new(geo));

    // Generate one full year of daily forecasts
    let pipeline = ForecastPipeline::new(historical, models, ForecastConfig::default());
    let forecasts = pipeline.generate_predictions(2025)?;
    println!("Generated {} forecast tuples", forecasts.len());

    println!("\nFirst week for Testland:");
    for forecast in forecasts.iter().filter(|f| f.location == "Testland").take(7) {
        println!(
            "  {}  cases {:8.1}  deaths {:6.2}  reporting {:5.1}",
            forecast.date,
            forecast.new_cases_pred,
            forecast.new_deaths_pred,
            forecast.countries_reporting_pred
        );
    }

    // Persist every (location, day, indicator) record
    let mut store = InMemoryStore::new();
    let mut directory = InMemoryStore::new();
    let stored = persist_forecasts(
        &mut directory,
        &mut store,
        &forecasts,
        pipeline.engine().models(),
        365,
        Utc::now(),
    )?;
    println!("\nPersisted {} records", stored);

    // Query January's case curve back out for the first location
    let location = &directory.locations()[0];
    let january = store.query(&ForecastQuery {
        location_id: Some(location.id),
        indicator: Some(Indicator::NewCases),
        from: NaiveDate::from_ymd_opt(2025, 1, 1),
        to: NaiveDate::from_ymd_opt(2025, 1, 31),
        limit: Some(1000),
        ..ForecastQuery::default()
    })?;
    println!(
        "January case forecasts for {}: {} records, first value {:.1}",
        location.name,
        january.len(),
        january[0].predicted_value
    );

    // Export the full year as CSV
    let out_dir = std::env::temp_dir().join("epi_forecast_demo");
    let path = export::export_year(&out_dir, 2025, &forecasts)?;
    println!("Exported forecasts to {}", path.display());

    Ok(())
}
