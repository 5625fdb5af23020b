use chrono::{TimeZone, Utc};
use epi_forecast::engine::DailyForecast;
use epi_forecast::error::ForecastError;
use epi_forecast::models::mock::ConstantPredictor;
use epi_forecast::models::ModelSet;
use epi_forecast::persist::{
    persist_forecasts, ForecastQuery, ForecastRecord, ForecastSink, Indicator, InMemoryStore,
    LocationDirectory, MAX_QUERY_LIMIT,
};

fn forecast(location: &str, date: &str, cases: f64) -> DailyForecast {
    DailyForecast {
        date: date.parse().unwrap(),
        location: location.to_string(),
        new_cases_pred: cases,
        new_deaths_pred: 1.0,
        countries_reporting_pred: 100.0,
    }
}

fn record(location_id: u64, date: &str, indicator: Indicator, value: f64) -> ForecastRecord {
    ForecastRecord {
        date_predicted: date.parse().unwrap(),
        generated_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
        location_id,
        indicator,
        horizon_days: 365,
        predicted_value: value,
        model_name: "cases_model".to_string(),
    }
}

fn models() -> ModelSet {
    ModelSet::new(
        Box::new(ConstantPredictor::new("cases_model", 10.0)),
        Box::new(ConstantPredictor::new("deaths_model", 1.0)),
        Box::new(ConstantPredictor::new("geo_model", 100.0)),
    )
}

#[test]
fn test_indicator_parsing() {
    assert_eq!("new_cases".parse::<Indicator>().unwrap(), Indicator::NewCases);
    assert_eq!(
        "new_deaths".parse::<Indicator>().unwrap(),
        Indicator::NewDeaths
    );
    assert_eq!(
        "countries_reporting".parse::<Indicator>().unwrap(),
        Indicator::CountriesReporting
    );

    let error = "cumulative_cases".parse::<Indicator>().unwrap_err();
    assert!(matches!(error, ForecastError::ValidationError(_)));
    assert!(error.to_string().contains("cumulative_cases"));
}

#[test]
fn test_indicator_display_round_trip() {
    for indicator in Indicator::ALL {
        let parsed: Indicator = indicator.to_string().parse().unwrap();
        assert_eq!(parsed, indicator);
    }
}

#[test]
fn test_location_resolution_is_idempotent() {
    let mut store = InMemoryStore::new();

    let first = store.resolve_or_create("Testland").unwrap();
    let again = store.resolve_or_create("Testland").unwrap();
    let other = store.resolve_or_create("Atlantis").unwrap();

    assert_eq!(first, again);
    assert_ne!(first, other);
    assert_eq!(store.locations().len(), 2);
}

#[test]
fn test_location_resolution_is_case_sensitive() {
    let mut store = InMemoryStore::new();

    let upper = store.resolve_or_create("Testland").unwrap();
    let lower = store.resolve_or_create("testland").unwrap();

    assert_ne!(upper, lower);
}

#[test]
fn test_persist_emits_three_records_per_day() {
    let mut store = InMemoryStore::new();
    let forecasts = vec![
        forecast("Testland", "2025-01-01", 10.0),
        forecast("Testland", "2025-01-02", 12.0),
    ];
    let generated_at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

    let mut directory = InMemoryStore::new();
    let stored = persist_forecasts(
        &mut directory,
        &mut store,
        &forecasts,
        &models(),
        365,
        generated_at,
    )
    .unwrap();

    assert_eq!(stored, 6);
    assert_eq!(store.len(), 6);
    assert_eq!(directory.locations().len(), 1);

    // every record carries the producing model's name and the timestamp
    let all = store
        .query(&ForecastQuery {
            limit: Some(10),
            ..ForecastQuery::default()
        })
        .unwrap();
    assert!(all.iter().all(|r| r.generated_at == generated_at));
    assert!(all.iter().all(|r| r.horizon_days == 365));

    let cases_records: Vec<_> = all
        .iter()
        .filter(|r| r.indicator == Indicator::NewCases)
        .collect();
    assert_eq!(cases_records.len(), 2);
    assert!(cases_records.iter().all(|r| r.model_name == "cases_model"));
}

#[test]
fn test_store_rejects_negative_values() {
    let mut store = InMemoryStore::new();
    let result = store.store(record(1, "2025-01-01", Indicator::NewDeaths, -1.0));

    assert!(matches!(
        result.unwrap_err(),
        ForecastError::ValidationError(_)
    ));
    assert!(store.is_empty());
}

#[test]
fn test_get_and_delete() {
    let mut store = InMemoryStore::new();
    let id = store
        .store(record(1, "2025-01-01", Indicator::NewCases, 10.0))
        .unwrap();

    assert!(store.get(id).is_some());
    assert!(store.delete(id));
    assert!(store.get(id).is_none());
    assert!(!store.delete(id));
}

#[test]
fn test_query_filters() {
    let mut store = InMemoryStore::new();
    for day in 1..=10 {
        let date = format!("2025-01-{:02}", day);
        for indicator in Indicator::ALL {
            store.store(record(1, &date, indicator, day as f64)).unwrap();
            store.store(record(2, &date, indicator, day as f64)).unwrap();
        }
    }

    let by_location = store
        .query(&ForecastQuery {
            location_id: Some(1),
            ..ForecastQuery::default()
        })
        .unwrap();
    assert_eq!(by_location.len(), 30);

    let by_indicator = store
        .query(&ForecastQuery {
            location_id: Some(1),
            indicator: Some(Indicator::NewDeaths),
            ..ForecastQuery::default()
        })
        .unwrap();
    assert_eq!(by_indicator.len(), 10);

    let by_range = store
        .query(&ForecastQuery {
            location_id: Some(1),
            indicator: Some(Indicator::NewCases),
            from: Some("2025-01-03".parse().unwrap()),
            to: Some("2025-01-05".parse().unwrap()),
            ..ForecastQuery::default()
        })
        .unwrap();
    assert_eq!(by_range.len(), 3);
    assert!(by_range
        .iter()
        .all(|r| r.date_predicted >= "2025-01-03".parse().unwrap()));
}

#[test]
fn test_query_pagination() {
    let mut store = InMemoryStore::new();
    for day in 1..=50 {
        let date = format!("2025-03-{:02}", ((day - 1) % 28) + 1);
        store
            .store(record(1, &date, Indicator::NewCases, day as f64))
            .unwrap();
    }

    let first_page = store
        .query(&ForecastQuery {
            limit: Some(20),
            ..ForecastQuery::default()
        })
        .unwrap();
    assert_eq!(first_page.len(), 20);

    let second_page = store
        .query(&ForecastQuery {
            skip: 20,
            limit: Some(20),
            ..ForecastQuery::default()
        })
        .unwrap();
    assert_eq!(second_page.len(), 20);
    assert_ne!(first_page[0].predicted_value, second_page[0].predicted_value);

    let tail = store
        .query(&ForecastQuery {
            skip: 40,
            limit: Some(20),
            ..ForecastQuery::default()
        })
        .unwrap();
    assert_eq!(tail.len(), 10);
}

#[test]
fn test_query_default_limit() {
    let mut store = InMemoryStore::new();
    for i in 0..150 {
        store
            .store(record(1, "2025-01-01", Indicator::NewCases, i as f64))
            .unwrap();
    }

    let page = store.query(&ForecastQuery::default()).unwrap();
    assert_eq!(page.len(), 100);
}

#[test]
fn test_query_limit_ceiling() {
    let store = InMemoryStore::new();

    let result = store.query(&ForecastQuery {
        limit: Some(MAX_QUERY_LIMIT + 1),
        ..ForecastQuery::default()
    });
    assert!(matches!(
        result.unwrap_err(),
        ForecastError::InvalidParameter(_)
    ));

    // the ceiling itself is accepted
    assert!(store
        .query(&ForecastQuery {
            limit: Some(MAX_QUERY_LIMIT),
            ..ForecastQuery::default()
        })
        .is_ok());
}
