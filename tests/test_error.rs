use epi_forecast::error::ForecastError;
use std::io;

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidParameter("limit exceeds maximum page size".to_string());
    assert!(error.to_string().contains("limit exceeds maximum page size"));

    let error = ForecastError::DataError("historical source is empty".to_string());
    assert!(error.to_string().contains("Data error"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let error = ForecastError::from(io_error);

    match &error {
        ForecastError::IoError(_) => {}
        other => panic!("expected IoError variant, got {:?}", other),
    }
    assert!(error.to_string().contains("IO error"));
    assert!(error.to_string().contains("file not found"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let error = ForecastError::from(json_error);

    assert!(matches!(error, ForecastError::JsonError(_)));
}

#[test]
fn test_no_eligible_locations_message() {
    let error = ForecastError::NoEligibleLocations { year: 2024 };
    assert!(error.to_string().contains("2024"));
    assert!(error.to_string().contains("no eligible locations"));
}

#[test]
fn test_generation_failed_reports_progress() {
    let source = ForecastError::InferenceFailed {
        model: "cases_model".to_string(),
        date: "2025-03-14".parse().unwrap(),
        source: Box::new(ForecastError::ModelError("numeric overflow".to_string())),
    };
    let error = ForecastError::GenerationFailed {
        year: 2025,
        completed: vec!["Aland".to_string(), "Bland".to_string()],
        location: "Cland".to_string(),
        source: Box::new(source),
    };

    let message = error.to_string();
    assert!(message.contains("2025"));
    assert!(message.contains("2 completed locations"));
    assert!(message.contains("'Cland'"));
    assert!(message.contains("cases_model"));
    assert!(message.contains("2025-03-14"));
}
