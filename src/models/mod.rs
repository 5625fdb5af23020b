//! Prediction model interfaces
//!
//! The engine treats its three trained models as opaque predictors behind
//! the [`Predictor`] trait, so real exported regressors and test stubs are
//! interchangeable.

use crate::error::Result;
use std::fmt::Debug;

pub mod linear;
pub mod mock;

/// Named feature vector handed to every model invocation.
///
/// The cases model is invoked while `new_cases` still holds the prior day's
/// value; the deaths and geo models are invoked after it has been replaced
/// with the freshly predicted case count.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub total_cases: f64,
    pub location_encoded: f64,
    pub day: f64,
    pub month: f64,
    pub year: f64,
    pub total_deaths: f64,
    pub new_cases: f64,
    pub epidemic_phase: f64,
    pub days_since_start: f64,
    pub new_cases_rolling7: f64,
    pub trend_new_cases: f64,
}

impl FeatureVector {
    /// Every feature name a model may bind a coefficient to
    pub const FEATURE_NAMES: [&'static str; 11] = [
        "total_cases",
        "location_encoded",
        "day",
        "month",
        "year",
        "total_deaths",
        "new_cases",
        "epidemic_phase",
        "days_since_start",
        "new_cases_rolling7",
        "trend_new_cases",
    ];

    /// Look up a feature value by name
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "total_cases" => Some(self.total_cases),
            "location_encoded" => Some(self.location_encoded),
            "day" => Some(self.day),
            "month" => Some(self.month),
            "year" => Some(self.year),
            "total_deaths" => Some(self.total_deaths),
            "new_cases" => Some(self.new_cases),
            "epidemic_phase" => Some(self.epidemic_phase),
            "days_since_start" => Some(self.days_since_start),
            "new_cases_rolling7" => Some(self.new_cases_rolling7),
            "trend_new_cases" => Some(self.trend_new_cases),
            _ => None,
        }
    }
}

/// A pre-trained regression model.
///
/// Implementations are read-only and shareable across concurrent
/// per-location walks.
pub trait Predictor: Debug + Send + Sync {
    /// Predict a single value from the day's features
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Name of the model, stamped on persisted records
    fn name(&self) -> &str;
}

/// The three trained models a forecast run consumes.
///
/// They must be invoked in the fixed order cases, deaths, geo: the latter
/// two consume the cases prediction as a feature.
#[derive(Debug)]
pub struct ModelSet {
    pub cases: Box<dyn Predictor>,
    pub deaths: Box<dyn Predictor>,
    pub geo: Box<dyn Predictor>,
}

impl ModelSet {
    /// Bundle the cases, deaths, and geographic-spread models
    pub fn new(
        cases: Box<dyn Predictor>,
        deaths: Box<dyn Predictor>,
        geo: Box<dyn Predictor>,
    ) -> Self {
        Self { cases, deaths, geo }
    }
}
