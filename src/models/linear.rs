//! Linear models over named features, loaded from exported coefficients

use crate::error::{ForecastError, Result};
use crate::models::{FeatureVector, Predictor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Linear regression model: intercept plus per-feature coefficients.
///
/// The training pipeline exports each fitted regressor as a JSON document
/// of `{name, intercept, coefficients}`; this is its in-process form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    name: String,
    intercept: f64,
    coefficients: BTreeMap<String, f64>,
}

impl LinearModel {
    /// Create a linear model, validating every coefficient's feature name
    pub fn new(name: &str, intercept: f64, coefficients: BTreeMap<String, f64>) -> Result<Self> {
        for feature in coefficients.keys() {
            if !FeatureVector::FEATURE_NAMES.contains(&feature.as_str()) {
                return Err(ForecastError::InvalidParameter(format!(
                    "model '{}' references unknown feature '{}'",
                    name, feature
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            intercept,
            coefficients,
        })
    }

    /// Load an exported model from a JSON coefficient file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let model: LinearModel = serde_json::from_reader(BufReader::new(file))?;

        // revalidate: the file may reference features we do not produce
        Self::new(&model.name, model.intercept, model.coefficients)
    }

    /// Parse an exported model from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let model: LinearModel = serde_json::from_str(json)?;
        Self::new(&model.name, model.intercept, model.coefficients)
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let mut value = self.intercept;
        for (feature, coefficient) in &self.coefficients {
            let x = features.get(feature).ok_or_else(|| {
                ForecastError::ModelError(format!(
                    "model '{}' bound to unknown feature '{}'",
                    self.name, feature
                ))
            })?;
            value += coefficient * x;
        }

        Ok(value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
