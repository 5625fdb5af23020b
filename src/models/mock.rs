//! Mock predictors for tests and demos
//!
//! These stand in for trained models wherever a run with fixed or scripted
//! outputs is needed.

use crate::error::{ForecastError, Result};
use crate::models::{FeatureVector, Predictor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Predictor returning the same value for every invocation
#[derive(Debug)]
pub struct ConstantPredictor {
    name: String,
    value: f64,
}

impl ConstantPredictor {
    /// Create a predictor that always returns `value`
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

impl Predictor for ConstantPredictor {
    fn predict(&self, _features: &FeatureVector) -> Result<f64> {
        Ok(self.value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Predictor replaying a fixed sequence of outputs, erroring once exhausted
#[derive(Debug)]
pub struct ScriptedPredictor {
    name: String,
    outputs: Vec<f64>,
    next: AtomicUsize,
}

impl ScriptedPredictor {
    /// Create a predictor that replays `outputs` in order
    pub fn new(name: &str, outputs: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            outputs,
            next: AtomicUsize::new(0),
        }
    }
}

impl Predictor for ScriptedPredictor {
    fn predict(&self, _features: &FeatureVector) -> Result<f64> {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.outputs.get(index).copied().ok_or_else(|| {
            ForecastError::ModelError(format!(
                "scripted predictor '{}' exhausted after {} outputs",
                self.name,
                self.outputs.len()
            ))
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Predictor returning a fixed value while capturing every feature vector
/// it is invoked with
#[derive(Debug)]
pub struct RecordingPredictor {
    name: String,
    value: f64,
    calls: Mutex<Vec<FeatureVector>>,
}

impl RecordingPredictor {
    /// Create a recording predictor that always returns `value`
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The feature vectors received so far, in invocation order
    pub fn calls(&self) -> Vec<FeatureVector> {
        self.calls.lock().unwrap().clone()
    }
}

impl Predictor for RecordingPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        self.calls.lock().unwrap().push(features.clone());
        Ok(self.value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Predictor succeeding a fixed number of times, then failing every call
#[derive(Debug)]
pub struct FailingPredictor {
    name: String,
    value: f64,
    ok_calls: usize,
    seen: AtomicUsize,
}

impl FailingPredictor {
    /// Create a predictor that returns `value` for the first `ok_calls`
    /// invocations and errors afterwards
    pub fn new(name: &str, value: f64, ok_calls: usize) -> Self {
        Self {
            name: name.to_string(),
            value,
            ok_calls,
            seen: AtomicUsize::new(0),
        }
    }
}

impl Predictor for FailingPredictor {
    fn predict(&self, _features: &FeatureVector) -> Result<f64> {
        let call = self.seen.fetch_add(1, Ordering::SeqCst);
        if call < self.ok_calls {
            Ok(self.value)
        } else {
            Err(ForecastError::ModelError(format!(
                "predictor '{}' failed on call {}",
                self.name,
                call + 1
            )))
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
