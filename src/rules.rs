//! Plausibility rules applied to every generated forecast tuple

use crate::engine::DailyForecast;
use serde::{Deserialize, Serialize};

/// Business rules keeping predictions epidemiologically plausible.
///
/// Applying the policy is pure and idempotent; every tuple is corrected
/// independently, so order across tuples does not matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePolicy {
    /// Hard ceiling on predicted daily deaths
    pub max_daily_deaths: f64,
    /// Below this many predicted cases, predicted deaths are zeroed
    pub min_cases_for_deaths: f64,
    /// Maximum allowed deaths-to-cases ratio
    pub max_mortality_rate: f64,
    /// Apply the minimum-cases gate
    pub enforce_min_cases: bool,
    /// Apply the mortality-rate cap
    pub enforce_mortality_cap: bool,
}

impl Default for RulePolicy {
    fn default() -> Self {
        Self {
            max_daily_deaths: 10_000.0,
            min_cases_for_deaths: 1.0,
            max_mortality_rate: 0.1,
            enforce_min_cases: true,
            enforce_mortality_cap: true,
        }
    }
}

impl RulePolicy {
    /// Apply every rule to one forecast tuple, in order: non-negativity,
    /// death ceiling, minimum-cases gate, mortality-rate cap
    pub fn apply(&self, forecast: &mut DailyForecast) {
        forecast.new_cases_pred = forecast.new_cases_pred.max(0.0);
        forecast.new_deaths_pred = forecast.new_deaths_pred.max(0.0);
        forecast.countries_reporting_pred = forecast.countries_reporting_pred.max(0.0);

        forecast.new_deaths_pred = forecast.new_deaths_pred.min(self.max_daily_deaths);

        if self.enforce_min_cases && forecast.new_cases_pred < self.min_cases_for_deaths {
            forecast.new_deaths_pred = 0.0;
        }

        // a zero-case day has no defined mortality rate; leave deaths to
        // the earlier rules
        if self.enforce_mortality_cap && forecast.new_cases_pred > 0.0 {
            let mortality = forecast.new_deaths_pred / forecast.new_cases_pred;
            if mortality > self.max_mortality_rate {
                forecast.new_deaths_pred = forecast.new_cases_pred * self.max_mortality_rate;
            }
        }
    }

    /// Apply the rules to every tuple in a forecast set
    pub fn apply_all(&self, forecasts: &mut [DailyForecast]) {
        for forecast in forecasts.iter_mut() {
            self.apply(forecast);
        }
    }
}
