//! Seasonal log-linear predictor

use serde::{Deserialize, Serialize};

use crate::features::FeatureRow;
use crate::models::{ModelParams, SeasonalModels};
use crate::types::Season;

/// Autoregressive features for one day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct LagFeatures {
    pub lag1: f64,
    pub lag7: f64,
    pub ma7: f64,
}

/// The values the model reads for one day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelInputs {
    pub season: Season,
    pub lags: LagFeatures,
    pub hot_excess: f64,
    pub cold_excess: f64,
    pub rain_flag: bool,
    pub snow_flag: bool,
}

impl ModelInputs {
    pub fn new(row: &FeatureRow, lags: LagFeatures) -> Self {
        Self {
            season: row.season,
            lags,
            hot_excess: row.hot_excess,
            cold_excess: row.cold_excess,
            rain_flag: row.rain_flag,
            snow_flag: row.snow_flag,
        }
    }
}

fn term(beta: f64, value: f64) -> f64 {
    if value.is_finite() {
        beta * value
    } else {
        0.0
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Linear predictor in log space for the given model
pub fn linear_predictor(inputs: &ModelInputs, params: &ModelParams) -> f64 {
    let mut lp = params.intercept
        + term(params.beta_lag1, inputs.lags.lag1)
        + term(params.beta_lag7, inputs.lags.lag7)
        + term(params.beta_ma7, inputs.lags.ma7)
        + params.beta_rain * flag(inputs.rain_flag)
        + params.beta_snow * flag(inputs.snow_flag);

    match inputs.season {
        Season::Summer => lp += term(params.beta_hot.unwrap_or(0.0), inputs.hot_excess),
        Season::Winter => lp += term(params.beta_cold.unwrap_or(0.0), inputs.cold_excess),
    }
    lp
}

/// Predicted daily volume. Never negative.
pub fn predict(inputs: &ModelInputs, models: &SeasonalModels) -> f64 {
    let params = models.for_season(inputs.season);
    // f64::max discards NaN, so a degenerate predictor still floors at zero
    0.0_f64.max(linear_predictor(inputs, params).exp())
}

/// Holds the immutable seasonal models for a run
#[derive(Debug, Clone)]
pub struct SeasonalPredictor {
    models: SeasonalModels,
}

impl SeasonalPredictor {
    pub fn new(models: SeasonalModels) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &SeasonalModels {
        &self.models
    }

    pub fn predict(&self, row: &FeatureRow, lags: LagFeatures) -> f64 {
        predict(&ModelInputs::new(row, lags), &self.models)
    }
}
