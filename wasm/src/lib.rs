//! WebAssembly module for the call-volume forecast
//!
//! Provides client-side computation for:
//! - Full forecasts over a JMA payload fetched by the page
//! - Single-day predictions for what-if inputs
//! - Season classification

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use shared::pipeline::{ForecastPipeline, ForecastRequest};
use shared::predictor::{predict, LagFeatures, ModelInputs};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("call forecast module loaded"));
}

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

fn parse_model_config(config_json: &str) -> Result<ModelConfig, JsValue> {
    let config: ModelConfig = if config_json.trim().is_empty() {
        ModelConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(|e| js_error("Invalid model config JSON", e))?
    };
    validate_model_config(&config).map_err(|e| js_error("Invalid model config", e))?;
    Ok(config)
}

fn parse_date(value: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| js_error("Invalid date", e))
}

/// Browser clock; `Utc::now` is not available on wasm32 without extra features
fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

/// Run a forecast over an already fetched JMA payload.
///
/// `config_json` may be empty to use the fitted defaults. `aggregation` is
/// `"weekly"` or `"range"`. Returns the forecast output as JSON.
#[wasm_bindgen]
pub fn forecast_from_payload(
    config_json: &str,
    payload_json: &str,
    start_date: &str,
    horizon: i32,
    aggregation: &str,
) -> Result<String, JsValue> {
    let config = parse_model_config(config_json)?;
    let payload: serde_json::Value =
        serde_json::from_str(payload_json).map_err(|e| js_error("Invalid forecast JSON", e))?;
    let aggregation: AggregationMode = aggregation
        .parse()
        .map_err(|e| js_error("Invalid aggregation", e))?;

    let request = ForecastRequest {
        area_code: String::new(),
        start_date: parse_date(start_date)?,
        horizon: clamp_horizon(i64::from(horizon), MAX_HORIZON_DAYS),
        aggregation,
    };

    let output = ForecastPipeline::new(config)
        .run(&request, &payload, None, now())
        .map_err(|e| js_error("Forecast failed", e))?;

    serde_json::to_string(&output).map_err(|e| js_error("Serialization failed", e))
}

/// Inputs for a single-day prediction
#[derive(Debug, Deserialize)]
struct DayInputs {
    date: NaiveDate,
    lag1: f64,
    lag7: f64,
    ma7: f64,
    #[serde(default)]
    tmin: Option<f64>,
    #[serde(default)]
    tmax: Option<f64>,
    #[serde(default)]
    rain: bool,
    #[serde(default)]
    snow: bool,
}

/// Predict one day's volume from explicit lags and weather
#[wasm_bindgen]
pub fn predict_day(config_json: &str, inputs_json: &str) -> Result<f64, JsValue> {
    let config = parse_model_config(config_json)?;
    let day: DayInputs =
        serde_json::from_str(inputs_json).map_err(|e| js_error("Invalid inputs JSON", e))?;

    let season = config.season_of(day.date);
    let (hot, cold) = match season {
        Season::Summer => (
            shared::features::hot_excess(day.tmax, config.hot_threshold),
            0.0,
        ),
        Season::Winter => (
            0.0,
            shared::features::cold_excess(day.tmin, config.cold_threshold),
        ),
    };
    let inputs = ModelInputs {
        season,
        lags: LagFeatures {
            lag1: day.lag1,
            lag7: day.lag7,
            ma7: day.ma7,
        },
        hot_excess: hot,
        cold_excess: cold,
        rain_flag: day.rain,
        snow_flag: day.snow,
    };

    Ok(predict(&inputs, &config.models()))
}

/// Whether `month` (1-12) falls in the default summer season
#[wasm_bindgen]
pub fn is_summer_month(month: u32) -> bool {
    SeasonRule::default().is_summer_month(month)
}
