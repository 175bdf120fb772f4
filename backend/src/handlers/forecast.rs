//! HTTP handlers for forecast endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::pipeline::ForecastRequest;
use shared::{clamp_horizon, validate_area_code, AggregationMode, ForecastOutput};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Query parameters for a forecast run
#[derive(Debug, Deserialize, Validate)]
pub struct ForecastQuery {
    #[validate(length(min = 1, max = 16))]
    pub area_code: Option<String>,
    pub start_date: Option<NaiveDate>,
    /// Clamped to `1..=forecast.max_horizon`
    pub horizon: Option<i64>,
    pub aggregation: Option<AggregationMode>,
    pub use_history: Option<bool>,
}

/// Get the daily and aggregated forecast
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<ForecastOutput>> {
    query.validate()?;

    let defaults = &state.config.forecast;
    let area_code = query
        .area_code
        .unwrap_or_else(|| state.config.jma.default_area_code.clone());
    validate_area_code(&area_code).map_err(|e| AppError::Validation {
        field: "area_code".to_string(),
        message: e.to_string(),
        message_ja: "地域コードが正しくありません".to_string(),
    })?;

    let request = ForecastRequest {
        area_code,
        start_date: query
            .start_date
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
        horizon: clamp_horizon(
            query.horizon.unwrap_or(i64::from(defaults.default_horizon)),
            defaults.max_horizon,
        ),
        aggregation: query.aggregation.unwrap_or(defaults.aggregation),
    };
    let use_history = query
        .use_history
        .unwrap_or_else(|| state.forecasts.history_configured());

    let output = state.forecasts.forecast(&request, use_history).await?;
    Ok(Json(output))
}

/// Defaults applied to forecast requests
pub async fn get_forecast_defaults(
    State(state): State<AppState>,
) -> Json<ForecastDefaultsResponse> {
    let defaults = &state.config.forecast;
    Json(ForecastDefaultsResponse {
        area_code: state.config.jma.default_area_code.clone(),
        horizon: defaults.default_horizon,
        max_horizon: defaults.max_horizon,
        aggregation: defaults.aggregation,
        history_available: state.forecasts.history_configured(),
        cache_ttl_seconds: state.config.jma.cache_ttl_seconds,
    })
}

#[derive(Debug, serde::Serialize)]
pub struct ForecastDefaultsResponse {
    pub area_code: String,
    pub horizon: u32,
    pub max_horizon: u32,
    pub aggregation: AggregationMode,
    pub history_available: bool,
    pub cache_ttl_seconds: u64,
}
