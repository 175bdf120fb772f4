//! Error handling for the call-volume forecast service
//!
//! Provides consistent error responses in English and Japanese

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ForecastError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // External service errors
    #[error("Forecast fetch failed: {0}")]
    Fetch(#[from] crate::cache::FetchError),

    // Pipeline errors
    #[error("Payload shape error: {0}")]
    PayloadShape(String),

    #[error("Forecast error: {0}")]
    Forecast(ForecastError),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_ja: String,
    },

    // History errors
    #[error("History error: {0}")]
    History(String),
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::PayloadShape(msg) => AppError::PayloadShape(msg),
            other => AppError::Forecast(other),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::Validation {
            message: format!("Invalid request: {}", errors),
            message_ja: format!("入力内容が正しくありません: {}", field),
            field,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_ja: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Status code and body for this error
    pub fn detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Fetch(err) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "FETCH_ERROR".to_string(),
                    message_en: format!("Could not fetch the weather forecast: {}", err),
                    message_ja: "天気予報を取得できませんでした".to_string(),
                    field: None,
                },
            ),
            AppError::PayloadShape(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "PAYLOAD_SHAPE_ERROR".to_string(),
                    message_en: format!("Weather forecast has no usable temperatures: {}", msg),
                    message_ja: "天気予報に気温データがありません".to_string(),
                    field: None,
                },
            ),
            AppError::Forecast(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "FORECAST_ERROR".to_string(),
                    message_en: err.to_string(),
                    message_ja: format!("予測を計算できませんでした: {}", err),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_ja,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_ja: message_ja.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::History(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "HISTORY_ERROR".to_string(),
                    message_en: format!("Could not load call history: {}", msg),
                    message_ja: "実績データを読み込めませんでした".to_string(),
                    field: None,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.detail();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_error_maps_to_bad_gateway() {
        let err: AppError = ForecastError::PayloadShape("no temps".to_string()).into();
        let (status, detail) = err.detail();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(detail.code, "PAYLOAD_SHAPE_ERROR");
    }

    #[test]
    fn test_fetch_error_code() {
        let err: AppError = crate::cache::FetchError::Status {
            url: "https://example.invalid/130000.json".to_string(),
            status: 404,
        }
        .into();
        let (status, detail) = err.detail();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(detail.code, "FETCH_ERROR");
    }

    #[test]
    fn test_ordering_error_is_unprocessable() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let err: AppError = ForecastError::Ordering {
            previous: date,
            current: date,
        }
        .into();
        assert!(matches!(err, AppError::Forecast(_)));
        let (status, detail) = err.detail();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(detail.code, "FORECAST_ERROR");
    }

    #[test]
    fn test_validation_error_has_field() {
        let err = AppError::Validation {
            field: "area_code".to_string(),
            message: "bad".to_string(),
            message_ja: "不正".to_string(),
        };
        let (status, detail) = err.detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.field.as_deref(), Some("area_code"));
    }
}
