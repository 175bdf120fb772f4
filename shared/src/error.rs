//! Error types for the forecasting pipeline

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the pure forecasting pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// The weather payload lacks the temperature structure predictions need
    #[error("Payload shape error: {0}")]
    PayloadShape(String),

    /// Rows were handed to the rollout out of ascending date order
    #[error("Rows out of date order: {current} does not follow {previous}")]
    Ordering {
        previous: NaiveDate,
        current: NaiveDate,
    },
}

/// Public-holiday calendar lookup failure. Callers fail open on this error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HolidayLookupError {
    #[error("Holiday calendar does not cover year {0}")]
    OutOfRange(i32),

    #[error("Holiday calendar unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for pipeline operations
pub type ForecastResult<T> = Result<T, ForecastError>;
