//! Forecast output records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{round1, AggregationMode, Season};

/// One forecast day with the features that produced its prediction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
    pub is_summer: bool,
    pub holiday_flag: bool,
    pub rain_flag: bool,
    pub snow_flag: bool,
    pub hot_excess: f64,
    pub cold_excess: f64,
    pub lag1: f64,
    pub lag7: f64,
    pub ma7: f64,
    pub prediction: f64,
}

impl DailyRecord {
    pub fn season(&self) -> Season {
        if self.is_summer {
            Season::Summer
        } else {
            Season::Winter
        }
    }

    /// Prediction as shown in the daily table
    pub fn display_prediction(&self) -> f64 {
        round1(self.prediction)
    }
}

/// Sum of daily predictions over a week or over the whole horizon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    /// Week start date (`YYYY-MM-DD`) or the literal date range
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
    pub prediction: f64,
}

/// Complete result of one forecast run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastOutput {
    pub area_code: String,
    pub generated_at: DateTime<Utc>,
    pub history_available: bool,
    pub aggregation: AggregationMode,
    pub daily: Vec<DailyRecord>,
    pub buckets: Vec<Bucket>,
    pub total: f64,
}
