//! Weather data extracted from a forecast payload

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Forecast conditions for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
    /// Forecast weather code, e.g. `"100"` (fine) or `"300"` (rain)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<String>,
    /// Probability of precipitation in percent (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pop: Option<f64>,
}

impl DailyWeather {
    pub fn new(date: NaiveDate, tmin: Option<f64>, tmax: Option<f64>) -> Self {
        Self {
            date,
            tmin,
            tmax,
            weather_code: None,
            pop: None,
        }
    }
}
