//! Model coefficients and forecast configuration

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::Season;

/// Coefficients of one seasonal log-linear model.
///
/// `beta_hot` only applies to the summer model and `beta_cold` only to the
/// winter model. Missing coefficients contribute nothing to the linear predictor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModelParams {
    pub intercept: f64,
    #[serde(default)]
    pub beta_lag1: f64,
    #[serde(default)]
    pub beta_lag7: f64,
    #[serde(default)]
    pub beta_ma7: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta_hot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta_cold: Option<f64>,
    #[serde(default)]
    pub beta_rain: f64,
    #[serde(default)]
    pub beta_snow: f64,
}

impl ModelParams {
    /// Fitted summer (May-October) coefficients
    pub fn fitted_summer() -> Self {
        Self {
            intercept: 1.729792,
            beta_lag1: -0.009982,
            beta_lag7: -0.005223,
            beta_ma7: 0.075590,
            beta_hot: Some(0.005346),
            beta_cold: None,
            beta_rain: 0.037396,
            // NA in the fit, pinned to zero
            beta_snow: 0.0,
        }
    }

    /// Fitted winter (November-April) coefficients
    pub fn fitted_winter() -> Self {
        Self {
            intercept: 1.7303914,
            beta_lag1: -0.0121234,
            beta_lag7: -0.0013908,
            beta_ma7: 0.0771805,
            beta_hot: None,
            beta_cold: Some(0.0037811),
            beta_rain: 0.0321400,
            beta_snow: 0.0123866,
        }
    }

    fn coefficients(&self) -> impl Iterator<Item = f64> {
        [
            self.intercept,
            self.beta_lag1,
            self.beta_lag7,
            self.beta_ma7,
            self.beta_hot.unwrap_or(0.0),
            self.beta_cold.unwrap_or(0.0),
            self.beta_rain,
            self.beta_snow,
        ]
        .into_iter()
    }

    pub fn is_finite(&self) -> bool {
        self.coefficients().all(f64::is_finite)
    }
}

/// The pair of seasonal models used for one run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonalModels {
    pub summer: ModelParams,
    pub winter: ModelParams,
}

impl SeasonalModels {
    pub fn for_season(&self, season: Season) -> &ModelParams {
        match season {
            Season::Summer => &self.summer,
            Season::Winter => &self.winter,
        }
    }
}

impl Default for SeasonalModels {
    fn default() -> Self {
        Self {
            summer: ModelParams::fitted_summer(),
            winter: ModelParams::fitted_winter(),
        }
    }
}

/// Average daily volume per season, used to seed the rolling window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Baseline {
    pub summer_daily: f64,
    pub winter_daily: f64,
}

impl Baseline {
    pub fn for_season(&self, season: Season) -> f64 {
        match season {
            Season::Summer => self.summer_daily,
            Season::Winter => self.winter_daily,
        }
    }
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            summer_daily: 13.7,
            winter_daily: 14.3,
        }
    }
}

/// Month-granular season boundary. Both ends are inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SeasonRule {
    pub summer_start_month: u32,
    pub summer_end_month: u32,
}

impl SeasonRule {
    pub fn is_summer_month(&self, month: u32) -> bool {
        month >= self.summer_start_month && month <= self.summer_end_month
    }

    pub fn season_of(&self, date: NaiveDate) -> Season {
        if self.is_summer_month(date.month()) {
            Season::Summer
        } else {
            Season::Winter
        }
    }
}

impl Default for SeasonRule {
    fn default() -> Self {
        Self {
            summer_start_month: 5,
            summer_end_month: 10,
        }
    }
}

/// Which public-holiday calendar backs the holiday flag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HolidayCalendarKind {
    /// Japanese national holidays
    #[default]
    Japan,
    /// Only the configured `extra_dates`
    Fixed,
    /// Weekends only
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HolidaySettings {
    #[serde(default)]
    pub calendar: HolidayCalendarKind,
    /// Additional closure days (company holidays, year-end break)
    #[serde(default)]
    pub extra_dates: Vec<NaiveDate>,
}

/// Immutable model configuration for a forecast run.
///
/// Fields left out of a configuration source keep the fitted defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Summer hinge threshold on tmax, in Celsius
    pub hot_threshold: f64,
    /// Winter hinge threshold on tmin, in Celsius
    pub cold_threshold: f64,
    pub baseline: Baseline,
    pub season: SeasonRule,
    pub holidays: HolidaySettings,
    pub summer: ModelParams,
    pub winter: ModelParams,
}

impl ModelConfig {
    pub fn season_of(&self, date: NaiveDate) -> Season {
        self.season.season_of(date)
    }

    pub fn models(&self) -> SeasonalModels {
        SeasonalModels {
            summer: self.summer.clone(),
            winter: self.winter.clone(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hot_threshold: 28.0,
            cold_threshold: 3.0,
            baseline: Baseline::default(),
            season: SeasonRule::default(),
            holidays: HolidaySettings::default(),
            summer: ModelParams::fitted_summer(),
            winter: ModelParams::fitted_winter(),
        }
    }
}
