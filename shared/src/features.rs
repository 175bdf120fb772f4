//! Calendar and weather features for a forecast day

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{is_holiday, HolidayCalendar};
use crate::models::{DailyWeather, ModelConfig, SeasonRule};
use crate::types::Season;

/// Precipitation probability (percent) at or above which a day counts as rainy
pub const RAIN_POP_THRESHOLD: f64 = 50.0;

/// Hinge on heat: `max(0, tmax - threshold)`, 0 when the temperature is missing
pub fn hot_excess(tmax: Option<f64>, threshold: f64) -> f64 {
    match tmax {
        Some(t) if t.is_finite() => (t - threshold).max(0.0),
        _ => 0.0,
    }
}

/// Hinge on cold: `max(0, threshold - tmin)`, 0 when the temperature is missing
pub fn cold_excess(tmin: Option<f64>, threshold: f64) -> f64 {
    match tmin {
        Some(t) if t.is_finite() => (threshold - t).max(0.0),
        _ => 0.0,
    }
}

/// Rain and snow indicators for one day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PrecipitationFlags {
    pub rain: bool,
    pub snow: bool,
}

/// Coarse precipitation heuristic on the forecast weather code.
///
/// Codes starting with `3` (rain) or a probability of precipitation of at
/// least 50% mark rain; codes starting with `4` mark snow. Anything else,
/// including missing data, leaves both flags unset.
pub fn precipitation_flags(weather_code: Option<&str>, pop: Option<f64>) -> PrecipitationFlags {
    let leading = weather_code.and_then(|code| code.trim().chars().next());
    let likely_rain = pop.map(|p| p >= RAIN_POP_THRESHOLD).unwrap_or(false);

    PrecipitationFlags {
        rain: leading == Some('3') || likely_rain,
        snow: leading == Some('4'),
    }
}

/// Everything known about a day before the autoregressive lags are attached
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
    pub season: Season,
    pub holiday_flag: bool,
    pub rain_flag: bool,
    pub snow_flag: bool,
    /// Non-zero only in summer
    pub hot_excess: f64,
    /// Non-zero only in winter
    pub cold_excess: f64,
}

/// Maps a day's weather onto model features
pub struct FeatureExtractor<'a> {
    hot_threshold: f64,
    cold_threshold: f64,
    season_rule: SeasonRule,
    calendar: &'a dyn HolidayCalendar,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(config: &ModelConfig, calendar: &'a dyn HolidayCalendar) -> Self {
        Self {
            hot_threshold: config.hot_threshold,
            cold_threshold: config.cold_threshold,
            season_rule: config.season,
            calendar,
        }
    }

    pub fn season_of(&self, date: NaiveDate) -> Season {
        self.season_rule.season_of(date)
    }

    pub fn row(&self, weather: &DailyWeather) -> FeatureRow {
        let season = self.season_of(weather.date);
        let flags = precipitation_flags(weather.weather_code.as_deref(), weather.pop);

        let (hot, cold) = match season {
            Season::Summer => (hot_excess(weather.tmax, self.hot_threshold), 0.0),
            Season::Winter => (0.0, cold_excess(weather.tmin, self.cold_threshold)),
        };

        FeatureRow {
            date: weather.date,
            tmin: weather.tmin,
            tmax: weather.tmax,
            season,
            holiday_flag: is_holiday(weather.date, self.calendar),
            rain_flag: flags.rain,
            snow_flag: flags.snow,
            hot_excess: hot,
            cold_excess: cold,
        }
    }

    pub fn rows(&self, days: &[DailyWeather]) -> Vec<FeatureRow> {
        days.iter().map(|day| self.row(day)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::NoPublicHolidays;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_hinges() {
        assert_eq!(hot_excess(Some(31.5), 28.0), 3.5);
        assert_eq!(hot_excess(Some(25.0), 28.0), 0.0);
        assert_eq!(hot_excess(None, 28.0), 0.0);
        assert_eq!(cold_excess(Some(-1.0), 3.0), 4.0);
        assert_eq!(cold_excess(Some(8.0), 3.0), 0.0);
        assert_eq!(cold_excess(None, 3.0), 0.0);
        assert_eq!(cold_excess(Some(f64::NAN), 3.0), 0.0);
    }

    #[test]
    fn test_rain_code_without_pop() {
        let flags = precipitation_flags(Some("300"), None);
        assert!(flags.rain);
        assert!(!flags.snow);
    }

    #[test]
    fn test_snow_code() {
        let flags = precipitation_flags(Some("400"), Some(30.0));
        assert!(!flags.rain);
        assert!(flags.snow);
    }

    #[test]
    fn test_pop_threshold() {
        assert!(precipitation_flags(Some("101"), Some(50.0)).rain);
        assert!(!precipitation_flags(Some("101"), Some(40.0)).rain);
        assert!(precipitation_flags(None, Some(80.0)).rain);
    }

    #[test]
    fn test_unknown_or_missing_code() {
        assert_eq!(precipitation_flags(Some("200"), None), PrecipitationFlags::default());
        assert_eq!(precipitation_flags(Some(""), None), PrecipitationFlags::default());
        assert_eq!(precipitation_flags(None, None), PrecipitationFlags::default());
    }

    #[test]
    fn test_hinge_gated_by_season() {
        let config = ModelConfig::default();
        let extractor = FeatureExtractor::new(&config, &NoPublicHolidays);

        // Hot winter day: no hot excess
        let winter = extractor.row(&DailyWeather::new(d(2024, 4, 30), Some(-2.0), Some(33.0)));
        assert_eq!(winter.season, Season::Winter);
        assert_eq!(winter.hot_excess, 0.0);
        assert_eq!(winter.cold_excess, 5.0);

        // Cold summer morning: no cold excess
        let summer = extractor.row(&DailyWeather::new(d(2024, 5, 1), Some(-2.0), Some(33.0)));
        assert_eq!(summer.season, Season::Summer);
        assert_eq!(summer.hot_excess, 5.0);
        assert_eq!(summer.cold_excess, 0.0);
    }
}
