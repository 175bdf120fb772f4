//! The end-to-end forecast pipeline
//!
//! payload → daily weather → feature rows → rollout with the seasonal
//! predictor → daily records → buckets. Both operating modes (rolled-forward
//! lags or lags from observed history) and both aggregation modes run through
//! the same code path.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aggregate::aggregate;
use crate::calendar::{ConfiguredHolidayCalendar, HolidayCalendar};
use crate::error::ForecastResult;
use crate::features::FeatureExtractor;
use crate::jma::extract_daily_weather;
use crate::models::{DailyRecord, DailyWeather, ForecastOutput, HistoryPoint, ModelConfig};
use crate::predictor::SeasonalPredictor;
use crate::rollout::{HistoryLags, LagSource, RollingWindow, RolloutEngine};
use crate::types::{AggregationMode, DateRange};

/// What to forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastRequest {
    pub area_code: String,
    pub start_date: NaiveDate,
    /// Number of days, starting at `start_date`
    pub horizon: u32,
    #[serde(default)]
    pub aggregation: AggregationMode,
}

impl ForecastRequest {
    pub fn range(&self) -> DateRange {
        DateRange::from_horizon(self.start_date, self.horizon)
    }
}

/// Immutable configuration plus the collaborators derived from it
pub struct ForecastPipeline {
    config: ModelConfig,
    calendar: Box<dyn HolidayCalendar + Send + Sync>,
    predictor: SeasonalPredictor,
}

impl ForecastPipeline {
    pub fn new(config: ModelConfig) -> Self {
        let calendar = Box::new(ConfiguredHolidayCalendar::from_settings(&config.holidays));
        Self::with_calendar(config, calendar)
    }

    pub fn with_calendar(
        config: ModelConfig,
        calendar: Box<dyn HolidayCalendar + Send + Sync>,
    ) -> Self {
        let predictor = SeasonalPredictor::new(config.models());
        Self {
            config,
            calendar,
            predictor,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Lag source for a run. Empty history is treated as no history.
    fn lag_source(&self, first_day: NaiveDate, history: Option<&[HistoryPoint]>) -> LagSource {
        match history {
            Some(points) if !points.is_empty() => LagSource::History(HistoryLags::new(points)),
            other => {
                if other.is_some() {
                    tracing::warn!("History is empty, rolling forward from the seasonal baseline");
                }
                let season = self.config.season_of(first_day);
                let seed = self.config.baseline.for_season(season);
                tracing::debug!("Seeding rolling window with {} baseline {}", season, seed);
                LagSource::Rollout(RollingWindow::seeded(seed))
            }
        }
    }

    /// Predict each day. `days` must be in ascending date order.
    pub fn predict_days(
        &self,
        days: &[DailyWeather],
        history: Option<&[HistoryPoint]>,
    ) -> ForecastResult<Vec<DailyRecord>> {
        let Some(first) = days.first() else {
            return Ok(Vec::new());
        };

        let extractor = FeatureExtractor::new(&self.config, self.calendar.as_ref());
        let rows = extractor.rows(days);
        let source = self.lag_source(first.date, history);
        RolloutEngine::new(&self.predictor, source).run(&rows)
    }

    /// Run the whole pipeline on a raw forecast payload
    pub fn run(
        &self,
        request: &ForecastRequest,
        payload: &Value,
        history: Option<&[HistoryPoint]>,
        generated_at: DateTime<Utc>,
    ) -> ForecastResult<ForecastOutput> {
        let range = request.range();
        let days: Vec<DailyWeather> = extract_daily_weather(payload)?
            .into_iter()
            .filter(|day| range.contains(day.date))
            .collect();

        if days.is_empty() {
            tracing::warn!(
                "Forecast payload for {} has no days in {}",
                request.area_code,
                range.label()
            );
        }

        let daily = self.predict_days(&days, history)?;
        let buckets = aggregate(&daily, request.aggregation, range);
        let total: f64 = daily.iter().map(|r| r.prediction).sum();
        let history_available = history.map(|h| !h.is_empty()).unwrap_or(false);

        tracing::info!(
            "Forecast {} {}: {} days, total {:.1} ({} lags, {} buckets)",
            request.area_code,
            range.label(),
            daily.len(),
            total,
            if history_available { "history" } else { "rollout" },
            request.aggregation
        );

        Ok(ForecastOutput {
            area_code: request.area_code.clone(),
            generated_at,
            history_available,
            aggregation: request.aggregation,
            daily,
            buckets,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::NoPublicHolidays;
    use crate::models::{ModelParams, SeasonalModels};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn flat_config(baseline: f64) -> ModelConfig {
        let params = ModelParams {
            intercept: 1.73,
            beta_ma7: 0.0756,
            ..ModelParams::default()
        };
        let models = SeasonalModels {
            summer: params.clone(),
            winter: params,
        };
        ModelConfig {
            baseline: crate::models::Baseline {
                summer_daily: baseline,
                winter_daily: baseline,
            },
            summer: models.summer,
            winter: models.winter,
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_first_day_uses_baseline_window() {
        let pipeline =
            ForecastPipeline::with_calendar(flat_config(6.0), Box::new(NoPublicHolidays));
        let days = vec![DailyWeather::new(d(2024, 6, 3), Some(20.0), Some(25.0))];
        let daily = pipeline.predict_days(&days, None).unwrap();

        assert_eq!(daily[0].lag1, 6.0);
        assert_eq!(daily[0].lag7, 6.0);
        assert_eq!(daily[0].ma7, 6.0);
        assert_eq!(daily[0].display_prediction(), 8.9);
    }

    #[test]
    fn test_second_day_sees_first_prediction() {
        let pipeline =
            ForecastPipeline::with_calendar(flat_config(6.0), Box::new(NoPublicHolidays));
        let days = vec![
            DailyWeather::new(d(2024, 6, 3), None, None),
            DailyWeather::new(d(2024, 6, 4), None, None),
        ];
        let daily = pipeline.predict_days(&days, None).unwrap();

        assert_eq!(daily[1].lag1, daily[0].prediction);
        assert_eq!(daily[1].lag7, 6.0);
        assert!((daily[1].ma7 - (6.0 * 6.0 + daily[0].prediction) / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_history_rolls_forward() {
        let pipeline =
            ForecastPipeline::with_calendar(flat_config(6.0), Box::new(NoPublicHolidays));
        let days = vec![DailyWeather::new(d(2024, 6, 3), None, None)];
        let empty: Vec<HistoryPoint> = Vec::new();
        let daily = pipeline.predict_days(&days, Some(empty.as_slice())).unwrap();
        assert_eq!(daily[0].ma7, 6.0);
    }
}
