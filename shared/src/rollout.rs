//! Autoregressive rollout over the forecast horizon
//!
//! Without observed history, each day's lag features come from a 7-day
//! window that starts as a seasonal baseline and is then fed the model's own
//! predictions. Days are processed strictly in ascending date order since
//! every prediction changes the window used by the next day.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::error::{ForecastError, ForecastResult};
use crate::features::FeatureRow;
use crate::models::{DailyRecord, HistoryPoint};
use crate::predictor::{LagFeatures, SeasonalPredictor};

/// Length of the trailing window
pub const WINDOW_LEN: usize = 7;

/// The last seven values of the metric, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow {
    values: [f64; WINDOW_LEN],
}

impl RollingWindow {
    /// Window holding the same value in every slot
    pub fn seeded(value: f64) -> Self {
        Self {
            values: [value; WINDOW_LEN],
        }
    }

    pub fn from_values(values: [f64; WINDOW_LEN]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64; WINDOW_LEN] {
        &self.values
    }

    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / WINDOW_LEN as f64
    }

    /// `lag1` is the newest value, `lag7` the oldest
    pub fn lags(&self) -> LagFeatures {
        LagFeatures {
            lag1: self.values[WINDOW_LEN - 1],
            lag7: self.values[0],
            ma7: self.mean(),
        }
    }

    /// Evict the oldest value and append `value`. Returns the evicted value.
    pub fn push(&mut self, value: f64) -> f64 {
        let evicted = self.values[0];
        self.values.rotate_left(1);
        self.values[WINDOW_LEN - 1] = value;
        evicted
    }
}

/// Lag lookup against observed history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLags {
    by_date: BTreeMap<NaiveDate, f64>,
    trailing_mean: f64,
}

impl HistoryLags {
    /// `points` must be sorted ascending by date
    pub fn new(points: &[HistoryPoint]) -> Self {
        let tail = &points[points.len().saturating_sub(WINDOW_LEN)..];
        let trailing_mean = if tail.is_empty() {
            0.0
        } else {
            tail.iter().map(|p| p.calls).sum::<f64>() / tail.len() as f64
        };

        Self {
            by_date: points.iter().map(|p| (p.date, p.calls)).collect(),
            trailing_mean,
        }
    }

    /// Mean of the most recent seven observations (fewer if history is shorter)
    pub fn trailing_mean(&self) -> f64 {
        self.trailing_mean
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// Exact lagged observations, falling back to the trailing mean when a date is absent
    pub fn lags_for(&self, date: NaiveDate) -> LagFeatures {
        let lookup = |days: i64| {
            self.by_date
                .get(&(date - Duration::days(days)))
                .copied()
                .unwrap_or(self.trailing_mean)
        };

        LagFeatures {
            lag1: lookup(1),
            lag7: lookup(7),
            ma7: self.trailing_mean,
        }
    }
}

/// Where lag features come from for a run
#[derive(Debug, Clone, PartialEq)]
pub enum LagSource {
    /// Predictions are fed back into the window
    Rollout(RollingWindow),
    /// Lags are read from observed history
    History(HistoryLags),
}

/// Sequential state machine producing one [`DailyRecord`] per feature row
pub struct RolloutEngine<'a> {
    predictor: &'a SeasonalPredictor,
    source: LagSource,
    last_date: Option<NaiveDate>,
}

impl<'a> RolloutEngine<'a> {
    pub fn new(predictor: &'a SeasonalPredictor, source: LagSource) -> Self {
        Self {
            predictor,
            source,
            last_date: None,
        }
    }

    /// Engine that rolls forward from a window of `baseline` values
    pub fn from_baseline(predictor: &'a SeasonalPredictor, baseline: f64) -> Self {
        Self::new(predictor, LagSource::Rollout(RollingWindow::seeded(baseline)))
    }

    pub fn source(&self) -> &LagSource {
        &self.source
    }

    /// Predict one day and advance the window
    pub fn step(&mut self, row: &FeatureRow) -> ForecastResult<DailyRecord> {
        if let Some(previous) = self.last_date {
            if row.date <= previous {
                return Err(ForecastError::Ordering {
                    previous,
                    current: row.date,
                });
            }
        }

        let lags = match &self.source {
            LagSource::Rollout(window) => window.lags(),
            LagSource::History(history) => history.lags_for(row.date),
        };
        let prediction = self.predictor.predict(row, lags);

        if let LagSource::Rollout(window) = &mut self.source {
            window.push(prediction);
        }
        self.last_date = Some(row.date);

        tracing::debug!(
            "Rollout {} ({}): lag1={:.2} lag7={:.2} ma7={:.2} -> {:.2}",
            row.date,
            row.season,
            lags.lag1,
            lags.lag7,
            lags.ma7,
            prediction
        );

        Ok(DailyRecord {
            date: row.date,
            tmin: row.tmin,
            tmax: row.tmax,
            is_summer: row.season.is_summer(),
            holiday_flag: row.holiday_flag,
            rain_flag: row.rain_flag,
            snow_flag: row.snow_flag,
            hot_excess: row.hot_excess,
            cold_excess: row.cold_excess,
            lag1: lags.lag1,
            lag7: lags.lag7,
            ma7: lags.ma7,
            prediction,
        })
    }

    /// Process all rows in order
    pub fn run(mut self, rows: &[FeatureRow]) -> ForecastResult<Vec<DailyRecord>> {
        rows.iter().map(|row| self.step(row)).collect()
    }
}
