//! Forecast service: fetches inputs and runs the shared pipeline

use std::sync::Arc;

use chrono::{Duration, Utc};
use shared::pipeline::{ForecastPipeline, ForecastRequest};
use shared::ForecastOutput;

use crate::cache::TtlCache;
use crate::error::{AppError, AppResult};
use crate::services::history::HistoryService;

/// Runs forecasts for API requests
#[derive(Clone)]
pub struct ForecastService {
    pipeline: Arc<ForecastPipeline>,
    cache: TtlCache,
    history: HistoryService,
    ttl: Duration,
}

impl ForecastService {
    /// Create a new ForecastService instance
    pub fn new(
        pipeline: Arc<ForecastPipeline>,
        cache: TtlCache,
        history: HistoryService,
        ttl: Duration,
    ) -> Self {
        Self {
            pipeline,
            cache,
            history,
            ttl,
        }
    }

    pub fn history_configured(&self) -> bool {
        self.history.is_configured()
    }

    /// Run one forecast.
    ///
    /// The forecast payload and the history file are loaded concurrently; a
    /// failure of either aborts the run with no partial output.
    pub async fn forecast(
        &self,
        request: &ForecastRequest,
        use_history: bool,
    ) -> AppResult<ForecastOutput> {
        if use_history && !self.history.is_configured() {
            tracing::warn!("History requested but no history file is configured");
        }

        let history = async {
            if use_history {
                self.history.load().await
            } else {
                Ok(None)
            }
        };
        let payload = async {
            self.cache
                .get(&request.area_code, self.ttl)
                .await
                .map_err(AppError::from)
        };

        let (history, payload) = tokio::try_join!(history, payload)?;

        let output = self
            .pipeline
            .run(request, &payload, history.as_deref(), Utc::now())?;

        Ok(output)
    }
}
