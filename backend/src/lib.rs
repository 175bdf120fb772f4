//! Call-volume forecast service
//!
//! Serves daily and weekly call-volume forecasts built from the JMA weather
//! forecast, the calendar and a fitted seasonal log-linear model.

use std::sync::Arc;

use axum::{routing::get, Router};
use shared::pipeline::ForecastPipeline;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod cache;
pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;

use crate::cache::{ForecastSource, TtlCache};
use crate::external::JmaClient;
use crate::services::{ForecastService, HistoryService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub forecasts: Arc<ForecastService>,
}

impl AppState {
    /// State wired to the JMA API configured in `config`
    pub fn new(config: Config) -> Self {
        let source: Arc<dyn ForecastSource> =
            Arc::new(JmaClient::with_base_url(config.jma.base_url.clone()));
        Self::with_cache(config, TtlCache::new(source))
    }

    /// State over an explicit cache, e.g. one backed by a fake source
    pub fn with_cache(config: Config, cache: TtlCache) -> Self {
        let pipeline = Arc::new(ForecastPipeline::new(config.model.clone()));
        let history = HistoryService::new(config.history.path.clone());
        let forecasts = ForecastService::new(pipeline, cache, history, config.cache_ttl());

        Self {
            config: Arc::new(config),
            forecasts: Arc::new(forecasts),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Call Volume Forecast API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
