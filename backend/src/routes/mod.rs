//! Route definitions for the call-volume forecast service

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Forecast routes
        .nest("/forecast", forecast_routes())
}

/// Forecast routes
fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_forecast))
        .route("/defaults", get(handlers::get_forecast_defaults))
}
