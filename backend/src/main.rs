//! Call-volume forecast service - server binary

use std::net::SocketAddr;

use callcast::{config::Config, create_app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "callcast=debug,callcast_server=debug,shared=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Call Volume Forecast Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!(
        "JMA endpoint {} (cache TTL {}s), default area {}",
        config.jma.base_url,
        config.jma.cache_ttl_seconds,
        config.jma.default_area_code
    );
    match &config.history.path {
        Some(path) => tracing::info!("Call history: {}", path.display()),
        None => tracing::info!("No call history configured, lags roll forward from baseline"),
    }

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));

    // Build application
    let app = create_app(AppState::new(config));

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
