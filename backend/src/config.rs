//! Configuration management for the call-volume forecast service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with CALLCAST_ prefix

use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{validate_model_config, AggregationMode, ModelConfig, MAX_HORIZON_DAYS};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// JMA forecast API configuration
    pub jma: JmaConfig,

    /// Observed call history
    #[serde(default)]
    pub history: HistoryConfig,

    /// Request defaults
    pub forecast: ForecastDefaults,

    /// Model coefficients, thresholds and calendar
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JmaConfig {
    /// Base URL of the forecast documents, without trailing slash
    pub base_url: String,

    /// Seconds a fetched forecast stays fresh
    pub cache_ttl_seconds: u64,

    /// Area used when a request does not name one
    pub default_area_code: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct HistoryConfig {
    /// JSON (`[{"date", "calls"}]`) or CSV (`date,calls`) file of observed volumes
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastDefaults {
    /// Horizon used when a request does not give one
    pub default_horizon: u32,

    /// Requests are clamped to this many days
    pub max_horizon: u32,

    pub aggregation: AggregationMode,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("CALLCAST_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default(
                "jma.base_url",
                "https://www.jma.go.jp/bosai/forecast/data/forecast",
            )?
            .set_default("jma.cache_ttl_seconds", 3600)?
            .set_default("jma.default_area_code", "130000")?
            .set_default("forecast.default_horizon", 7)?
            .set_default("forecast.max_horizon", MAX_HORIZON_DAYS)?
            .set_default("forecast.aggregation", "weekly")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CALLCAST_ prefix)
            .add_source(
                Environment::with_prefix("CALLCAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the forecast cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_model_config(&self.model).map_err(|e| ConfigError::Message(e.to_string()))?;
        if self.forecast.max_horizon == 0 || self.forecast.max_horizon > MAX_HORIZON_DAYS {
            return Err(ConfigError::Message(format!(
                "forecast.max_horizon must be between 1 and {}",
                MAX_HORIZON_DAYS
            )));
        }
        if self.jma.cache_ttl_seconds == 0 {
            return Err(ConfigError::Message(
                "jma.cache_ttl_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.jma.cache_ttl_seconds as i64)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            jma: JmaConfig::default(),
            history: HistoryConfig::default(),
            forecast: ForecastDefaults::default(),
            model: ModelConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for JmaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.jma.go.jp/bosai/forecast/data/forecast".to_string(),
            cache_ttl_seconds: 3600,
            default_area_code: "130000".to_string(),
        }
    }
}

impl Default for ForecastDefaults {
    fn default() -> Self {
        Self {
            default_horizon: 7,
            max_horizon: MAX_HORIZON_DAYS,
            aggregation: AggregationMode::Weekly,
        }
    }
}
