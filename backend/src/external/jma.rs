//! JMA (Japan Meteorological Agency) forecast client
//!
//! Fetches the public forecast document for an area office, e.g.
//! `https://www.jma.go.jp/bosai/forecast/data/forecast/130000.json`.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::cache::{FetchError, ForecastSource};

/// JMA forecast API client
#[derive(Clone)]
pub struct JmaClient {
    client: Client,
    base_url: String,
}

impl JmaClient {
    /// Create a new JmaClient against the public endpoint
    pub fn new() -> Self {
        Self::with_base_url("https://www.jma.go.jp/bosai/forecast/data/forecast".to_string())
    }

    /// Create a new JmaClient with custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL of the forecast document for `area_code`
    pub fn forecast_url(&self, area_code: &str) -> String {
        format!("{}/{}.json", self.base_url, area_code)
    }

    /// Fetch the raw forecast document
    pub async fn get_forecast(&self, area_code: &str) -> Result<Value, FetchError> {
        let url = self.forecast_url(area_code);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("JMA API error: {} - {}", status, body);
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| FetchError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

impl Default for JmaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ForecastSource for JmaClient {
    async fn fetch(&self, key: &str) -> Result<Value, FetchError> {
        self.get_forecast(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_url() {
        let client = JmaClient::with_base_url("http://localhost:8080/forecast/".to_string());
        assert_eq!(
            client.forecast_url("130000"),
            "http://localhost:8080/forecast/130000.json"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let client = JmaClient::with_base_url("http://127.0.0.1:9".to_string());
        let err = client.get_forecast("130000").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
