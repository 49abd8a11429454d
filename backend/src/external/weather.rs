//! Weather API client for geocoding and forecasts
//!
//! Integrates with OpenWeatherMap: direct geocoding to resolve a city name,
//! and the 5 day / 3 hour forecast for a coordinate pair.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::Coordinates;
use std::sync::Arc;

use super::{read_json, CredentialProvider, ExternalService, WeatherApi};
use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

/// Shown on the weather screen when a call fails
pub const WEATHER_FAILURE_MESSAGE: &str = "Failed to fetch weather";

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    geocoding_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl WeatherClient {
    /// Create a new WeatherClient from configuration
    pub fn from_config(config: &WeatherConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self::with_base_url(
            config.api_endpoint.clone(),
            config.geocoding_endpoint.clone(),
            credentials,
        )
    }

    /// Create a new WeatherClient with custom base URLs (for testing)
    pub fn with_base_url(
        base_url: String,
        geocoding_url: String,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            geocoding_url: geocoding_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn api_key(&self) -> AppResult<String> {
        self.credentials
            .api_key(ExternalService::Weather)
            .ok_or_else(|| AppError::Configuration("Weather API key not configured".to_string()))
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> AppResult<Value> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                AppError::external(WEATHER_FAILURE_MESSAGE, format!("Weather API request failed: {}", e.without_url()))
            })?;

        read_json(response, WEATHER_FAILURE_MESSAGE).await
    }
}

#[async_trait]
impl WeatherApi for WeatherClient {
    async fn geocode(&self, city: &str) -> AppResult<Value> {
        let api_key = self.api_key()?;
        let url = format!("{}/direct", self.geocoding_url);
        tracing::debug!(%city, "Geocoding city");

        self.get(
            &url,
            &[
                ("q", city.to_string()),
                ("limit", "1".to_string()),
                ("appid", api_key),
            ],
        )
        .await
    }

    async fn forecast(&self, coordinates: Coordinates) -> AppResult<Value> {
        let api_key = self.api_key()?;
        let url = format!("{}/forecast", self.base_url);
        tracing::debug!(
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            "Fetching forecast"
        );

        self.get(
            &url,
            &[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("appid", api_key),
                ("units", "metric".to_string()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::ConfiguredCredentials;

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let client = WeatherClient::with_base_url(
            "http://127.0.0.1:9/data/2.5".to_string(),
            "http://127.0.0.1:9/geo/1.0".to_string(),
            Arc::new(ConfiguredCredentials::default()),
        );
        assert!(matches!(
            client.geocode("Pune").await,
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            client.forecast(Coordinates::new(18.5, 73.8)).await,
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = WeatherClient::with_base_url(
            "https://api.example/data/2.5/".to_string(),
            "https://api.example/geo/1.0/".to_string(),
            Arc::new(ConfiguredCredentials::default()),
        );
        assert_eq!(client.base_url, "https://api.example/data/2.5");
        assert_eq!(client.geocoding_url, "https://api.example/geo/1.0");
    }
}
