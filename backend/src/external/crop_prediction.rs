//! Crop prediction API client

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::SoilSample;
use std::sync::Arc;

use super::{read_json, CredentialProvider, CropApi, ExternalService};
use crate::config::CropConfig;
use crate::error::{AppError, AppResult};

/// Shown on the recommendation screen when the call fails
pub const RECOMMENDATION_FAILURE_MESSAGE: &str = "Failed to fetch crop recommendation.";

/// Client for the `/predict` endpoint
#[derive(Clone)]
pub struct CropPredictionClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl CropPredictionClient {
    /// Create a client from configuration
    pub fn from_config(config: &CropConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self::with_base_url(config.api_endpoint.clone(), credentials)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(base_url: String, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }
}

#[async_trait]
impl CropApi for CropPredictionClient {
    async fn predict(&self, sample: &SoilSample) -> AppResult<Value> {
        let url = format!("{}/predict", self.base_url);
        tracing::debug!(?sample, "Requesting crop prediction");

        let mut request = self.client.post(&url).json(sample);
        if let Some(key) = self.credentials.api_key(ExternalService::CropPrediction) {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            AppError::external(
                RECOMMENDATION_FAILURE_MESSAGE,
                format!("Crop prediction request failed: {}", e.without_url()),
            )
        })?;

        read_json(response, RECOMMENDATION_FAILURE_MESSAGE).await
    }
}
