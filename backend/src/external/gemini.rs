//! Generative language API client for the chat assistant

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::{read_json, ChatApi, CredentialProvider, ExternalService};
use crate::config::GeminiConfig;
use crate::error::{AppError, AppResult};

/// Shown on the chat screen when the call fails
pub const CHAT_FAILURE_MESSAGE: &str = "Error fetching from Gemini";

/// Client for the generateContent endpoint
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    credentials: Arc<dyn CredentialProvider>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: RequestContent<'a>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl GeminiClient {
    /// Create a client from configuration
    pub fn from_config(config: &GeminiConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self::with_base_url(config.api_endpoint.clone(), config.model.clone(), credentials)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(
        base_url: String,
        model: String,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            credentials,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ChatApi for GeminiClient {
    async fn generate(&self, prompt: &str) -> AppResult<Value> {
        let api_key = self
            .credentials
            .api_key(ExternalService::Gemini)
            .ok_or_else(|| AppError::Configuration("Gemini API key not configured".to_string()))?;

        let body = GenerateContentRequest {
            contents: RequestContent {
                parts: vec![RequestPart { text: prompt }],
            },
        };

        tracing::debug!(model = %self.model, "Sending chat prompt");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external(CHAT_FAILURE_MESSAGE, format!("Gemini request failed: {}", e.without_url())))?;

        read_json(response, CHAT_FAILURE_MESSAGE).await
    }
}
