//! External API integrations
//!
//! One client per third-party service. Each issues exactly one HTTP request
//! per call: no retry, no caching. Screens reach the clients through the
//! traits below so tests can substitute fakes.

pub mod credentials;
pub mod crop_prediction;
pub mod gemini;
pub mod weather;

use async_trait::async_trait;
use serde_json::Value;
use shared::{Coordinates, SoilSample};

use crate::error::{AppError, AppResult};

pub use credentials::{ConfiguredCredentials, CredentialProvider, ExternalService};
pub use crop_prediction::CropPredictionClient;
pub use gemini::GeminiClient;
pub use weather::WeatherClient;

/// Generative chat completion
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send one prompt and return the raw response body
    async fn generate(&self, prompt: &str) -> AppResult<Value>;
}

/// Crop prediction from soil and climate readings
#[async_trait]
pub trait CropApi: Send + Sync {
    async fn predict(&self, sample: &SoilSample) -> AppResult<Value>;
}

/// Geocoding and multi-day forecast lookups
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Resolve a city name; the body is a (possibly empty) list of matches
    async fn geocode(&self, city: &str) -> AppResult<Value>;

    /// Five-day forecast in three-hour steps
    async fn forecast(&self, coordinates: Coordinates) -> AppResult<Value>;
}

/// Check the status and decode the JSON body of a response.
///
/// `user_message` is what the screen shows if anything goes wrong; the
/// status and body only reach the log.
pub(crate) async fn read_json(response: reqwest::Response, user_message: &str) -> AppResult<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::external(
            user_message,
            format!("HTTP {} - {}", status, body),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::external(user_message, format!("Failed to parse response: {}", e.without_url())))
}
