//! Configuration management for the Farm Assist gateway
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FARM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{ThemeMode, MAX_FORECAST_DAYS, MAX_REPLY_WORDS};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Generative chat API configuration
    pub gemini: GeminiConfig,

    /// Crop prediction API configuration
    pub crop: CropConfig,

    /// Weather and geocoding API configuration
    pub weather: WeatherConfig,

    /// Key/value persistence
    pub storage: StorageConfig,

    /// Limits and display settings handed to every screen
    pub screen: ScreenConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// Base URL of the generative language API
    pub api_endpoint: String,

    /// Model used for generateContent
    pub model: String,

    /// API key, empty when not configured
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CropConfig {
    /// Base URL of the crop prediction service
    pub api_endpoint: String,

    /// Optional bearer key; the public service needs none
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Forecast API endpoint
    pub api_endpoint: String,

    /// Geocoding API endpoint
    pub geocoding_endpoint: String,

    /// Weather API key
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON file holding the launch flag and other device keys
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScreenConfig {
    /// Words kept from an assistant reply
    pub reply_word_limit: usize,

    /// Days shown on the weather screen
    pub forecast_days: usize,

    /// Theme the front end starts with
    pub theme: ThemeMode,

    /// Seconds a screen session may go unused before it is closed
    pub idle_timeout_secs: u64,

    /// Seconds between idle session sweeps
    pub sweep_interval_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FARM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default(
                "gemini.api_endpoint",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("gemini.model", "gemini-2.0-flash")?
            .set_default("crop.api_endpoint", "https://api-crop.onrender.com")?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("weather.geocoding_endpoint", "https://api.openweathermap.org/geo/1.0")?
            .set_default("storage.path", "data/device.json")?
            .set_default("screen.reply_word_limit", MAX_REPLY_WORDS as i64)?
            .set_default("screen.forecast_days", MAX_FORECAST_DAYS as i64)?
            .set_default("screen.theme", "light")?
            .set_default("screen.idle_timeout_secs", 1800)?
            .set_default("screen.sweep_interval_secs", 60)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FARM_ prefix)
            .add_source(
                Environment::with_prefix("FARM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
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

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            reply_word_limit: MAX_REPLY_WORDS,
            forecast_days: MAX_FORECAST_DAYS,
            theme: ThemeMode::default(),
            idle_timeout_secs: 1800,
            sweep_interval_secs: 60,
        }
    }
}
