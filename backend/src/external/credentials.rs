//! Credential injection for outbound API calls
//!
//! Clients ask for their key on every request instead of holding it, so a
//! provider backed by a rotating secret store can be dropped in without
//! touching the clients.

use std::collections::HashMap;
use std::fmt;

use crate::config::Config;

/// Third-party services the gateway calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalService {
    Gemini,
    CropPrediction,
    Weather,
}

impl ExternalService {
    pub const ALL: [ExternalService; 3] = [
        ExternalService::Gemini,
        ExternalService::CropPrediction,
        ExternalService::Weather,
    ];

    /// The public crop prediction service accepts anonymous calls
    pub fn requires_key(&self) -> bool {
        !matches!(self, ExternalService::CropPrediction)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExternalService::Gemini => "gemini",
            ExternalService::CropPrediction => "crop-prediction",
            ExternalService::Weather => "weather",
        }
    }
}

/// Source of API keys
pub trait CredentialProvider: Send + Sync {
    /// Current key for `service`, `None` when none is configured
    fn api_key(&self, service: ExternalService) -> Option<String>;
}

/// Keys taken from the loaded configuration
#[derive(Clone, Default)]
pub struct ConfiguredCredentials {
    keys: HashMap<ExternalService, String>,
}

impl ConfiguredCredentials {
    pub fn from_config(config: &Config) -> Self {
        Self::from_pairs([
            (ExternalService::Gemini, config.gemini.api_key.clone()),
            (ExternalService::CropPrediction, config.crop.api_key.clone()),
            (ExternalService::Weather, config.weather.api_key.clone()),
        ])
    }

    /// Build from explicit pairs; blank keys count as missing
    pub fn from_pairs(pairs: impl IntoIterator<Item = (ExternalService, String)>) -> Self {
        let keys = pairs
            .into_iter()
            .filter(|(_, key)| !key.trim().is_empty())
            .collect();
        Self { keys }
    }

    /// Services that need a key but have none
    pub fn missing(&self) -> Vec<ExternalService> {
        ExternalService::ALL
            .into_iter()
            .filter(|s| s.requires_key() && !self.keys.contains_key(s))
            .collect()
    }
}

impl CredentialProvider for ConfiguredCredentials {
    fn api_key(&self, service: ExternalService) -> Option<String> {
        self.keys.get(&service).cloned()
    }
}

// Keys must never reach a log line
impl fmt::Debug for ConfiguredCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut configured: Vec<_> = self.keys.keys().map(|s| s.name()).collect();
        configured.sort_unstable();
        f.debug_struct("ConfiguredCredentials")
            .field("configured", &configured)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_keys_are_missing() {
        let creds = ConfiguredCredentials::from_pairs([
            (ExternalService::Gemini, "  ".to_string()),
            (ExternalService::Weather, "owm-key".to_string()),
        ]);
        assert_eq!(creds.api_key(ExternalService::Gemini), None);
        assert_eq!(creds.api_key(ExternalService::Weather).as_deref(), Some("owm-key"));
        assert_eq!(creds.api_key(ExternalService::CropPrediction), None);
        assert_eq!(creds.missing(), vec![ExternalService::Gemini]);
    }

    #[test]
    fn test_debug_hides_keys() {
        let creds = ConfiguredCredentials::from_pairs([(
            ExternalService::Weather,
            "super-secret".to_string(),
        )]);
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("weather"));
    }
}
