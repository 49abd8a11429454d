//! Crop recommendation models

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text the prediction service sends instead of an adjustment map
pub const NO_ADJUSTMENTS_SENTINEL: &str = "No major adjustments needed";

/// What the screen shows when no adjustment is suggested
pub const NO_ADJUSTMENTS_MESSAGE: &str =
    "Your soil parameters look good. No major adjustments needed.";

/// Suggested changes to the submitted soil parameters.
///
/// The service answers either with a map of field name to suggested value
/// or with the sentinel string; both shapes land here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ParameterAdjustments {
    Suggested(BTreeMap<String, String>),
    NoneNeeded,
}

impl ParameterAdjustments {
    /// Lines to render, one per adjusted parameter
    pub fn display_lines(&self) -> Vec<String> {
        match self {
            ParameterAdjustments::NoneNeeded => vec![NO_ADJUSTMENTS_MESSAGE.to_string()],
            ParameterAdjustments::Suggested(values) => values
                .iter()
                .map(|(field, value)| format!("{}: {}", field, value))
                .collect(),
        }
    }

    pub fn is_none_needed(&self) -> bool {
        matches!(self, ParameterAdjustments::NoneNeeded)
    }
}

impl<'de> Deserialize<'de> for ParameterAdjustments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Map(BTreeMap<String, serde_json::Value>),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) if text.trim() == NO_ADJUSTMENTS_SENTINEL => {
                Ok(ParameterAdjustments::NoneNeeded)
            }
            Raw::Text(text) => Err(de::Error::custom(format!(
                "unexpected parameter_modifications text: {}",
                text
            ))),
            Raw::Map(map) => Ok(ParameterAdjustments::Suggested(
                map.into_iter()
                    .map(|(field, value)| {
                        let value = match value {
                            serde_json::Value::String(s) => s,
                            other => other.to_string(),
                        };
                        (field, value)
                    })
                    .collect(),
            )),
        }
    }
}

/// Outcome of one recommendation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationResult {
    pub predicted_crop: String,
    pub adjustments: ParameterAdjustments,
    pub rule_suggestions: Vec<String>,
}

/// Display form of a recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationView {
    pub predicted_crop: String,
    pub adjustment_lines: Vec<String>,
    pub rule_suggestions: Vec<String>,
}

impl From<&RecommendationResult> for RecommendationView {
    fn from(result: &RecommendationResult) -> Self {
        Self {
            predicted_crop: result.predicted_crop.clone(),
            adjustment_lines: result.adjustments.display_lines(),
            rule_suggestions: result.rule_suggestions.clone(),
        }
    }
}
