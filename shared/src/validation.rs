//! Validation utilities for user input
//!
//! Every check produces a human-readable message keyed by field so the front
//! end can show it next to the offending input. Failures never stop the user
//! from typing; they only block submission.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::{PhLevel, MAX_CHAT_MESSAGE_CHARS};

pub const INVALID_NUMBER_MESSAGE: &str = "Please enter a valid number";
pub const MISSING_PH_MESSAGE: &str = "Please select a pH level";
pub const INVALID_PH_MESSAGE: &str = "pH level must be one of the listed values (5.0 to 7.0)";
pub const MISSING_CITY_MESSAGE: &str = "Please enter a city name";
pub const EMPTY_MESSAGE_MESSAGE: &str = "Please type a message";
pub const INVALID_FORM_MESSAGE: &str = "Please check all numeric inputs";

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Current error message per field key
///
/// Setting a key replaces its previous message; keys without an error are
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn set(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<FieldError> for FieldErrors {
    fn from(e: FieldError) -> Self {
        let mut errors = FieldErrors::default();
        errors.set(&e.field, e.message);
        errors
    }
}

// ============================================================================
// Form Field Validations
// ============================================================================

/// Validate a numeric form field and return its value.
///
/// Empty, non-numeric and non-finite strings fail. No range check is made:
/// physically implausible values are accepted.
pub fn validate_numeric_field(field: &str, value: &str) -> Result<f64, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, INVALID_NUMBER_MESSAGE));
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(FieldError::new(field, INVALID_NUMBER_MESSAGE)),
    }
}

/// Validate the pH selection
pub fn validate_ph_level(value: &str) -> Result<PhLevel, FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new("ph", MISSING_PH_MESSAGE));
    }
    PhLevel::parse(value).ok_or_else(|| FieldError::new("ph", INVALID_PH_MESSAGE))
}

/// Validate a chat message and return it trimmed
pub fn validate_chat_message(text: &str) -> Result<&str, FieldError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("text", EMPTY_MESSAGE_MESSAGE));
    }
    if trimmed.chars().count() as u64 > MAX_CHAT_MESSAGE_CHARS {
        return Err(FieldError::new(
            "text",
            format!("Message must be at most {} characters", MAX_CHAT_MESSAGE_CHARS),
        ));
    }
    Ok(trimmed)
}

/// Validate a city search and return it trimmed
pub fn validate_city(city: &str) -> Result<&str, FieldError> {
    let trimmed = city.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("city", MISSING_CITY_MESSAGE));
    }
    Ok(trimmed)
}

/// Validate GPS coordinates in decimal degrees
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), FieldError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(FieldError::new(
            "latitude",
            "Latitude must be between -90 and 90",
        ));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(FieldError::new(
            "longitude",
            "Longitude must be between -180 and 180",
        ));
    }
    Ok(())
}
