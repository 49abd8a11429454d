//! WebAssembly module for the Farm Assist mobile front end
//!
//! Runs the same rules as the gateway on the device:
//! - Soil form, city and chat input validation
//! - Chat reply normalization
//! - Recommendation and forecast normalization
//! - Theme palette lookup

use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("farm-assist-wasm ready"));
}

fn parse(json: &str) -> Result<Value, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid JSON: {}", e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Failed to encode result: {}", e))
}

fn js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

// ============================================================================
// Validation
// ============================================================================

fn check_numeric(field: &str, value: &str) -> Result<f64, String> {
    validate_numeric_field(field, value).map_err(|e| e.message)
}

/// Validate a numeric soil field; the error is the message to show under it
#[wasm_bindgen]
pub fn validate_numeric_input(field: &str, value: &str) -> Result<f64, JsValue> {
    check_numeric(field, value).map_err(js_error)
}

/// Validate a pH selection and return its value
#[wasm_bindgen]
pub fn validate_ph_selection(value: &str) -> Result<f64, JsValue> {
    validate_ph_level(value)
        .map(|ph| ph.value())
        .map_err(|e| js_error(e.message))
}

/// Error message for a city search box, `None` when the input is usable
#[wasm_bindgen]
pub fn city_input_error(city: &str) -> Option<String> {
    validate_city(city).err().map(|e| e.message)
}

/// Error message for a chat input box, `None` when the input is usable
#[wasm_bindgen]
pub fn chat_input_error(text: &str) -> Option<String> {
    validate_chat_message(text).err().map(|e| e.message)
}

/// The selectable pH values, "5.0" through "7.0"
#[wasm_bindgen]
pub fn ph_level_options() -> js_sys::Array {
    PhLevel::options()
        .into_iter()
        .map(|option| JsValue::from_str(&option))
        .collect()
}

// ============================================================================
// Normalization
// ============================================================================

fn chat_reply(response_json: &str, max_words: usize) -> Result<String, String> {
    Ok(shared::normalize_chat_reply(&parse(response_json)?, max_words))
}

fn recommendation_view(response_json: &str) -> Result<String, String> {
    let result = shared::normalize_recommendation(&parse(response_json)?).map_err(|e| e.to_string())?;
    to_json(&RecommendationView::from(&result))
}

fn daily_forecast(response_json: &str, max_days: usize) -> Result<String, String> {
    let entries = shared::normalize_forecast(&parse(response_json)?, max_days).map_err(|e| e.to_string())?;
    to_json(&entries)
}

/// Assistant text from a raw generate-content response
#[wasm_bindgen]
pub fn normalize_chat_reply(response_json: &str, max_words: usize) -> Result<String, JsValue> {
    chat_reply(response_json, max_words).map_err(js_error)
}

/// Cut a reply to `max_words` words
#[wasm_bindgen]
pub fn truncate_reply(text: &str, max_words: usize) -> String {
    shared::trim_newlines(&shared::truncate_words(text, max_words)).to_string()
}

/// Display form of a raw prediction response, as JSON
#[wasm_bindgen]
pub fn normalize_recommendation(response_json: &str) -> Result<String, JsValue> {
    recommendation_view(response_json).map_err(js_error)
}

/// Noon entries of a raw forecast response, as a JSON array
#[wasm_bindgen]
pub fn select_daily_forecast(response_json: &str, max_days: usize) -> Result<String, JsValue> {
    daily_forecast(response_json, max_days).map_err(js_error)
}

/// Icon name for an OpenWeatherMap icon code
#[wasm_bindgen]
pub fn weather_icon(code: &str) -> String {
    shared::weather_icon_name(code).to_string()
}

// ============================================================================
// Theme
// ============================================================================

fn palette(mode: &str) -> Result<String, String> {
    let mode: ThemeMode = mode.parse()?;
    to_json(&mode.palette())
}

/// Colors for "light" or "dark", as JSON
#[wasm_bindgen]
pub fn theme_palette(mode: &str) -> Result<String, JsValue> {
    palette(mode).map_err(js_error)
}

/// The other theme mode
#[wasm_bindgen]
pub fn toggle_theme(mode: &str) -> Result<String, JsValue> {
    mode.parse::<ThemeMode>()
        .map(|m| m.toggled().code().to_string())
        .map_err(js_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_input() {
        assert_eq!(check_numeric("N", " 90 "), Ok(90.0));
        assert_eq!(
            check_numeric("N", "ninety"),
            Err("Please enter a valid number".to_string())
        );
    }

    #[test]
    fn test_input_errors() {
        assert_eq!(city_input_error("  "), Some("Please enter a city name".to_string()));
        assert_eq!(city_input_error("Pune"), None);
        assert!(chat_input_error("").is_some());
        assert_eq!(chat_input_error("hello"), None);
    }

    #[test]
    fn test_chat_reply_fallback_and_truncation() {
        assert_eq!(chat_reply("{}", 50).unwrap(), "No response from AI");

        let long = vec!["grow"; 60].join(" ");
        let body = json!({ "candidates": [{ "content": { "parts": [{ "text": long }] } }] });
        let reply = chat_reply(&body.to_string(), 50).unwrap();
        assert!(reply.ends_with("..."));
        assert_eq!(reply.trim_end_matches("...").split_whitespace().count(), 50);

        assert!(chat_reply("not json", 50).is_err());
    }

    #[test]
    fn test_truncate_reply_trims_newlines() {
        assert_eq!(truncate_reply("\nWater early.\n\n", 50), "Water early.");
    }

    #[test]
    fn test_recommendation_view() {
        let body = json!({
            "recommended_crop": {
                "ml_prediction": "maize",
                "parameter_modifications": "No major adjustments needed"
            }
        });
        let view: Value = serde_json::from_str(&recommendation_view(&body.to_string()).unwrap()).unwrap();
        assert_eq!(view["predicted_crop"], "maize");
        assert_eq!(view["adjustment_lines"][0], NO_ADJUSTMENTS_MESSAGE);
    }

    #[test]
    fn test_daily_forecast() {
        let list: Vec<Value> = (0..16)
            .map(|i| {
                json!({
                    "dt_txt": format!("2024-06-{:02} {:02}:00:00", i / 8 + 1, (i % 8) * 3),
                    "main": { "temp": 25.0, "feels_like": 26.0, "humidity": 70 },
                    "weather": [{ "description": "clear sky", "icon": "01d" }],
                    "wind": { "speed": 2.0 }
                })
            })
            .collect();
        let body = json!({ "list": list, "city": { "name": "Pune", "timezone": 19800 } });

        let entries: Vec<Value> =
            serde_json::from_str(&daily_forecast(&body.to_string(), 5).unwrap()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["icon_name"], "sunny");
    }

    #[test]
    fn test_weather_icon() {
        assert_eq!(weather_icon("11n"), "thunderstorm");
        assert_eq!(weather_icon("??"), "partly-sunny");
    }

    #[test]
    fn test_palette() {
        assert!(palette("dark").is_ok());
        assert!(palette("sepia").is_err());
    }
}
