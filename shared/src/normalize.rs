//! Normalizers for third-party API payloads
//!
//! Each function maps a partially-untrusted JSON response into a bounded
//! display model. Missing fields fall back to fixed values; only a payload
//! whose overall shape is wrong is reported as an error.

use chrono::{DateTime, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::{
    ForecastEntry, Location, ParameterAdjustments, RecommendationResult,
};

/// Reply shown when the chat service returns no text
pub const NO_RESPONSE_FALLBACK: &str = "No response from AI";

/// Word cap applied to chat replies
pub const MAX_REPLY_WORDS: usize = 50;

/// Marker appended to a truncated reply
pub const ELLIPSIS: &str = "...";

/// Days kept from the multi-day forecast
pub const MAX_FORECAST_DAYS: usize = 5;

/// Local hour used as the daily sample
pub const NOON_HOUR: u32 = 12;

/// Label used when the prediction service names no crop
pub const UNKNOWN_CROP: &str = "Unknown";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("response is missing `{0}`")]
    MissingField(&'static str),

    #[error("malformed response: {0}")]
    Malformed(String),
}

// ============================================================================
// Chat
// ============================================================================

/// Extract the assistant reply from a generate-content response
pub fn normalize_chat_reply(response: &Value, max_words: usize) -> String {
    let text = response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or(NO_RESPONSE_FALLBACK);

    trim_newlines(&truncate_words(text, max_words)).to_string()
}

/// Cut `text` to its first `max_words` whitespace-separated words.
///
/// Text within the cap comes back unchanged; longer text is re-joined with
/// single spaces and gets [`ELLIPSIS`] appended.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    if text.split_whitespace().count() <= max_words {
        return text.to_string();
    }
    let mut truncated = text
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ");
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Strip leading and trailing newlines, leaving other whitespace alone
pub fn trim_newlines(text: &str) -> &str {
    text.trim_matches('\n')
}

// ============================================================================
// Crop Recommendation
// ============================================================================

#[derive(Debug, Deserialize)]
struct RecommendationPayload {
    recommended_crop: Option<RecommendedCropPayload>,
}

#[derive(Debug, Deserialize)]
struct RecommendedCropPayload {
    ml_prediction: Option<String>,
    parameter_modifications: Option<ParameterAdjustments>,
    #[serde(default)]
    rule_suggestions: Vec<String>,
}

/// Map a prediction response into a recommendation
pub fn normalize_recommendation(response: &Value) -> Result<RecommendationResult, NormalizeError> {
    let payload = RecommendationPayload::deserialize(response)
        .map_err(|e| NormalizeError::Malformed(e.to_string()))?;
    let crop = payload
        .recommended_crop
        .ok_or(NormalizeError::MissingField("recommended_crop"))?;

    Ok(RecommendationResult {
        predicted_crop: crop
            .ml_prediction
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_CROP.to_string()),
        adjustments: crop
            .parameter_modifications
            .unwrap_or_else(|| ParameterAdjustments::Suggested(BTreeMap::new())),
        rule_suggestions: crop.rule_suggestions,
    })
}

// ============================================================================
// Weather
// ============================================================================

/// OpenWeatherMap 5 day / 3 hour forecast response
#[derive(Debug, Deserialize)]
pub struct OwmForecastResponse {
    #[serde(default)]
    pub list: Vec<OwmForecastItem>,
    pub city: Option<OwmCity>,
}

#[derive(Debug, Deserialize)]
pub struct OwmCity {
    pub name: Option<String>,
    /// Shift from UTC in seconds
    #[serde(default)]
    pub timezone: i32,
}

#[derive(Debug, Deserialize)]
pub struct OwmForecastItem {
    pub dt: Option<i64>,
    pub dt_txt: Option<String>,
    #[serde(default)]
    pub main: OwmMain,
    #[serde(default)]
    pub weather: Vec<OwmWeather>,
    #[serde(default)]
    pub wind: OwmWind,
}

#[derive(Debug, Default, Deserialize)]
pub struct OwmMain {
    #[serde(default)]
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub humidity: i32,
}

#[derive(Debug, Deserialize)]
pub struct OwmWeather {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OwmWind {
    #[serde(default)]
    pub speed: f64,
}

/// OpenWeatherMap direct geocoding entry
#[derive(Debug, Deserialize)]
struct OwmGeocodeEntry {
    name: String,
    lat: f64,
    lon: f64,
}

impl OwmForecastItem {
    /// Wall-clock time of the sample at the forecast location.
    ///
    /// `dt_txt` is used as written; without it the unix `dt` is shifted by
    /// the city's offset.
    pub fn local_time(&self, timezone_offset_seconds: i32) -> Option<NaiveDateTime> {
        if let Some(text) = &self.dt_txt {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
                return Some(parsed);
            }
        }
        let dt = self.dt?;
        let local = dt.checked_add(i64::from(timezone_offset_seconds))?;
        DateTime::from_timestamp(local, 0).map(|d| d.naive_utc())
    }

    fn to_entry(&self, local_time: NaiveDateTime) -> ForecastEntry {
        let weather = self.weather.first();
        let icon = weather.map(|w| w.icon.clone()).unwrap_or_default();
        ForecastEntry {
            date: local_time.date(),
            local_time,
            temperature_celsius: decimal(self.main.temp),
            feels_like_celsius: decimal(self.main.feels_like),
            humidity_percent: self.main.humidity,
            wind_speed_mps: decimal(self.wind.speed),
            description: weather.map(|w| w.description.clone()).unwrap_or_default(),
            icon_name: weather_icon_name(&icon).to_string(),
            condition_icon: icon,
        }
    }
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(2))
        .unwrap_or_default()
}

/// Keep the noon samples, at most `max_days` of them, in list order
pub fn select_daily_forecast(
    items: &[OwmForecastItem],
    timezone_offset_seconds: i32,
    max_days: usize,
) -> Vec<ForecastEntry> {
    items
        .iter()
        .filter_map(|item| {
            item.local_time(timezone_offset_seconds)
                .filter(|t| t.hour() == NOON_HOUR)
                .map(|t| item.to_entry(t))
        })
        .take(max_days)
        .collect()
}

/// Map a forecast response into the daily entries shown on screen
pub fn normalize_forecast(response: &Value, max_days: usize) -> Result<Vec<ForecastEntry>, NormalizeError> {
    let payload = OwmForecastResponse::deserialize(response)
        .map_err(|e| NormalizeError::Malformed(e.to_string()))?;
    let offset = payload.city.as_ref().map(|c| c.timezone).unwrap_or(0);
    Ok(select_daily_forecast(&payload.list, offset, max_days))
}

/// First match of a geocoding lookup, `None` when the city is unknown
pub fn normalize_geocode(response: &Value) -> Result<Option<Location>, NormalizeError> {
    let entries = Vec::<OwmGeocodeEntry>::deserialize(response)
        .map_err(|e| NormalizeError::Malformed(e.to_string()))?;
    Ok(entries.into_iter().next().map(|e| Location {
        name: e.name,
        latitude: e.lat,
        longitude: e.lon,
    }))
}

/// Icon the front end shows for an OpenWeatherMap icon code
pub fn weather_icon_name(code: &str) -> &'static str {
    match code {
        "01d" => "sunny",
        "01n" => "moon",
        "02d" => "partly-sunny",
        "02n" => "cloudy-night",
        "03d" | "03n" | "04d" | "04n" => "cloudy",
        "09d" | "09n" | "10d" | "10n" => "rainy",
        "11d" | "11n" => "thunderstorm",
        "13d" | "13n" => "snow",
        "50d" | "50n" => "water",
        _ => "partly-sunny",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NO_ADJUSTMENTS_MESSAGE;
    use proptest::prelude::*;
    use serde_json::json;

    fn gemini_response(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }], "role": "model" },
                "finishReason": "STOP"
            }]
        })
    }

    fn words(n: usize) -> String {
        (1..=n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    /// Six days of three-hourly samples starting at midnight
    fn six_day_forecast() -> Value {
        let list: Vec<Value> = (0..6)
            .flat_map(|day| {
                (0..8).map(move |slot| {
                    json!({
                        "dt": 1_717_372_800 + day * 86_400 + slot * 10_800,
                        "dt_txt": format!("2024-06-{:02} {:02}:00:00", 3 + day, slot * 3),
                        "main": { "temp": 20.0 + slot as f64, "feels_like": 19.5, "humidity": 60 },
                        "weather": [{ "description": "light rain", "icon": "10d" }],
                        "wind": { "speed": 3.4 }
                    })
                })
            })
            .collect();
        json!({ "list": list, "city": { "name": "Pune", "timezone": 19800 } })
    }

    #[test]
    fn test_chat_reply_extracted() {
        let reply = normalize_chat_reply(&gemini_response("Sow wheat in November."), MAX_REPLY_WORDS);
        assert_eq!(reply, "Sow wheat in November.");
    }

    #[test]
    fn test_chat_reply_fallback_when_missing() {
        assert_eq!(normalize_chat_reply(&json!({}), MAX_REPLY_WORDS), NO_RESPONSE_FALLBACK);
        assert_eq!(
            normalize_chat_reply(&json!({ "candidates": [] }), MAX_REPLY_WORDS),
            NO_RESPONSE_FALLBACK
        );
        assert_eq!(
            normalize_chat_reply(&gemini_response(""), MAX_REPLY_WORDS),
            NO_RESPONSE_FALLBACK
        );
    }

    #[test]
    fn test_chat_reply_truncated_to_fifty_words() {
        let reply = normalize_chat_reply(&gemini_response(&words(80)), MAX_REPLY_WORDS);
        assert!(reply.ends_with(ELLIPSIS));
        let body = reply.trim_end_matches(ELLIPSIS);
        assert_eq!(body.split(' ').count(), 50);
        assert_eq!(body, words(50));
    }

    #[test]
    fn test_chat_reply_within_cap_untouched() {
        let text = "Use  drip\tirrigation for\n cotton.";
        assert_eq!(normalize_chat_reply(&gemini_response(text), MAX_REPLY_WORDS), text);

        let exactly = words(50);
        assert_eq!(normalize_chat_reply(&gemini_response(&exactly), MAX_REPLY_WORDS), exactly);
    }

    #[test]
    fn test_chat_reply_newlines_trimmed() {
        let reply = normalize_chat_reply(&gemini_response("\n\nRotate crops.\n"), MAX_REPLY_WORDS);
        assert_eq!(reply, "Rotate crops.");
    }

    #[test]
    fn test_recommendation_with_map() {
        let response = json!({
            "recommended_crop": {
                "ml_prediction": "rice",
                "parameter_modifications": { "N": "Increase", "rainfall": "OK" },
                "rule_suggestions": ["jute", "maize"]
            }
        });
        let result = normalize_recommendation(&response).unwrap();
        assert_eq!(result.predicted_crop, "rice");
        assert_eq!(result.rule_suggestions, vec!["jute", "maize"]);
        assert_eq!(result.adjustments.display_lines(), vec!["N: Increase", "rainfall: OK"]);
    }

    #[test]
    fn test_recommendation_with_sentinel() {
        let response = json!({
            "recommended_crop": {
                "ml_prediction": "maize",
                "parameter_modifications": "No major adjustments needed",
                "rule_suggestions": []
            }
        });
        let result = normalize_recommendation(&response).unwrap();
        assert!(result.adjustments.is_none_needed());
        assert_eq!(result.adjustments.display_lines(), vec![NO_ADJUSTMENTS_MESSAGE]);
    }

    #[test]
    fn test_recommendation_fallbacks() {
        let result = normalize_recommendation(&json!({ "recommended_crop": {} })).unwrap();
        assert_eq!(result.predicted_crop, UNKNOWN_CROP);
        assert!(result.rule_suggestions.is_empty());
        assert!(result.adjustments.display_lines().is_empty());
    }

    #[test]
    fn test_recommendation_missing_root() {
        assert_eq!(
            normalize_recommendation(&json!({ "detail": "error" })).unwrap_err(),
            NormalizeError::MissingField("recommended_crop")
        );
    }

    #[test]
    fn test_forecast_keeps_noon_entries_capped_at_five() {
        let entries = normalize_forecast(&six_day_forecast(), MAX_FORECAST_DAYS).unwrap();
        assert_eq!(entries.len(), 5);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.local_time.hour(), 12);
            assert_eq!(entry.date.to_string(), format!("2024-06-{:02}", 3 + i));
        }
        assert_eq!(entries[0].temperature_celsius, Decimal::new(24, 0));
        assert_eq!(entries[0].icon_name, "rainy");
    }

    #[test]
    fn test_forecast_keeps_list_order() {
        let mut forecast = six_day_forecast();
        let list = forecast["list"].as_array_mut().unwrap();
        list.reverse();
        let entries = normalize_forecast(&forecast, MAX_FORECAST_DAYS).unwrap();
        assert_eq!(entries[0].date.to_string(), "2024-06-08");
        assert_eq!(entries[4].date.to_string(), "2024-06-04");
    }

    #[test]
    fn test_forecast_without_dt_txt_uses_offset() {
        // 06:30 UTC is noon in UTC+05:30
        let forecast = json!({
            "list": [
                { "dt": 1_717_396_200, "main": { "temp": 30.0 } },
                { "dt": 1_717_407_000, "main": { "temp": 31.0 } }
            ],
            "city": { "timezone": 19800 }
        });
        let entries = normalize_forecast(&forecast, MAX_FORECAST_DAYS).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].temperature_celsius, Decimal::new(30, 0));
    }

    #[test]
    fn test_forecast_out_of_range_timestamp_skipped() {
        let forecast = json!({
            "list": [
                { "dt": i64::MAX, "main": { "temp": 30.0 } },
                { "dt": 1_717_396_200, "main": { "temp": 31.0 } }
            ],
            "city": { "timezone": 19800 }
        });
        let entries = normalize_forecast(&forecast, MAX_FORECAST_DAYS).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].temperature_celsius, Decimal::new(31, 0));
    }

    #[test]
    fn test_forecast_empty_list() {
        assert!(normalize_forecast(&json!({}), MAX_FORECAST_DAYS).unwrap().is_empty());
        assert!(normalize_forecast(&json!({ "list": "nope" }), MAX_FORECAST_DAYS).is_err());
    }

    #[test]
    fn test_geocode() {
        let found = normalize_geocode(&json!([
            { "name": "Nashik", "lat": 19.99, "lon": 73.79, "country": "IN" },
            { "name": "Other", "lat": 0.0, "lon": 0.0 }
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(found.name, "Nashik");
        assert_eq!(normalize_geocode(&json!([])).unwrap(), None);
    }

    #[test]
    fn test_weather_icon_names() {
        assert_eq!(weather_icon_name("01d"), "sunny");
        assert_eq!(weather_icon_name("02n"), "cloudy-night");
        assert_eq!(weather_icon_name("11n"), "thunderstorm");
        assert_eq!(weather_icon_name("zz"), "partly-sunny");
    }

    proptest! {
        /// Truncation never keeps more than the cap and always keeps the prefix
        #[test]
        fn prop_truncate_words_bounded(n in 0usize..200, cap in 1usize..80) {
            let text = words(n);
            let out = truncate_words(&text, cap);
            if n <= cap {
                prop_assert_eq!(out, text);
            } else {
                prop_assert!(out.ends_with(ELLIPSIS));
                let kept = out.trim_end_matches(ELLIPSIS).split_whitespace().count();
                prop_assert_eq!(kept, cap);
                prop_assert!(text.starts_with(out.trim_end_matches(ELLIPSIS)));
            }
        }
    }
}
