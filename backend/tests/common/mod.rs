//! Fake third-party clients shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use farm_assist_backend::error::{AppError, AppResult};
use farm_assist_backend::external::{ChatApi, CropApi, WeatherApi};
use farm_assist_backend::services::ScreenContext;
use farm_assist_backend::storage::MemoryStore;
use farm_assist_backend::AppState;
use serde_json::{json, Value};
use shared::{Coordinates, SoilSample};
use tokio::sync::Notify;

/// Canned response plus a call counter; optionally blocks until released
pub struct Scripted {
    responses: Mutex<Vec<AppResult<Value>>>,
    fallback: Value,
    fail: bool,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl Scripted {
    pub fn ok(body: Value) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(Vec::new()),
            fallback: body,
            fail: false,
            calls: AtomicUsize::new(0),
            gate: None,
        })
    }

    /// Every call fails like a network error would
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(Vec::new()),
            fallback: Value::Null,
            fail: true,
            calls: AtomicUsize::new(0),
            gate: None,
        })
    }

    /// Calls wait until `gate.notify_one()` before answering
    pub fn gated(body: Value, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(Vec::new()),
            fallback: body,
            fail: false,
            calls: AtomicUsize::new(0),
            gate: Some(gate),
        })
    }

    /// Answers returned in order before falling back to the default body
    pub fn sequence(responses: Vec<AppResult<Value>>, fallback: Value) -> Arc<Self> {
        let mut responses = responses;
        responses.reverse();
        Arc::new(Self {
            responses: Mutex::new(responses),
            fallback,
            fail: false,
            calls: AtomicUsize::new(0),
            gate: None,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer(&self) -> AppResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(AppError::external("Request failed", "connection refused"));
        }
        let next = self.responses.lock().unwrap().pop();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

pub struct FakeChat(pub Arc<Scripted>);

#[async_trait]
impl ChatApi for FakeChat {
    async fn generate(&self, _prompt: &str) -> AppResult<Value> {
        self.0.answer().await
    }
}

pub struct FakeCrop(pub Arc<Scripted>);

#[async_trait]
impl CropApi for FakeCrop {
    async fn predict(&self, _sample: &SoilSample) -> AppResult<Value> {
        self.0.answer().await
    }
}

/// Geocoding and forecast scripted separately
pub struct FakeWeather {
    pub geocode: Arc<Scripted>,
    pub forecast: Arc<Scripted>,
}

#[async_trait]
impl WeatherApi for FakeWeather {
    async fn geocode(&self, _city: &str) -> AppResult<Value> {
        self.geocode.answer().await
    }

    async fn forecast(&self, _coordinates: Coordinates) -> AppResult<Value> {
        self.forecast.answer().await
    }
}

pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
}

pub fn crop_reply(crop: &str, modifications: Value) -> Value {
    json!({
        "recommended_crop": {
            "ml_prediction": crop,
            "parameter_modifications": modifications,
            "rule_suggestions": ["Use drip irrigation"]
        }
    })
}

pub fn geocode_reply(name: &str) -> Value {
    json!([{ "name": name, "lat": 18.52, "lon": 73.86, "country": "IN" }])
}

/// `days` days of three-hourly entries starting 2024-06-01 00:00
pub fn forecast_reply(days: u32) -> Value {
    let mut list = Vec::new();
    for day in 0..days {
        for step in 0..8u32 {
            let hour = step * 3;
            list.push(json!({
                "dt": 1_717_200_000i64 + (day * 86_400 + hour * 3_600) as i64,
                "dt_txt": format!("2024-06-{:02} {:02}:00:00", day + 1, hour),
                "main": { "temp": 20.0 + hour as f64, "feels_like": 21.0, "humidity": 60 },
                "weather": [{ "description": "light rain", "icon": "10d" }],
                "wind": { "speed": 3.5 }
            }));
        }
    }
    json!({ "list": list, "city": { "name": "Pune", "timezone": 0 } })
}

/// Application state wired to the given fakes
pub fn test_state(chat: Arc<Scripted>, crop: Arc<Scripted>, weather: FakeWeather) -> AppState {
    AppState::new(
        ScreenContext::default(),
        Arc::new(FakeChat(chat)),
        Arc::new(FakeCrop(crop)),
        Arc::new(weather),
        Arc::new(MemoryStore::new()),
    )
}
