//! HTTP handlers for the weather forecast screen

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::{WeatherSession, WeatherSnapshot};
use crate::AppState;

/// Input for a city search
#[derive(Debug, Deserialize)]
pub struct CitySearchInput {
    pub city: String,
}

/// Input for a device-location lookup
#[derive(Debug, Deserialize)]
pub struct LocateInput {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
}

/// Open a weather screen
pub async fn open_weather_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<WeatherSnapshot>) {
    let session = WeatherSession::new(&state.context, state.weather_api.clone());
    let session = state.weather_sessions.insert(session).await;
    (StatusCode::CREATED, Json(session.snapshot()))
}

/// Get the current report
pub async fn get_weather_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<WeatherSnapshot>> {
    let session = state.weather_sessions.get(session_id).await?;
    Ok(Json(session.snapshot()))
}

/// Search the forecast for a city
pub async fn search_weather_city(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<CitySearchInput>,
) -> AppResult<Json<WeatherSnapshot>> {
    let session = state.weather_sessions.get(session_id).await?;
    let snapshot = session.search_city(&input.city).await?;
    Ok(Json(snapshot))
}

/// Fetch the forecast for the device position
pub async fn locate_weather(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<LocateInput>,
) -> AppResult<Json<WeatherSnapshot>> {
    let session = state.weather_sessions.get(session_id).await?;
    let snapshot = session
        .use_coordinates(input.latitude, input.longitude, input.name)
        .await?;
    Ok(Json(snapshot))
}

/// Close a weather screen
pub async fn close_weather_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.weather_sessions.close(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
