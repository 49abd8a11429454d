//! HTTP handlers for the crop recommendation screen

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::SoilField;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::{RecommendationSession, RecommendationSnapshot};
use crate::AppState;

/// Input for editing one form field
#[derive(Debug, Deserialize)]
pub struct FieldValueInput {
    pub value: String,
}

/// Open a recommendation form
pub async fn open_recommendation_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<RecommendationSnapshot>) {
    let session = RecommendationSession::new(&state.context, state.crop_api.clone());
    let session = state.recommendation_sessions.insert(session).await;
    (StatusCode::CREATED, Json(session.snapshot()))
}

/// Get the form, its errors and the last result
pub async fn get_recommendation_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<RecommendationSnapshot>> {
    let session = state.recommendation_sessions.get(session_id).await?;
    Ok(Json(session.snapshot()))
}

/// Edit one form field
pub async fn set_recommendation_field(
    State(state): State<AppState>,
    Path((session_id, field)): Path<(Uuid, String)>,
    Json(input): Json<FieldValueInput>,
) -> AppResult<Json<RecommendationSnapshot>> {
    let field = SoilField::from_key(&field).ok_or_else(|| AppError::Validation {
        field: field.clone(),
        message: format!("Unknown field: {}", field),
    })?;
    let session = state.recommendation_sessions.get(session_id).await?;
    let snapshot = session.set_field(field, &input.value)?;
    Ok(Json(snapshot))
}

/// Validate the form and fetch a recommendation
pub async fn submit_recommendation(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<RecommendationSnapshot>> {
    let session = state.recommendation_sessions.get(session_id).await?;
    let snapshot = session.submit().await?;
    Ok(Json(snapshot))
}

/// Close a recommendation form
pub async fn close_recommendation_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.recommendation_sessions.close(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
