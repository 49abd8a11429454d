//! HTTP handlers for the agriculture chat screen

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::ChatMessageInput;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::services::{ChatSession, ChatSnapshot};
use crate::AppState;

/// Open a chat screen
pub async fn open_chat_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<ChatSnapshot>) {
    let session = ChatSession::new(&state.context, state.chat_api.clone());
    let session = state.chat_sessions.insert(session).await;
    (StatusCode::CREATED, Json(session.snapshot()))
}

/// Get the transcript of a chat screen
pub async fn get_chat_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<ChatSnapshot>> {
    let session = state.chat_sessions.get(session_id).await?;
    Ok(Json(session.snapshot()))
}

/// Send one message
pub async fn send_chat_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<ChatMessageInput>,
) -> AppResult<Json<ChatSnapshot>> {
    input.validate()?;
    let session = state.chat_sessions.get(session_id).await?;
    let snapshot = session.send(&input.text).await?;
    Ok(Json(snapshot))
}

/// Close a chat screen, dropping any pending reply
pub async fn close_chat_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.chat_sessions.close(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
