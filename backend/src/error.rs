//! Error handling for the Farm Assist gateway
//!
//! Every failure ends up as a JSON error body; nothing here panics or takes
//! the server down.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{FieldError, FieldErrors};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation failed for {} field(s)", .fields.len())]
    FieldValidation { message: String, fields: FieldErrors },

    // Screen lifecycle errors
    #[error("A submission is already pending")]
    SubmissionPending,

    #[error("Screen session is closed")]
    ScreenClosed,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("No city matched the search")]
    CityNotFound,

    // External service errors
    #[error("External service error: {message}")]
    ExternalService {
        /// Message shown to the user
        message: String,
        /// What actually went wrong, for the log only
        detail: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn external(message: impl Into<String>, detail: impl ToString) -> Self {
        AppError::ExternalService {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    /// Message a screen displays for this failure
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::FieldValidation { message, .. } => message.clone(),
            AppError::SubmissionPending => "Please wait for the current request to finish".to_string(),
            AppError::ScreenClosed | AppError::Cancelled => "This screen has been closed".to_string(),
            AppError::NotFound(resource) => format!("{} not found", resource),
            AppError::CityNotFound => "City not found".to_string(),
            AppError::ExternalService { message, .. } => message.clone(),
            AppError::Configuration(_) | AppError::Storage(_) | AppError::Internal(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }
}

impl From<FieldError> for AppError {
    fn from(e: FieldError) -> Self {
        AppError::Validation {
            field: e.field,
            message: e.message,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::default();
        for (field, list) in errors.field_errors() {
            let message = list
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("Invalid {}", field));
            fields.set(field, message);
        }
        // The first failing field's text stands for the whole request
        let message = fields
            .iter()
            .next()
            .map(|(_, message)| message.to_string())
            .unwrap_or_else(|| "Invalid request".to_string());
        AppError::FieldValidation { message, fields }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } | AppError::FieldValidation { .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::SubmissionPending => (StatusCode::CONFLICT, "SUBMISSION_PENDING"),
            AppError::ScreenClosed => (StatusCode::GONE, "SCREEN_CLOSED"),
            AppError::Cancelled => (StatusCode::GONE, "CANCELLED"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::CityNotFound => (StatusCode::NOT_FOUND, "CITY_NOT_FOUND"),
            AppError::ExternalService { .. } => (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR"),
            AppError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR"),
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let detail = ErrorDetail {
            code: code.to_string(),
            message: self.user_message(),
            field: match &self {
                AppError::Validation { field, .. } => Some(field.clone()),
                _ => None,
            },
            fields: match &self {
                AppError::FieldValidation { fields, .. } => Some(fields.clone()),
                _ => None,
            },
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;
