use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::voice::ListenError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Model-service failures never reach this type: they are absorbed into
/// fallback values at the call site.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Interview store is not configured")]
    StoreUnavailable,

    #[error("Failed to save interview: {0}")]
    SaveFailed(String),

    #[error("Voice service is not configured")]
    VoiceUnavailable,

    #[error("Voice error: {0}")]
    Voice(String),

    #[error(transparent)]
    Listen(#[from] ListenError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::StoreUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "Interview store is not configured".to_string(),
            ),
            AppError::SaveFailed(msg) => {
                tracing::error!("Save failed: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SAVE_FAILED",
                    "Failed to save interview".to_string(),
                )
            }
            AppError::VoiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "VOICE_UNAVAILABLE",
                "Voice service is not configured".to_string(),
            ),
            AppError::Voice(msg) => {
                tracing::warn!("Voice error: {msg}");
                (StatusCode::BAD_GATEWAY, "VOICE_ERROR", msg.clone())
            }
            AppError::Listen(e) => {
                tracing::warn!("Voice answer not captured: {e}");
                let (status, code) = match e {
                    ListenError::NoSpeech => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "NO_SPEECH_DETECTED")
                    }
                    ListenError::NotUnderstood => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "SPEECH_NOT_UNDERSTOOD")
                    }
                    ListenError::InvalidAudio(_) => {
                        (StatusCode::BAD_REQUEST, "INVALID_AUDIO")
                    }
                    ListenError::Service(_) => (StatusCode::BAD_GATEWAY, "TRANSCRIPTION_FAILED"),
                };
                (status, code, e.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
