use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version plus which optional collaborators are enabled.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "interviewer",
        "model": if state.model_enabled() { "enabled" } else { "disabled" },
        "voice": if state.voice.is_some() { "enabled" } else { "disabled" },
        "store": if state.store.is_enabled() { "enabled" } else { "disabled" },
        "active_sessions": state.sessions.len().await,
        "total_questions": state.config.total_questions,
    }))
}
