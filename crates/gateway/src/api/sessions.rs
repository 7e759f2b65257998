//! Session management endpoints.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

use super::error::ApiError;

/// `GET /sessions/`: live sessions, newest first.
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.sessions.list();
    Json(serde_json::json!({
        "count": sessions.len(),
        "sessions": sessions,
    }))
}

/// `DELETE /sessions/:id`: close a session. Its database copy is removed
/// once any in-flight run on it finishes.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.sessions.remove(&session_id) {
        Some(_) => Ok(Json(serde_json::json!({
            "status": "success",
            "session_id": session_id,
        }))),
        None => Err(ApiError::not_found(format!(
            "Unknown session '{session_id}'"
        ))),
    }
}
