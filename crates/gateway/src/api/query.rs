use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::runtime::{self, RunStatus};
use crate::state::AppState;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    pub question: String,
    /// Session to ask against. Defaults to the latest upload.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub status: RunStatus,
    pub answer: String,
    pub run_id: uuid::Uuid,
    pub session_id: String,
}

/// `POST /query/`: answer a natural-language question about the database.
pub async fn query(
    State(state): State<AppState>,
    Json(body): Json<QueryBody>,
) -> Result<Json<QueryResponse>, ApiError> {
    let session = state
        .sessions
        .resolve(body.session_id.as_deref())
        .map_err(|e| ApiError::from_session_lookup(body.session_id.as_deref(), e))?;

    let outcome = runtime::run_query(&session, &body.question, &state.config)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %session.id, error = %e, "query run failed");
            ApiError::internal(format!("Error querying database: {e}"))
        })?;

    Ok(Json(QueryResponse {
        status: outcome.status,
        answer: outcome.answer,
        run_id: outcome.run_id,
        session_id: session.id.clone(),
    }))
}
