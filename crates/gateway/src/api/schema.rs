use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use sq_tools::SchemaSnapshot;

use crate::state::AppState;

use super::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct SchemaParams {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub status: &'static str,
    pub schema: SchemaSnapshot,
}

/// `GET /schema/`: tables, columns and sample rows of a session's database.
pub async fn get_schema(
    State(state): State<AppState>,
    Query(params): Query<SchemaParams>,
) -> Result<Json<SchemaResponse>, ApiError> {
    let session = state
        .sessions
        .resolve(params.session_id.as_deref())
        .map_err(|e| ApiError::from_session_lookup(params.session_id.as_deref(), e))?;

    let database = session.database.clone();
    let schema = tokio::task::spawn_blocking(move || database.schema())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .map_err(|e| {
            tracing::warn!(session_id = %session.id, error = %e, "schema read failed");
            ApiError::internal(e.to_string())
        })?;

    Ok(Json(SchemaResponse {
        status: "success",
        schema,
    }))
}
