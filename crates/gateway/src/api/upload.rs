//! `POST /upload-database/`: stage an uploaded SQLite file, build the
//! provider for it and open a session.

use axum::extract::{Multipart, State};
use axum::response::Json;
use serde::Serialize;

use sq_domain::config::LlmConfig;
use sq_domain::error::Error;
use sq_sessions::{check_extension, Session, SessionWorkspace};
use sq_tools::{DatabaseOptions, SqliteDatabase};

use crate::state::AppState;

use super::error::ApiError;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub tables: Vec<String>,
    pub session_id: String,
}

pub async fn upload_database(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    // ── Read the form ────────────────────────────────────────────────
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut api_key: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("db_file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("reading db_file: {e}")))?;
                upload = Some((name, bytes.to_vec()));
            }
            Some("api_key") => {
                let key = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("reading api_key: {e}")))?;
                api_key = Some(key);
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::bad_request("Missing 'db_file' upload field"))?;
    if let Err(e) = check_extension(&file_name) {
        return Err(match e {
            Error::Upload(msg) => ApiError::bad_request(msg),
            other => ApiError::bad_request(other.to_string()),
        });
    }

    // ── Stage and open the database ──────────────────────────────────
    let options = DatabaseOptions::from(&state.config.database);
    let staged_name = file_name.clone();
    let (workspace, database, tables) = tokio::task::spawn_blocking(move || {
        let workspace = SessionWorkspace::stage(&staged_name, &bytes).map_err(|e| e.to_string())?;
        let database =
            SqliteDatabase::open(workspace.db_path(), options).map_err(|e| e.to_string())?;
        let tables = database.table_names().map_err(|e| e.to_string())?;
        Ok::<_, String>((workspace, database, tables))
    })
    .await
    .map_err(|e| ApiError::internal(format!("Error uploading database: {e}")))?
    .map_err(|e| {
        tracing::error!(file = %file_name, error = %e, "upload rejected");
        ApiError::internal(format!("Error uploading database: {e}"))
    })?;

    // ── Credential and provider ──────────────────────────────────────
    let llm = &state.config.llm;
    let key = sq_providers::util::resolve_api_key(&llm.provider.auth, api_key.as_deref())
        .map_err(|e| {
            tracing::warn!(error = %e, "no provider credential for upload");
            ApiError::bad_request(missing_key_detail(llm))
        })?;
    let provider = sq_providers::create_provider(llm, key)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let session = state.sessions.insert(Session::new(
        file_name,
        database,
        provider,
        tables.clone(),
        Some(workspace),
    ));
    tracing::info!(session_id = %session.id, tables = tables.len(), "database uploaded");

    Ok(Json(UploadResponse {
        status: "success",
        message: "Database uploaded and agent initialized",
        tables,
        session_id: session.id.clone(),
    }))
}

fn missing_key_detail(llm: &LlmConfig) -> String {
    let provider = llm.provider.id.to_uppercase();
    match &llm.provider.auth.env {
        Some(env) => format!(
            "No {provider} API key provided. Please either set the {env} environment variable \
             or provide it when initializing the agent."
        ),
        None => format!(
            "No {provider} API key provided. Please provide it when initializing the agent."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_detail_names_the_env_var() {
        assert_eq!(
            missing_key_detail(&LlmConfig::default()),
            "No GROQ API key provided. Please either set the GROQ_API_KEY environment variable \
             or provide it when initializing the agent."
        );
    }
}
