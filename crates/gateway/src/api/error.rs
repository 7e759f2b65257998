//! JSON error responses: `{"detail": "..."}` with a status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use sq_domain::error::Error;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    /// Map a failed session lookup. `requested` is the id the caller sent,
    /// if any.
    pub fn from_session_lookup(requested: Option<&str>, err: Error) -> Self {
        match err {
            Error::SessionNotFound(msg) => {
                match requested.map(str::trim).filter(|s| !s.is_empty()) {
                    Some(id) => Self::bad_request(format!(
                        "Unknown session '{id}'. Please upload a database first."
                    )),
                    None => Self::bad_request(msg),
                }
            }
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}
