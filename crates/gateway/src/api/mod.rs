pub mod auth;
pub mod error;
pub mod query;
pub mod root;
pub mod schema;
pub mod sessions;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
///
/// Routes are split into **public** (no auth required) and **protected**
/// (gated behind the bearer-token middleware when `SQ_API_TOKEN` is set).
///
/// `state` is needed to wire up the auth middleware and body limit at
/// build time.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/", get(root::root));

    let protected = Router::new()
        .route("/upload-database/", post(upload::upload_database))
        .route("/query/", post(query::query))
        .route("/schema/", get(schema::get_schema))
        .route("/sessions/", get(sessions::list_sessions))
        .route("/sessions/:id", delete(sessions::delete_session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_token,
        ));

    public
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
}
