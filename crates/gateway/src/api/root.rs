use axum::response::{IntoResponse, Json};

/// `GET /`: static capability listing.
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "online",
        "message": "SQL Database Query API is running. Upload a SQLite database, then ask questions about it.",
        "endpoints": {
            "/upload-database/": "POST: Upload a SQLite database file",
            "/query/": "POST: Ask a question about the database",
            "/schema/": "GET: Get the schema information of the uploaded database",
            "/sessions/": "GET: List active sessions",
            "/sessions/{session_id}": "DELETE: Close a session and remove its database copy"
        }
    }))
}
