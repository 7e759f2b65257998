use std::sync::Arc;

use sq_domain::config::Config;
use sq_sessions::SessionStore;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Live upload sessions, keyed by session id.
    pub sessions: Arc<SessionStore>,
    /// SHA-256 hash of the API token (read once at startup).
    /// `None` means no token is configured (dev mode, auth disabled).
    pub api_token_hash: Option<Vec<u8>>,
}
