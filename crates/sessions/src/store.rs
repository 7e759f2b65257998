//! Gateway-owned session store.
//!
//! A session pairs one uploaded database with the provider handle built
//! for it. Sessions live in memory only and are addressed by an opaque
//! UUID. The most recently created session doubles as the default for
//! requests that do not name one.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use sq_domain::config::SessionsConfig;
use sq_domain::error::{Error, Result};
use sq_domain::trace::TraceEvent;
use sq_providers::LlmProvider;
use sq_tools::SqliteDatabase;

use crate::workspace::SessionWorkspace;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct Session {
    pub id: String,
    pub file_name: String,
    pub database: SqliteDatabase,
    pub provider: Arc<dyn LlmProvider>,
    /// Table names seen at upload time.
    pub tables: Vec<String>,
    pub created_at: DateTime<Utc>,
    last_used: RwLock<DateTime<Utc>>,
    /// Owns the temp directory; dropped with the session.
    _workspace: Option<SessionWorkspace>,
}

impl Session {
    pub fn new(
        file_name: impl Into<String>,
        database: SqliteDatabase,
        provider: Arc<dyn LlmProvider>,
        tables: Vec<String>,
        workspace: Option<SessionWorkspace>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_name: file_name.into(),
            database,
            provider,
            tables,
            created_at: now,
            last_used: RwLock::new(now),
            _workspace: workspace,
        }
    }

    pub fn last_used(&self) -> DateTime<Utc> {
        *self.last_used.read()
    }

    pub fn touch(&self) {
        *self.last_used.write() = Utc::now();
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            file_name: self.file_name.clone(),
            tables: self.tables.clone(),
            provider: self.provider.provider_id().to_string(),
            model: self.provider.default_model().to_string(),
            created_at: self.created_at,
            last_used: self.last_used(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("file_name", &self.file_name)
            .field("database", &self.database.path())
            .field("provider", &self.provider.provider_id())
            .field("tables", &self.tables)
            .finish()
    }
}

/// Listing view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub file_name: String,
    pub tables: Vec<String>,
    pub provider: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, Arc<Session>>,
    latest: Option<String>,
}

impl Inner {
    /// Drop a session, handing the default over to the newest survivor.
    fn take(&mut self, session_id: &str) -> Option<Arc<Session>> {
        let removed = self.sessions.remove(session_id)?;
        if self.latest.as_deref() == Some(session_id) {
            self.latest = self
                .sessions
                .values()
                .max_by_key(|s| s.created_at)
                .map(|s| s.id.clone());
        }
        Some(removed)
    }
}

pub struct SessionStore {
    inner: RwLock<Inner>,
    max_sessions: usize,
    idle_ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(cfg: &SessionsConfig) -> Self {
        let idle_ttl = (cfg.idle_ttl_secs > 0)
            .then(|| Duration::seconds(cfg.idle_ttl_secs.min(u32::MAX as u64) as i64));
        Self {
            inner: RwLock::new(Inner::default()),
            max_sessions: cfg.max_sessions.max(1),
            idle_ttl,
        }
    }

    /// Register a session and make it the default. Evicts the least
    /// recently used session when the store is full.
    pub fn insert(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let mut evicted = Vec::new();
        {
            let mut inner = self.inner.write();
            while inner.sessions.len() >= self.max_sessions {
                let Some(oldest) = inner
                    .sessions
                    .values()
                    .min_by_key(|s| s.last_used())
                    .map(|s| s.id.clone())
                else {
                    break;
                };
                if let Some(s) = inner.sessions.remove(&oldest) {
                    evicted.push(s);
                }
            }
            inner.sessions.insert(session.id.clone(), session.clone());
            inner.latest = Some(session.id.clone());
        }

        for s in evicted {
            close_event(&s, "evicted");
        }
        TraceEvent::SessionCreated {
            session_id: session.id.clone(),
            tables: session.tables.len(),
        }
        .emit();

        session
    }

    /// Look up a session and mark it used.
    pub fn get(&self, session_id: &str) -> Option<Arc<Session>> {
        let session = self.inner.read().sessions.get(session_id).cloned()?;
        session.touch();
        Some(session)
    }

    /// The named session, or the latest upload when no id is given.
    pub fn resolve(&self, session_id: Option<&str>) -> Result<Arc<Session>> {
        match session_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => self
                .get(id)
                .ok_or_else(|| Error::SessionNotFound(id.to_string())),
            None => {
                let latest = self.inner.read().latest.clone();
                latest.and_then(|id| self.get(&id)).ok_or_else(|| {
                    Error::SessionNotFound(
                        "No database has been uploaded. Please upload a database first.".into(),
                    )
                })
            }
        }
    }

    /// Close a session. Its temp files go away once in-flight runs finish.
    pub fn remove(&self, session_id: &str) -> Option<Arc<Session>> {
        let removed = self.inner.write().take(session_id)?;
        close_event(&removed, "closed");
        Some(removed)
    }

    /// Sessions, newest first.
    pub fn list(&self) -> Vec<SessionSummary> {
        let mut out: Vec<SessionSummary> = self
            .inner
            .read()
            .sessions
            .values()
            .map(|s| s.summary())
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    pub fn len(&self) -> usize {
        self.inner.read().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close every session idle for longer than the configured TTL.
    /// Returns how many were removed.
    pub fn prune_idle(&self, now: DateTime<Utc>) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };
        let stale: Vec<String> = self
            .inner
            .read()
            .sessions
            .values()
            .filter(|s| now.signed_duration_since(s.last_used()) > ttl)
            .map(|s| s.id.clone())
            .collect();

        let mut removed = 0;
        for id in stale {
            let Some(session) = self.inner.write().take(&id) else {
                continue;
            };
            close_event(&session, "idle");
            removed += 1;
        }
        removed
    }
}

fn close_event(session: &Session, reason: &str) {
    TraceEvent::SessionClosed {
        session_id: session.id.clone(),
        reason: reason.into(),
    }
    .emit();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
