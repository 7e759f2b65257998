//! Session management for the SQL agent gateway.
//!
//! Each upload becomes a session: a private copy of the database in a
//! temp directory plus the provider handle built for it.

pub mod store;
pub mod workspace;

pub use store::{Session, SessionStore, SessionSummary};
pub use workspace::{check_extension, SessionWorkspace};
