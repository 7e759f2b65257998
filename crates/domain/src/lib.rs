//! Shared types for the SQL agent workspace: conversation messages and tool
//! calls, the per-run transcript, configuration, errors and trace events.

pub mod config;
pub mod error;
pub mod tool;
pub mod trace;
pub mod transcript;
