//! HTTP gateway, agent runtime and CLI for the SQL question-answering agent.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
