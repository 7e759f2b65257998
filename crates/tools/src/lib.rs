//! SQLite access for the SQL agent.
//!
//! - `database`: schema inspector and query executor
//! - `snapshot`: owned values, rows, schema snapshots
//! - `render`: the text each agent tool returns to the model

pub mod database;
pub mod render;
pub mod snapshot;

pub use database::{DatabaseError, DatabaseOptions, SqliteDatabase};
pub use snapshot::{CellValue, ColumnInfo, QueryResult, Row, SchemaSnapshot, TableInfo};
