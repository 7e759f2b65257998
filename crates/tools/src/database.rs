//! Schema inspector and query executor over a SQLite file.
//!
//! Every call opens its own connection and drops it before returning, so
//! nothing is held between agent steps. Inspection connections are always
//! read-only; the executor is read-write unless `read_only` is set.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rusqlite::{Connection, OpenFlags};
use sq_domain::config::DatabaseConfig;
use sq_domain::trace::TraceEvent;

use crate::snapshot::{CellValue, ColumnInfo, QueryResult, Row, SchemaSnapshot, TableInfo};

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("database file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("file is not a readable SQLite database: {0}")]
    Unreadable(String),
}

#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub sample_rows: usize,
    pub read_only: bool,
    pub busy_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self::from(&DatabaseConfig::default())
    }
}

impl From<&DatabaseConfig> for DatabaseOptions {
    fn from(cfg: &DatabaseConfig) -> Self {
        Self {
            sample_rows: cfg.sample_rows,
            read_only: cfg.read_only,
            busy_timeout: Duration::from_millis(cfg.busy_timeout_ms),
        }
    }
}

/// Handle to one SQLite file. Cheap to clone; holds no connection.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    path: PathBuf,
    options: DatabaseOptions,
}

impl SqliteDatabase {
    /// Open a handle after checking that the file exists and SQLite can
    /// read its schema.
    pub fn open(path: impl AsRef<Path>, options: DatabaseOptions) -> Result<Self, DatabaseError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(DatabaseError::NotFound(path));
        }
        let db = Self { path, options };

        let conn = db.connect(true)?;
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |r| r.get::<_, i64>(0))
            .map_err(|e| DatabaseError::Unreadable(e.to_string()))?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self, read_only: bool) -> Result<Connection, DatabaseError> {
        let mode = if read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        let conn = Connection::open_with_flags(&self.path, mode | OpenFlags::SQLITE_OPEN_NO_MUTEX)?;
        conn.busy_timeout(self.options.busy_timeout)?;
        Ok(conn)
    }

    // ── Schema inspector ───────────────────────────────────────────

    /// User tables, ordered by name. SQLite's internal tables are skipped.
    pub fn table_names(&self) -> Result<Vec<String>, DatabaseError> {
        let conn = self.connect(true)?;
        table_names(&conn)
    }

    /// Columns and a bounded row sample for every table.
    pub fn schema(&self) -> Result<SchemaSnapshot, DatabaseError> {
        let conn = self.connect(true)?;
        let mut tables = BTreeMap::new();

        for table in table_names(&conn)? {
            let columns = match columns(&conn, &table) {
                Ok(cols) => cols,
                Err(e) => {
                    tracing::warn!(table = %table, error = %e, "could not inspect table");
                    Vec::new()
                }
            };
            let sample_rows = match sample(&conn, &table, self.options.sample_rows) {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(table = %table, error = %e, "could not sample table");
                    Vec::new()
                }
            };
            tables.insert(table, TableInfo { columns, sample_rows });
        }

        Ok(SchemaSnapshot { tables })
    }

    // ── Query executor ─────────────────────────────────────────────

    /// Run exactly `sql` and collect every row it produces.
    pub fn execute(&self, sql: &str) -> Result<QueryResult, DatabaseError> {
        let started = Instant::now();
        let result = self.execute_inner(sql);

        TraceEvent::QueryExecuted {
            rows: result.as_ref().map(|r| r.rows.len()).unwrap_or(0),
            duration_ms: started.elapsed().as_millis() as u64,
            ok: result.is_ok(),
        }
        .emit();

        result
    }

    fn execute_inner(&self, sql: &str) -> Result<QueryResult, DatabaseError> {
        let conn = self.connect(self.options.read_only)?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(CellValue::from(row.get_ref(i)?));
            }
            rows.push(cells);
        }

        Ok(QueryResult { columns, rows })
    }
}

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn table_names(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let cols = stmt
        .query_map([], |r| {
            Ok(ColumnInfo {
                name: r.get(1)?,
                col_type: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cols)
}

fn sample(conn: &Connection, table: &str, limit: usize) -> Result<Vec<Row>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM {} LIMIT {}",
        quote_ident(table),
        limit
    ))?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([])?;
    while let Some(row) = cursor.next()? {
        let mut pairs = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            pairs.push((name.clone(), CellValue::from(row.get_ref(i)?)));
        }
        rows.push(Row(pairs));
    }
    Ok(rows)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
