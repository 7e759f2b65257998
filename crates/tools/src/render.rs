//! Tool bodies that turn database access into the text the model reads.
//!
//! None of these fail: database errors become `Error: ...` strings so the
//! agent can correct itself.

use std::fmt::Write as _;

use crate::database::{DatabaseError, SqliteDatabase};
use crate::snapshot::{QueryResult, SchemaSnapshot};

pub const NO_RESULTS: &str = "The query returned no results.";

/// `list_tables`: comma-joined table names.
pub fn list_tables(db: &SqliteDatabase) -> String {
    match db.table_names() {
        Ok(names) => names.join(", "),
        Err(e) => format!("Error: {e}"),
    }
}

/// `get_schema`: DDL-like description plus sample rows for each requested
/// table. `table_names` is comma separated.
pub fn get_schema(db: &SqliteDatabase, table_names: &str) -> String {
    match db.schema() {
        Ok(snapshot) => render_schema(&snapshot, table_names),
        Err(e) => format!("Error: {e}"),
    }
}

/// `execute_query`: tab-separated rows with a header line.
pub fn execute_query(db: &SqliteDatabase, query: &str) -> String {
    render_query_result(db.execute(query))
}

/// Split a comma-separated list, trimming and dropping empty names.
pub fn split_table_names(table_names: &str) -> impl Iterator<Item = &str> {
    table_names.split(',').map(str::trim).filter(|t| !t.is_empty())
}

pub fn render_schema(snapshot: &SchemaSnapshot, table_names: &str) -> String {
    let mut out = String::new();
    for table in split_table_names(table_names) {
        let Some(info) = snapshot.get(table) else {
            let _ = writeln!(out, "Table '{table}' not found.");
            continue;
        };

        let _ = writeln!(out, "\nCREATE TABLE {table} (");
        for col in &info.columns {
            let _ = writeln!(out, "\t{} {}, ", col.name, col.col_type);
        }
        out.push_str(");\n");

        let _ = write!(
            out,
            "\n/*\n{} rows from {table} table:\n",
            info.sample_rows.len()
        );
        if let Some(first) = info.sample_rows.first() {
            let header: Vec<&str> = first.0.iter().map(|(c, _)| c.as_str()).collect();
            out.push_str(&header.join("\t"));
            out.push('\n');
            for row in &info.sample_rows {
                out.push_str(&join_cells(row.values()));
                out.push('\n');
            }
        }
        out.push_str("*/\n");
    }
    out
}

pub fn render_query_result(result: Result<QueryResult, DatabaseError>) -> String {
    let result = match result {
        Ok(r) => r,
        Err(e) => return format!("Error: {e}. Please rewrite your query and try again."),
    };
    if result.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = result.columns.join("\t");
    out.push('\n');
    for row in &result.rows {
        out.push_str(&join_cells(row.iter()));
        out.push('\n');
    }
    out
}

fn join_cells<'a>(cells: impl Iterator<Item = &'a crate::snapshot::CellValue>) -> String {
    cells.map(ToString::to_string).collect::<Vec<_>>().join("\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::{fixture, plant_unreadable_table};
    use crate::database::DatabaseOptions;

    fn db() -> (tempfile::TempDir, SqliteDatabase) {
        let (dir, path) = fixture();
        let db = SqliteDatabase::open(&path, DatabaseOptions::default()).unwrap();
        (dir, db)
    }

    #[test]
    fn list_tables_joins_names() {
        let (_dir, db) = db();
        assert_eq!(list_tables(&db), "T1, T2");
    }

    #[test]
    fn get_schema_renders_known_and_flags_unknown() {
        let (_dir, db) = db();
        let text = get_schema(&db, " T1 , missing,, ");
        let expected = "\nCREATE TABLE T1 (\n\tid INTEGER, \n\tname TEXT, \n);\n\n/*\n\
                        2 rows from T1 table:\nid\tname\n1\talpha\n2\tbeta\n*/\n\
                        Table 'missing' not found.\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn get_schema_of_empty_table_has_no_header() {
        let (_dir, db) = db();
        let text = get_schema(&db, "T2");
        assert!(text.contains("0 rows from T2 table:\n*/\n"), "{text}");
        assert!(text.contains("\tpayload BLOB, \n"));
    }

    #[test]
    fn get_schema_renders_readable_tables_next_to_an_unreadable_one() {
        let (_dir, path) = fixture();
        plant_unreadable_table(&path);
        let db = SqliteDatabase::open(&path, DatabaseOptions::default()).unwrap();

        let text = get_schema(&db, "T1, vt");
        assert!(!text.starts_with("Error:"), "{text}");
        assert!(text.contains("CREATE TABLE T1 (\n\tid INTEGER, "), "{text}");
        assert!(text.contains("2 rows from T1 table:"));
        assert!(text.contains("CREATE TABLE vt (\n);\n"));
        assert!(text.contains("0 rows from vt table:\n*/\n"));
    }

    #[test]
    fn execute_query_renders_tab_separated_rows() {
        let (_dir, db) = db();
        let text = execute_query(&db, "SELECT id, name, NULL AS n, x'ff' AS b FROM T1 ORDER BY id");
        assert_eq!(text, "id\tname\tn\tb\n1\talpha\tNULL\tx'ff'\n2\tbeta\tNULL\tx'ff'\n");
    }

    #[test]
    fn execute_query_empty_and_error() {
        let (_dir, db) = db();
        assert_eq!(execute_query(&db, "SELECT * FROM T2"), NO_RESULTS);

        let text = execute_query(&db, "SELEC 1");
        assert!(text.starts_with("Error: "));
        assert!(text.contains("syntax error"));
        assert!(text.ends_with(". Please rewrite your query and try again."));
    }

    #[test]
    fn split_ignores_blanks() {
        let names: Vec<&str> = split_table_names(" a, ,b ,").collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
