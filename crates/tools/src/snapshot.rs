//! Value types returned by the schema inspector and query executor.

use std::collections::BTreeMap;
use std::fmt;

use rusqlite::types::ValueRef;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Cells and rows
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single SQLite value, owned.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for CellValue {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(i) => CellValue::Integer(i),
            ValueRef::Real(f) => CellValue::Real(f),
            ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => CellValue::Blob(b.to_vec()),
        }
    }
}

/// Text form used in tool output.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("NULL"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Debug keeps the trailing ".0" on integral reals.
            CellValue::Real(r) => write!(f, "{r:?}"),
            CellValue::Text(t) => f.write_str(t),
            CellValue::Blob(b) => write!(f, "x'{}'", hex::encode(b)),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => s.serialize_unit(),
            CellValue::Integer(i) => s.serialize_i64(*i),
            CellValue::Real(r) => s.serialize_f64(*r),
            CellValue::Text(t) => s.serialize_str(t),
            CellValue::Blob(b) => s.serialize_str(&format!("x'{}'", hex::encode(b))),
        }
    }
}

/// One result row as `(column, value)` pairs in result-set order.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(pub Vec<(String, CellValue)>);

impl Row {
    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.0.iter().map(|(_, v)| v)
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Schema snapshot
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableInfo {
    pub columns: Vec<ColumnInfo>,
    pub sample_rows: Vec<Row>,
}

/// Point-in-time description of every table, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaSnapshot {
    pub tables: BTreeMap<String, TableInfo>,
}

impl SchemaSnapshot {
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn get(&self, table: &str) -> Option<&TableInfo> {
        self.tables.get(table)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Query result
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_render_for_tool_text() {
        assert_eq!(CellValue::Null.to_string(), "NULL");
        assert_eq!(CellValue::Integer(-3).to_string(), "-3");
        assert_eq!(CellValue::Real(2.0).to_string(), "2.0");
        assert_eq!(CellValue::Real(0.25).to_string(), "0.25");
        assert_eq!(CellValue::Blob(vec![0xde, 0xad]).to_string(), "x'dead'");
    }

    #[test]
    fn row_serializes_in_column_order() {
        let row = Row(vec![
            ("zeta".into(), CellValue::Integer(1)),
            ("alpha".into(), CellValue::Null),
            ("mid".into(), CellValue::Blob(vec![1])),
        ]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":null,"mid":"x'01'"}"#);
    }

    #[test]
    fn snapshot_serializes_as_table_map() {
        let mut snap = SchemaSnapshot::default();
        snap.tables.insert(
            "T1".into(),
            TableInfo {
                columns: vec![ColumnInfo { name: "id".into(), col_type: "INTEGER".into() }],
                sample_rows: vec![],
            },
        );
        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(
            json,
            r#"{"T1":{"columns":[{"name":"id","type":"INTEGER"}],"sample_rows":[]}}"#
        );
    }
}
