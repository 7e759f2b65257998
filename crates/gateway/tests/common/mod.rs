#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sq_providers::ScriptedProvider;
use sq_sessions::Session;
use sq_tools::{DatabaseOptions, SqliteDatabase};
use tempfile::TempDir;

/// `T1(id, name)` with two rows and an empty `T2(code, weight, payload)`.
pub fn write_fixture(path: &Path) {
    rusqlite::Connection::open(path)
        .unwrap()
        .execute_batch(
            "CREATE TABLE T1 (id INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO T1 (name) VALUES ('alpha'), ('beta');
             CREATE TABLE T2 (code VARCHAR(8), weight REAL, payload BLOB);",
        )
        .unwrap();
}

pub fn fixture() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.db");
    write_fixture(&path);
    (dir, path)
}

pub fn fixture_bytes() -> Vec<u8> {
    let (_dir, path) = fixture();
    std::fs::read(path).unwrap()
}

/// A session over the fixture database driven by `provider`.
pub fn session(provider: Arc<ScriptedProvider>) -> (TempDir, Session) {
    let (dir, path) = fixture();
    let db = SqliteDatabase::open(&path, DatabaseOptions::default()).unwrap();
    let tables = db.table_names().unwrap();
    let session = Session::new("fixture.db", db, provider, tables, None);
    (dir, session)
}
