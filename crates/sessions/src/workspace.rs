//! Per-session scratch directory holding the uploaded database copy.
//!
//! The directory and everything in it are removed when the workspace is
//! dropped, i.e. when the last reference to its session goes away.

use std::path::{Path, PathBuf};

use sq_domain::error::{Error, Result};
use tempfile::TempDir;

#[derive(Debug)]
pub struct SessionWorkspace {
    /// Removed on drop.
    _dir: TempDir,
    db_path: PathBuf,
}

impl SessionWorkspace {
    /// Create a fresh temp directory and write `bytes` into it under a
    /// sanitized form of `file_name`.
    pub fn stage(file_name: &str, bytes: &[u8]) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("sqlagent-").tempdir()?;
        let db_path = dir.path().join(sanitize_file_name(file_name));
        std::fs::write(&db_path, bytes)?;

        tracing::debug!(
            path = %db_path.display(),
            bytes = bytes.len(),
            "uploaded database staged"
        );

        Ok(Self { _dir: dir, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Whether an upload name is acceptable as a SQLite database.
pub fn check_extension(file_name: &str) -> Result<()> {
    if file_name.ends_with(".db") {
        Ok(())
    } else {
        Err(Error::Upload("Only SQLite (.db) files are supported".into()))
    }
}

/// Keep only the final path component and replace anything outside
/// `[A-Za-z0-9._-]` with `_`.
fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload.db".into()
    } else {
        cleaned
    }
}
