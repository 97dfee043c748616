//! `DatabaseManager` — owns the single SQLite connection behind the
//! analysis cache, opened in WAL mode with a `busy_timeout` long enough to
//! ride out a concurrent writer (§4.9: "WAL-equivalent + busy-retry ≥5s").
//! Grounded on `drift-storage/src/engine.rs`'s `DriftStorageEngine`
//! read/write routing (`with_reader`/`with_writer`), simplified from its
//! separate writer-connection-plus-reader-pool split to a single
//! mutex-guarded connection: the analysis cache is read and written by one
//! process per run, never drift's many-reader NAPI-bridge workload, so a
//! pool buys nothing here.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;

use janitor_core::errors::StorageError;

use crate::migrations;

const BUSY_TIMEOUT_MS: u64 = 5_000;

pub struct DatabaseManager {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl DatabaseManager {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(sqe)?;
            }
        }
        let conn = Connection::open(path).map_err(sqe)?;
        Self::configure(&conn)?;
        migrations::run(&conn)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(sqe)?;
        Self::configure(&conn)?;
        migrations::run(&conn)?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
        })
    }

    fn configure(conn: &Connection) -> Result<(), StorageError> {
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))
            .map_err(sqe)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(sqe)?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(sqe)?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self.conn.lock().expect("db connection mutex poisoned");
        f(&conn)
    }

    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self.conn.lock().expect("db connection mutex poisoned");
        f(&conn)
    }

    pub fn checkpoint(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("db connection mutex poisoned");
        conn.pragma_update(None, "wal_checkpoint", "TRUNCATE")
            .map_err(sqe)
    }
}

pub(crate) fn sqe(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_database_opens_and_migrates() {
        let db = DatabaseManager::open_in_memory().unwrap();
        assert!(db.path().is_none());
        db.with_reader(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='file_metadata'",
                    [],
                    |row| row.get(0),
                )
                .map_err(sqe)?;
            assert_eq!(count, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn file_backed_database_persists_in_its_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("analysis.db");
        let db = DatabaseManager::open(&db_path).unwrap();
        assert_eq!(db.path(), Some(db_path.as_path()));
        assert!(db_path.exists());
    }
}
