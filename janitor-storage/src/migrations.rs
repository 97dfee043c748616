//! Schema migrations, tracked via SQLite's own `user_version` pragma
//! rather than a bookkeeping table — one less table to keep consistent
//! with the pragma itself. Grounded on `drift-storage`'s migration-at-open
//! shape (run unconditionally on every `DatabaseManager::open`, each
//! migration applied in its own transaction).

use rusqlite::Connection;

use janitor_core::errors::StorageError;

use crate::connection::sqe;

const MIGRATIONS: &[(u32, &str)] = &[(1, include_str!("migrations/001_initial.sql"))];

pub fn run(conn: &Connection) -> Result<(), StorageError> {
    let current: u32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(sqe)?;

    for (version, sql) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        conn.execute_batch(sql)
            .map_err(|e| StorageError::MigrationFailed {
                version: *version,
                message: e.to_string(),
            })?;
        conn.pragma_update(None, "user_version", *version)
            .map_err(sqe)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_lands_on_latest_version() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        let version: u32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, MIGRATIONS.last().unwrap().0);
    }

    #[test]
    fn running_twice_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();
        conn.execute(
            "INSERT INTO file_metadata (path, mtime_secs, mtime_nanos, size, content_hash, last_analyzed_at) VALUES ('a', 0, 0, 0, X'00', 0)",
            [],
        )
        .unwrap();
    }
}
