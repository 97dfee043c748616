//! Row-level SQL for the four analysis-cache row kinds (§4.9) plus
//! `file_metadata`. Grounded on `drift-storage/src/queries.rs`'s one
//! function per row-kind-per-operation shape; each function takes the
//! already-locked `Connection` handed down by `DatabaseManager::with_reader`
//! / `with_writer` rather than opening its own.

use rusqlite::{params, Connection, OptionalExtension};

use janitor_core::errors::StorageError;
use janitor_core::traits::cache_store::{DependencyEdgeRow, FileMetadataRow, ProjectResultRow};

use crate::connection::sqe;

pub fn load_all_file_metadata(conn: &Connection) -> Result<Vec<FileMetadataRow>, StorageError> {
    let mut stmt = conn
        .prepare(
            "SELECT path, mtime_secs, mtime_nanos, size, content_hash, last_analyzed_at
             FROM file_metadata",
        )
        .map_err(sqe)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(FileMetadataRow {
                path: row.get(0)?,
                mtime_secs: row.get(1)?,
                mtime_nanos: row.get(2)?,
                size: row.get(3)?,
                content_hash: row.get(4)?,
                last_analyzed_at: row.get(5)?,
            })
        })
        .map_err(sqe)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqe)
}

pub fn get_file_metadata(
    conn: &Connection,
    path: &str,
) -> Result<Option<FileMetadataRow>, StorageError> {
    conn.query_row(
        "SELECT path, mtime_secs, mtime_nanos, size, content_hash, last_analyzed_at
         FROM file_metadata WHERE path = ?1",
        params![path],
        |row| {
            Ok(FileMetadataRow {
                path: row.get(0)?,
                mtime_secs: row.get(1)?,
                mtime_nanos: row.get(2)?,
                size: row.get(3)?,
                content_hash: row.get(4)?,
                last_analyzed_at: row.get(5)?,
            })
        },
    )
    .optional()
    .map_err(sqe)
}

pub fn upsert_file_metadata(conn: &Connection, row: &FileMetadataRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO file_metadata (path, mtime_secs, mtime_nanos, size, content_hash, last_analyzed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(path) DO UPDATE SET
            mtime_secs = excluded.mtime_secs,
            mtime_nanos = excluded.mtime_nanos,
            size = excluded.size,
            content_hash = excluded.content_hash,
            last_analyzed_at = excluded.last_analyzed_at",
        params![
            row.path,
            row.mtime_secs,
            row.mtime_nanos,
            row.size,
            row.content_hash,
            row.last_analyzed_at,
        ],
    )
    .map_err(sqe)?;
    Ok(())
}

pub fn delete_file_metadata(conn: &Connection, path: &str) -> Result<(), StorageError> {
    conn.execute("DELETE FROM file_metadata WHERE path = ?1", params![path])
        .map_err(sqe)?;
    Ok(())
}

pub fn get_entities_json(
    conn: &Connection,
    content_hash: &[u8],
) -> Result<Option<String>, StorageError> {
    conn.query_row(
        "SELECT entities_json FROM entities_cache WHERE content_hash = ?1",
        params![content_hash],
        |row| row.get(0),
    )
    .optional()
    .map_err(sqe)
}

pub fn put_entities_json(
    conn: &Connection,
    content_hash: &[u8],
    entities_json: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO entities_cache (content_hash, entities_json) VALUES (?1, ?2)
         ON CONFLICT(content_hash) DO UPDATE SET entities_json = excluded.entities_json",
        params![content_hash, entities_json],
    )
    .map_err(sqe)?;
    Ok(())
}

pub fn get_candidate_references_json(
    conn: &Connection,
    content_hash: &[u8],
) -> Result<Option<String>, StorageError> {
    conn.query_row(
        "SELECT candidates_json FROM candidate_references_cache WHERE content_hash = ?1",
        params![content_hash],
        |row| row.get(0),
    )
    .optional()
    .map_err(sqe)
}

pub fn put_candidate_references_json(
    conn: &Connection,
    content_hash: &[u8],
    candidates_json: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO candidate_references_cache (content_hash, candidates_json) VALUES (?1, ?2)
         ON CONFLICT(content_hash) DO UPDATE SET candidates_json = excluded.candidates_json",
        params![content_hash, candidates_json],
    )
    .map_err(sqe)?;
    Ok(())
}

pub fn get_dependency_edges(
    conn: &Connection,
    file: &str,
) -> Result<Vec<DependencyEdgeRow>, StorageError> {
    let mut stmt = conn
        .prepare("SELECT source_file, target_file FROM dependency_edges WHERE source_file = ?1")
        .map_err(sqe)?;
    let rows = stmt
        .query_map(params![file], |row| {
            Ok(DependencyEdgeRow {
                source_file: row.get(0)?,
                target_file: row.get(1)?,
            })
        })
        .map_err(sqe)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqe)
}

/// Replaces every existing edge for `file` with `targets` — the per-file
/// dependency-edge row is a full snapshot of that file's outgoing imports,
/// not an append-only log, so a re-extraction that drops an import must
/// also drop its stale edge.
pub fn put_dependency_edges(
    conn: &Connection,
    file: &str,
    targets: &[String],
) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM dependency_edges WHERE source_file = ?1",
        params![file],
    )
    .map_err(sqe)?;
    for target in targets {
        conn.execute(
            "INSERT OR IGNORE INTO dependency_edges (source_file, target_file) VALUES (?1, ?2)",
            params![file, target],
        )
        .map_err(sqe)?;
    }
    Ok(())
}

pub fn get_project_result(
    conn: &Connection,
    project_hash: &str,
) -> Result<Option<ProjectResultRow>, StorageError> {
    conn.query_row(
        "SELECT project_hash, dead_symbols_json, orphans_json, created_at
         FROM project_result WHERE project_hash = ?1",
        params![project_hash],
        |row| {
            Ok(ProjectResultRow {
                project_hash: row.get(0)?,
                dead_symbols_json: row.get(1)?,
                orphans_json: row.get(2)?,
                created_at: row.get(3)?,
            })
        },
    )
    .optional()
    .map_err(sqe)
}

pub fn put_project_result(conn: &Connection, row: &ProjectResultRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO project_result (project_hash, dead_symbols_json, orphans_json, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(project_hash) DO UPDATE SET
            dead_symbols_json = excluded.dead_symbols_json,
            orphans_json = excluded.orphans_json,
            created_at = excluded.created_at",
        params![
            row.project_hash,
            row.dead_symbols_json,
            row.orphans_json,
            row.created_at,
        ],
    )
    .map_err(sqe)?;
    Ok(())
}
