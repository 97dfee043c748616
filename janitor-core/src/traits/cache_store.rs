//! `IJanitorCacheStore` — the contract between the analysis cache (C9) and
//! whatever persists it. The SQLite implementation lives in
//! `janitor-storage`; this trait lets `janitor-analysis` depend only on
//! `janitor-core` and stay storage-agnostic, the same split drift-core
//! draws between its storage traits and drift-storage's SQLite engine.
//!
//! Object-safe, `Send + Sync`, with a blanket `Arc<T>` impl so callers can
//! pass `Arc<dyn IJanitorCacheStore>` around freely.

use std::sync::Arc;

use crate::errors::StorageError;

/// `file_metadata` row: the fast `mtime + size` pre-check from §4.9.
#[derive(Debug, Clone)]
pub struct FileMetadataRow {
    pub path: String,
    pub mtime_secs: i64,
    pub mtime_nanos: i64,
    pub size: i64,
    pub content_hash: Vec<u8>,
    pub last_analyzed_at: i64,
}

/// One edge of the file dependency graph, as persisted (§4.9 kind 3).
#[derive(Debug, Clone)]
pub struct DependencyEdgeRow {
    pub source_file: String,
    pub target_file: String,
}

/// Whole-project result row (§4.9 kind 4): keyed by the content hash of the
/// set of relevant files, so an unrelated file touched outside the project
/// doesn't invalidate it.
#[derive(Debug, Clone)]
pub struct ProjectResultRow {
    pub project_hash: String,
    pub dead_symbols_json: String,
    pub orphans_json: String,
    pub created_at: i64,
}

pub trait IJanitorCacheStore: Send + Sync {
    // ── file_metadata ──

    fn load_all_file_metadata(&self) -> Result<Vec<FileMetadataRow>, StorageError>;
    fn get_file_metadata(&self, path: &str) -> Result<Option<FileMetadataRow>, StorageError>;
    fn upsert_file_metadata(&self, row: &FileMetadataRow) -> Result<(), StorageError>;
    fn delete_file_metadata(&self, path: &str) -> Result<(), StorageError>;

    // ── per-file parse artifacts (kind 1: Entity list, serialized) ──

    fn get_entities_json(&self, content_hash: &[u8]) -> Result<Option<String>, StorageError>;
    fn put_entities_json(
        &self,
        content_hash: &[u8],
        entities_json: &str,
    ) -> Result<(), StorageError>;

    // ── per-file candidate references (kind 2: pre-resolution, replayable) ──

    fn get_candidate_references_json(
        &self,
        content_hash: &[u8],
    ) -> Result<Option<String>, StorageError>;
    fn put_candidate_references_json(
        &self,
        content_hash: &[u8],
        candidates_json: &str,
    ) -> Result<(), StorageError>;

    // ── per-file dependency edges (kind 3) ──

    fn get_dependency_edges(&self, file: &str) -> Result<Vec<DependencyEdgeRow>, StorageError>;
    fn put_dependency_edges(
        &self,
        file: &str,
        targets: &[String],
    ) -> Result<(), StorageError>;

    // ── whole-project result (kind 4) ──

    fn get_project_result(
        &self,
        project_hash: &str,
    ) -> Result<Option<ProjectResultRow>, StorageError>;
    fn put_project_result(&self, row: &ProjectResultRow) -> Result<(), StorageError>;

    /// Explicit flush/checkpoint hook; a no-op for implementations without
    /// a WAL to checkpoint.
    fn checkpoint(&self) -> Result<(), StorageError>;
}

impl<T: IJanitorCacheStore + ?Sized> IJanitorCacheStore for Arc<T> {
    fn load_all_file_metadata(&self) -> Result<Vec<FileMetadataRow>, StorageError> {
        (**self).load_all_file_metadata()
    }
    fn get_file_metadata(&self, path: &str) -> Result<Option<FileMetadataRow>, StorageError> {
        (**self).get_file_metadata(path)
    }
    fn upsert_file_metadata(&self, row: &FileMetadataRow) -> Result<(), StorageError> {
        (**self).upsert_file_metadata(row)
    }
    fn delete_file_metadata(&self, path: &str) -> Result<(), StorageError> {
        (**self).delete_file_metadata(path)
    }
    fn get_entities_json(&self, content_hash: &[u8]) -> Result<Option<String>, StorageError> {
        (**self).get_entities_json(content_hash)
    }
    fn put_entities_json(
        &self,
        content_hash: &[u8],
        entities_json: &str,
    ) -> Result<(), StorageError> {
        (**self).put_entities_json(content_hash, entities_json)
    }
    fn get_candidate_references_json(
        &self,
        content_hash: &[u8],
    ) -> Result<Option<String>, StorageError> {
        (**self).get_candidate_references_json(content_hash)
    }
    fn put_candidate_references_json(
        &self,
        content_hash: &[u8],
        candidates_json: &str,
    ) -> Result<(), StorageError> {
        (**self).put_candidate_references_json(content_hash, candidates_json)
    }
    fn get_dependency_edges(&self, file: &str) -> Result<Vec<DependencyEdgeRow>, StorageError> {
        (**self).get_dependency_edges(file)
    }
    fn put_dependency_edges(&self, file: &str, targets: &[String]) -> Result<(), StorageError> {
        (**self).put_dependency_edges(file, targets)
    }
    fn get_project_result(
        &self,
        project_hash: &str,
    ) -> Result<Option<ProjectResultRow>, StorageError> {
        (**self).get_project_result(project_hash)
    }
    fn put_project_result(&self, row: &ProjectResultRow) -> Result<(), StorageError> {
        (**self).put_project_result(row)
    }
    fn checkpoint(&self) -> Result<(), StorageError> {
        (**self).checkpoint()
    }
}
