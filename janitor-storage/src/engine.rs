//! `SqliteCacheStore` — the `IJanitorCacheStore` implementation backing the
//! on-disk analysis cache at `<project_root>/.janitor_cache/analysis.db`
//! (§4.9, §6). Grounded on `drift-storage/src/engine.rs`'s
//! `DriftStorageEngine`: a thin struct wrapping `DatabaseManager` whose
//! methods are one-line delegations to `queries`, routed through
//! `with_reader` for reads and `with_writer` for writes so the single
//! mutex-guarded connection serialises writers while readers never block on
//! each other beyond that same mutex (§5: "readers are lock-free" refers to
//! SQLite's own WAL readers; this process only ever holds one connection,
//! so the mutex is the sole serialization point worth noting here).

use std::path::Path;
use std::sync::Arc;

use janitor_core::errors::StorageError;
use janitor_core::traits::cache_store::{
    DependencyEdgeRow, FileMetadataRow, IJanitorCacheStore, ProjectResultRow,
};

use crate::connection::DatabaseManager;
use crate::queries;

pub struct SqliteCacheStore {
    db: DatabaseManager,
}

impl SqliteCacheStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open_in_memory()?,
        })
    }

    /// Open (creating if absent) the cache database under the conventional
    /// `<project_root>/.janitor_cache/analysis.db` path (§6), wrapped for
    /// direct use as `Arc<dyn IJanitorCacheStore>`.
    pub fn open_for_project(project_root: &Path) -> Result<Arc<dyn IJanitorCacheStore>, StorageError> {
        let path = project_root
            .join(janitor_core::constants::CACHE_DIR_NAME)
            .join(janitor_core::constants::CACHE_DB_NAME);
        Ok(Arc::new(Self::open(&path)?))
    }

    pub fn database_path(&self) -> Option<&Path> {
        self.db.path()
    }
}

impl IJanitorCacheStore for SqliteCacheStore {
    fn load_all_file_metadata(&self) -> Result<Vec<FileMetadataRow>, StorageError> {
        self.db.with_reader(queries::load_all_file_metadata)
    }

    fn get_file_metadata(&self, path: &str) -> Result<Option<FileMetadataRow>, StorageError> {
        self.db
            .with_reader(|conn| queries::get_file_metadata(conn, path))
    }

    fn upsert_file_metadata(&self, row: &FileMetadataRow) -> Result<(), StorageError> {
        self.db
            .with_writer(|conn| queries::upsert_file_metadata(conn, row))
    }

    fn delete_file_metadata(&self, path: &str) -> Result<(), StorageError> {
        self.db
            .with_writer(|conn| queries::delete_file_metadata(conn, path))
    }

    fn get_entities_json(&self, content_hash: &[u8]) -> Result<Option<String>, StorageError> {
        self.db
            .with_reader(|conn| queries::get_entities_json(conn, content_hash))
    }

    fn put_entities_json(
        &self,
        content_hash: &[u8],
        entities_json: &str,
    ) -> Result<(), StorageError> {
        self.db
            .with_writer(|conn| queries::put_entities_json(conn, content_hash, entities_json))
    }

    fn get_candidate_references_json(
        &self,
        content_hash: &[u8],
    ) -> Result<Option<String>, StorageError> {
        self.db
            .with_reader(|conn| queries::get_candidate_references_json(conn, content_hash))
    }

    fn put_candidate_references_json(
        &self,
        content_hash: &[u8],
        candidates_json: &str,
    ) -> Result<(), StorageError> {
        self.db.with_writer(|conn| {
            queries::put_candidate_references_json(conn, content_hash, candidates_json)
        })
    }

    fn get_dependency_edges(&self, file: &str) -> Result<Vec<DependencyEdgeRow>, StorageError> {
        self.db
            .with_reader(|conn| queries::get_dependency_edges(conn, file))
    }

    fn put_dependency_edges(&self, file: &str, targets: &[String]) -> Result<(), StorageError> {
        self.db
            .with_writer(|conn| queries::put_dependency_edges(conn, file, targets))
    }

    fn get_project_result(
        &self,
        project_hash: &str,
    ) -> Result<Option<ProjectResultRow>, StorageError> {
        self.db
            .with_reader(|conn| queries::get_project_result(conn, project_hash))
    }

    fn put_project_result(&self, row: &ProjectResultRow) -> Result<(), StorageError> {
        self.db
            .with_writer(|conn| queries::put_project_result(conn, row))
    }

    fn checkpoint(&self) -> Result<(), StorageError> {
        self.db.checkpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use janitor_core::traits::cache_store::FileMetadataRow;

    #[test]
    fn file_metadata_round_trips() {
        let store = SqliteCacheStore::open_in_memory().unwrap();
        let row = FileMetadataRow {
            path: "a.py".to_string(),
            mtime_secs: 1,
            mtime_nanos: 2,
            size: 3,
            content_hash: vec![1, 2, 3],
            last_analyzed_at: 4,
        };
        store.upsert_file_metadata(&row).unwrap();
        let got = store.get_file_metadata("a.py").unwrap().unwrap();
        assert_eq!(got.size, 3);
        assert_eq!(got.content_hash, vec![1, 2, 3]);
    }

    #[test]
    fn dependency_edges_replace_on_rewrite() {
        let store = SqliteCacheStore::open_in_memory().unwrap();
        store
            .put_dependency_edges("a.py", &["b.py".to_string(), "c.py".to_string()])
            .unwrap();
        assert_eq!(store.get_dependency_edges("a.py").unwrap().len(), 2);

        store
            .put_dependency_edges("a.py", &["b.py".to_string()])
            .unwrap();
        let edges = store.get_dependency_edges("a.py").unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target_file, "b.py");
    }

    #[test]
    fn project_result_round_trips() {
        let store = SqliteCacheStore::open_in_memory().unwrap();
        let row = ProjectResultRow {
            project_hash: "h1".to_string(),
            dead_symbols_json: "[]".to_string(),
            orphans_json: "[]".to_string(),
            created_at: 100,
        };
        store.put_project_result(&row).unwrap();
        let got = store.get_project_result("h1").unwrap().unwrap();
        assert_eq!(got.created_at, 100);
    }

    #[test]
    fn missing_rows_are_none_not_errors() {
        let store = SqliteCacheStore::open_in_memory().unwrap();
        assert!(store.get_file_metadata("nope.py").unwrap().is_none());
        assert!(store.get_entities_json(&[9, 9]).unwrap().is_none());
        assert!(store.get_project_result("nope").unwrap().is_none());
    }
}
