//! Analysis Cache, in-memory half (C9, §4.9, §10.4). Wraps whatever
//! implements [`IJanitorCacheStore`] (the SQLite engine in
//! `janitor-storage`, in production) with a `moka` layer in front of the
//! two JSON-blob row kinds, mirroring `parser::cache::ParseCache`'s shape
//! one level up the stack: that one caches parse trees keyed by content
//! hash, this one caches the entity/candidate-reference rows keyed the
//! same way. Reads check memory first; writes update both layers so a
//! cold process never serves stale data its own session just wrote.

pub mod freshness;

use std::sync::Arc;

use janitor_core::errors::StorageError;
use janitor_core::traits::cache_store::{
    DependencyEdgeRow, FileMetadataRow, IJanitorCacheStore, ProjectResultRow,
};
use janitor_core::types::Entity;
use moka::sync::Cache;

pub use freshness::{check_freshness, hash_content, FileFingerprint, FreshnessCheck};

use crate::refs::CandidateReference;

const DEFAULT_MEMORY_CAPACITY: u64 = 10_000;

pub struct AnalysisCache {
    store: Arc<dyn IJanitorCacheStore>,
    entities_mem: Cache<Vec<u8>, Arc<str>>,
    candidates_mem: Cache<Vec<u8>, Arc<str>>,
}

impl AnalysisCache {
    pub fn new(store: Arc<dyn IJanitorCacheStore>) -> Self {
        Self::with_capacity(store, DEFAULT_MEMORY_CAPACITY)
    }

    pub fn with_capacity(store: Arc<dyn IJanitorCacheStore>, capacity: u64) -> Self {
        Self {
            store,
            entities_mem: Cache::new(capacity),
            candidates_mem: Cache::new(capacity),
        }
    }

    pub fn get_file_metadata(&self, path: &str) -> Result<Option<FileMetadataRow>, StorageError> {
        self.store.get_file_metadata(path)
    }

    pub fn load_all_file_metadata(&self) -> Result<Vec<FileMetadataRow>, StorageError> {
        self.store.load_all_file_metadata()
    }

    pub fn upsert_file_metadata(&self, row: &FileMetadataRow) -> Result<(), StorageError> {
        self.store.upsert_file_metadata(row)
    }

    pub fn delete_file_metadata(&self, path: &str) -> Result<(), StorageError> {
        self.store.delete_file_metadata(path)
    }

    /// Kind 1: per-file extracted entities. A row that fails to
    /// deserialize is treated as a cache miss rather than an error
    /// ([`StorageError::CacheMiss`]'s own doc comment: "row missing or
    /// undeserializable, treated as a cache miss") — the caller just
    /// re-parses and re-extracts as if nothing were cached.
    pub fn get_entities(&self, content_hash: &[u8]) -> Result<Option<Vec<Entity>>, StorageError> {
        if let Some(json) = self.entities_mem.get(&content_hash.to_vec()) {
            return Ok(deserialize_or_miss(&json));
        }
        match self.store.get_entities_json(content_hash)? {
            Some(json) => {
                self.entities_mem
                    .insert(content_hash.to_vec(), Arc::from(json.as_str()));
                Ok(deserialize_or_miss(&json))
            }
            None => Ok(None),
        }
    }

    pub fn put_entities(
        &self,
        content_hash: &[u8],
        entities: &[Entity],
    ) -> Result<(), StorageError> {
        let json = serialize(entities)?;
        self.store.put_entities_json(content_hash, &json)?;
        self.entities_mem
            .insert(content_hash.to_vec(), Arc::from(json.as_str()));
        Ok(())
    }

    /// Kind 2: per-file candidate references, pre-resolution, so they can
    /// be replayed against a fresh [`crate::refs::ReferenceTracker`]
    /// without re-walking the CST.
    pub fn get_candidate_references(
        &self,
        content_hash: &[u8],
    ) -> Result<Option<Vec<CandidateReference>>, StorageError> {
        if let Some(json) = self.candidates_mem.get(&content_hash.to_vec()) {
            return Ok(deserialize_or_miss(&json));
        }
        match self.store.get_candidate_references_json(content_hash)? {
            Some(json) => {
                self.candidates_mem
                    .insert(content_hash.to_vec(), Arc::from(json.as_str()));
                Ok(deserialize_or_miss(&json))
            }
            None => Ok(None),
        }
    }

    pub fn put_candidate_references(
        &self,
        content_hash: &[u8],
        candidates: &[CandidateReference],
    ) -> Result<(), StorageError> {
        let json = serialize(candidates)?;
        self.store
            .put_candidate_references_json(content_hash, &json)?;
        self.candidates_mem
            .insert(content_hash.to_vec(), Arc::from(json.as_str()));
        Ok(())
    }

    /// Kind 3: per-file dependency edges, not memory-cached — the file
    /// graph is rebuilt once per run from every file's row, so a second
    /// in-memory layer on top would only shadow the one `moka` already
    /// gives the parser/entity layers without saving a second disk round
    /// trip within the same run.
    pub fn get_dependency_edges(&self, file: &str) -> Result<Vec<DependencyEdgeRow>, StorageError> {
        self.store.get_dependency_edges(file)
    }

    pub fn put_dependency_edges(&self, file: &str, targets: &[String]) -> Result<(), StorageError> {
        self.store.put_dependency_edges(file, targets)
    }

    /// Kind 4: whole-project result, the fast path that lets a fully
    /// unchanged tree skip graph construction entirely (§4.9, S6).
    pub fn get_project_result(
        &self,
        project_hash: &str,
    ) -> Result<Option<ProjectResultRow>, StorageError> {
        self.store.get_project_result(project_hash)
    }

    pub fn put_project_result(&self, row: &ProjectResultRow) -> Result<(), StorageError> {
        self.store.put_project_result(row)
    }

    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.store.checkpoint()
    }
}

fn serialize<T: serde::Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::DbCorrupt {
        details: format!("failed to serialize cache row: {e}"),
    })
}

fn deserialize_or_miss<T: serde::de::DeserializeOwned>(json: &str) -> Option<T> {
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(%error, "cache row failed to deserialize, treating as cache miss");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use janitor_core::types::entity::{ByteRange, EntityKind, LineRange};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        entities: Mutex<std::collections::HashMap<Vec<u8>, String>>,
    }

    impl IJanitorCacheStore for FakeStore {
        fn load_all_file_metadata(&self) -> Result<Vec<FileMetadataRow>, StorageError> {
            Ok(vec![])
        }
        fn get_file_metadata(&self, _path: &str) -> Result<Option<FileMetadataRow>, StorageError> {
            Ok(None)
        }
        fn upsert_file_metadata(&self, _row: &FileMetadataRow) -> Result<(), StorageError> {
            Ok(())
        }
        fn delete_file_metadata(&self, _path: &str) -> Result<(), StorageError> {
            Ok(())
        }
        fn get_entities_json(&self, content_hash: &[u8]) -> Result<Option<String>, StorageError> {
            Ok(self.entities.lock().unwrap().get(content_hash).cloned())
        }
        fn put_entities_json(
            &self,
            content_hash: &[u8],
            entities_json: &str,
        ) -> Result<(), StorageError> {
            self.entities
                .lock()
                .unwrap()
                .insert(content_hash.to_vec(), entities_json.to_string());
            Ok(())
        }
        fn get_candidate_references_json(
            &self,
            _content_hash: &[u8],
        ) -> Result<Option<String>, StorageError> {
            Ok(None)
        }
        fn put_candidate_references_json(
            &self,
            _content_hash: &[u8],
            _candidates_json: &str,
        ) -> Result<(), StorageError> {
            Ok(())
        }
        fn get_dependency_edges(&self, _file: &str) -> Result<Vec<DependencyEdgeRow>, StorageError> {
            Ok(vec![])
        }
        fn put_dependency_edges(&self, _file: &str, _targets: &[String]) -> Result<(), StorageError> {
            Ok(())
        }
        fn get_project_result(
            &self,
            _project_hash: &str,
        ) -> Result<Option<ProjectResultRow>, StorageError> {
            Ok(None)
        }
        fn put_project_result(&self, _row: &ProjectResultRow) -> Result<(), StorageError> {
            Ok(())
        }
        fn checkpoint(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn sample_entity() -> Entity {
        Entity {
            name: "foo".to_string(),
            kind: EntityKind::Function,
            file_path: "a.py".to_string(),
            byte_range: ByteRange::new(0, 3),
            line_range: LineRange { start: 1, end: 1 },
            qualified_name: "foo".to_string(),
            parent_class: None,
            base_classes: vec![],
            decorators: vec![],
            structural_hash: None,
            protected_by: None,
        }
    }

    #[test]
    fn put_then_get_round_trips_through_the_store() {
        let store = Arc::new(FakeStore::default());
        let cache = AnalysisCache::new(store);
        let hash = vec![1, 2, 3];

        cache.put_entities(&hash, &[sample_entity()]).unwrap();
        let got = cache.get_entities(&hash).unwrap().unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "foo");
    }

    #[test]
    fn second_get_is_served_from_memory_without_touching_the_store() {
        let store = Arc::new(FakeStore::default());
        let cache = AnalysisCache::new(store);
        let hash = vec![9, 9, 9];
        cache.put_entities(&hash, &[sample_entity()]).unwrap();

        // Corrupt the backing store directly; the in-memory layer should
        // still serve the last-written value.
        cache
            .store
            .put_entities_json(&hash, "not json")
            .unwrap();

        let got = cache.get_entities(&hash).unwrap().unwrap();
        assert_eq!(got[0].name, "foo");
    }

    #[test]
    fn missing_row_is_a_clean_none() {
        let store = Arc::new(FakeStore::default());
        let cache = AnalysisCache::new(store);
        assert!(cache.get_entities(&[0, 0, 0]).unwrap().is_none());
    }
}
