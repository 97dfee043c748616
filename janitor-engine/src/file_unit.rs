//! Per-file analysis unit (§4.9, §4.12 "Phase 2"): reads one file, consults
//! the incremental cache, and produces everything Phase 2 (file graph) and
//! the deferred ingestion pass (§4.7) need without re-parsing twice when
//! nothing changed. One `analyze_file` call per discovered file, fanned out
//! over `rayon` by the orchestrator — grounded on `drift-analysis`'s
//! `scanner.rs` per-file worker shape.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use janitor_core::errors::AnalysisError;
use janitor_core::traits::cache_store::FileMetadataRow;
use janitor_core::types::Entity;

use janitor_analysis::cache::{check_freshness, hash_content, AnalysisCache, FileFingerprint, FreshnessCheck};
use janitor_analysis::depgraph::{normalize, DependencyGraphBuilder, KnownFiles};
use janitor_analysis::entities;
use janitor_analysis::parser::{Language, ParserAdapter};
use janitor_analysis::refs::ingest::{javascript as js_ingest, python as python_ingest};
use janitor_analysis::refs::type_registry::VariableTypeRegistry;
use janitor_analysis::refs::CandidateReference;

use crate::error::EngineError;

/// Everything Phase 2/3 need about one file, produced once per run.
pub struct FileUnit {
    pub path: PathBuf,
    pub normalized: String,
    pub language: Language,
    pub content_hash: Vec<u8>,
    /// Raw bytes, kept for the orphan entry-point scan and as the pipeline's
    /// `file_bytes` input — never lossily decoded until a consumer needs
    /// text (§7 EncodingWarning).
    pub source_text: Arc<[u8]>,
    pub entities: Vec<Entity>,
    /// Normalized target file paths this file's imports resolved to,
    /// already filtered to [`KnownFiles`] membership by
    /// [`DependencyGraphBuilder`].
    pub dependency_targets: Vec<String>,
}

/// Analyze one file, reusing cached entities/dependency-edges when its
/// `mtime`+`size` fingerprint matches what was last recorded (§4.9): no
/// parse, no extraction, just a cache read. A mismatch or a first sighting
/// falls through to a full parse-and-extract, followed by a cache write so
/// the *next* run gets the fast path.
pub fn analyze_file(
    path: &Path,
    language: Language,
    known: &KnownFiles,
    cache: &AnalysisCache,
    parser: &ParserAdapter,
) -> Result<FileUnit, EngineError> {
    let normalized = normalize(path);

    let fingerprint = FileFingerprint::stat(path).map_err(|source| {
        EngineError::Analysis(AnalysisError::Io {
            path: normalized.clone(),
            source,
        })
    })?;
    let cached_meta = cache.get_file_metadata(&normalized)?;
    let freshness = check_freshness(&fingerprint, cached_meta.as_ref());

    let bytes = fs::read(path).map_err(|source| {
        EngineError::Analysis(AnalysisError::Io {
            path: normalized.clone(),
            source,
        })
    })?;

    if let FreshnessCheck::UnchangedTrusted { content_hash } = &freshness {
        if let Some(entities) = cache.get_entities(content_hash)? {
            let dependency_targets = cache
                .get_dependency_edges(&normalized)?
                .into_iter()
                .map(|row| row.target_file)
                .collect();
            return Ok(FileUnit {
                path: path.to_path_buf(),
                normalized,
                language,
                content_hash: content_hash.clone(),
                source_text: Arc::from(bytes.into_boxed_slice()),
                entities,
                dependency_targets,
            });
        }
    }

    let content_hash = hash_content(&bytes);

    let Ok(cst) = parser.parse_as(&bytes, path, language) else {
        tracing::info!(path = %normalized, "grammar unavailable, skipping file");
        return Ok(FileUnit {
            path: path.to_path_buf(),
            normalized,
            language,
            content_hash,
            source_text: Arc::from(bytes.into_boxed_slice()),
            entities: Vec::new(),
            dependency_targets: Vec::new(),
        });
    };

    let extraction = entities::extract(&cst);
    let dep_builder = DependencyGraphBuilder::new(known);
    let mut dependency_targets = Vec::new();
    for import in &extraction.imports {
        for target in dep_builder.resolve(import, language) {
            dependency_targets.push(normalize(&target));
        }
    }

    cache.put_entities(&content_hash, &extraction.entities)?;
    cache.put_dependency_edges(&normalized, &dependency_targets)?;
    cache.upsert_file_metadata(&FileMetadataRow {
        path: normalized.clone(),
        mtime_secs: fingerprint.mtime_secs,
        mtime_nanos: fingerprint.mtime_nanos,
        size: fingerprint.size,
        content_hash: content_hash.clone(),
        last_analyzed_at: now_secs(),
    })?;

    Ok(FileUnit {
        path: path.to_path_buf(),
        normalized,
        language,
        content_hash,
        source_text: Arc::from(bytes.into_boxed_slice()),
        entities: extraction.entities,
        dependency_targets,
    })
}

/// Phase 3 input for one file (§4.7): the candidate references a fresh CST
/// walk would produce, served from the kind-2 cache when possible so a
/// file whose `analyze_file` call took the fast path still doesn't need a
/// live parse just to re-derive them.
pub fn candidate_references(
    unit: &FileUnit,
    cache: &AnalysisCache,
    parser: &ParserAdapter,
    dep_builder: &DependencyGraphBuilder,
    type_registry: &mut VariableTypeRegistry,
) -> Result<Vec<CandidateReference>, EngineError> {
    if let Some(cached) = cache.get_candidate_references(&unit.content_hash)? {
        return Ok(cached);
    }

    let Ok(cst) = parser.parse_as(&unit.source_text, &unit.path, unit.language) else {
        tracing::info!(path = %unit.normalized, "grammar unavailable, skipping reference ingestion");
        return Ok(Vec::new());
    };

    let extraction = entities::extract(&cst);
    let candidates = if unit.language.is_python() {
        python_ingest::ingest(&cst, &unit.entities, &extraction.imports, dep_builder, type_registry)
    } else {
        js_ingest::ingest(&cst, &unit.entities, &extraction.imports, dep_builder, type_registry)
    };

    cache.put_candidate_references(&unit.content_hash, &candidates)?;
    Ok(candidates)
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use janitor_analysis::cache::AnalysisCache;
    use janitor_storage::SqliteCacheStore;
    use std::sync::Arc as StdArc;

    fn make_cache() -> AnalysisCache {
        let store = SqliteCacheStore::open_in_memory().unwrap();
        AnalysisCache::new(StdArc::new(store))
    }

    #[test]
    fn first_analysis_writes_cache_rows_second_reuses_them() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("a.py");
        fs::write(&file_path, "def live():\n    pass\n").unwrap();

        let known = KnownFiles::new(dir.path(), vec![normalize(&file_path)]);
        let cache = make_cache();
        let parser = ParserAdapter::new();

        let first = analyze_file(&file_path, Language::Python, &known, &cache, &parser).unwrap();
        assert_eq!(first.entities.len(), 1);

        let second = analyze_file(&file_path, Language::Python, &known, &cache, &parser).unwrap();
        assert_eq!(second.entities.len(), 1);
        assert_eq!(second.content_hash, first.content_hash);
    }

    #[test]
    fn candidate_references_are_cached_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("a.py");
        fs::write(
            &file_path,
            "class C:\n    def run(self):\n        self._helper()\n\n    def _helper(self):\n        pass\n",
        )
        .unwrap();

        let known = KnownFiles::new(dir.path(), vec![normalize(&file_path)]);
        let cache = make_cache();
        let parser = ParserAdapter::new();
        let unit = analyze_file(&file_path, Language::Python, &known, &cache, &parser).unwrap();

        let dep_builder = DependencyGraphBuilder::new(&known);
        let mut registry = VariableTypeRegistry::new();
        let first = candidate_references(&unit, &cache, &parser, &dep_builder, &mut registry).unwrap();
        assert!(first
            .iter()
            .any(|c| c.symbol_name == "_helper" && c.class_context.as_deref() == Some("C")));

        let mut registry2 = VariableTypeRegistry::new();
        let second = candidate_references(&unit, &cache, &parser, &dep_builder, &mut registry2).unwrap();
        assert_eq!(second.len(), first.len());
    }
}
