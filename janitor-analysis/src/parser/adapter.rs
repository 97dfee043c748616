//! `ParserAdapter` — routes a file to the correct tree-sitter grammar by
//! extension and caches the result by content hash (§4.1). Grounded on
//! `drift-analysis`'s `parsers/manager.rs` `ParserManager`.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};
use xxhash_rust::xxh3::xxh3_64;

use super::cache::ParseCache;
use super::cst::Cst;
use super::error::ParseFailure;
use super::language::Language;

pub struct ParserAdapter {
    cache: ParseCache,
}

impl ParserAdapter {
    pub fn new() -> Self {
        Self {
            cache: ParseCache::default(),
        }
    }

    pub fn with_cache_capacity(capacity: u64) -> Self {
        Self {
            cache: ParseCache::new(capacity),
        }
    }

    pub fn detect_language(&self, path: &Path) -> Option<Language> {
        Language::from_path(path)
    }

    /// Parse `source` as `path`'s detected language. Returns `Ok(None)` for
    /// unsupported extensions (not an error — the caller simply skips the
    /// file). A `ParseFailure` is returned only for a grammar-load failure;
    /// per §4.1 the adapter tolerates syntactically invalid input by
    /// returning tree-sitter's best-effort tree rather than failing, so a
    /// malformed file still yields `Ok(Some(cst))` with error nodes inside.
    #[instrument(skip(self, source), fields(path = %path.display()))]
    pub fn parse(&self, source: &[u8], path: &Path) -> Result<Option<Cst>, ParseFailure> {
        let Some(language) = self.detect_language(path) else {
            return Ok(None);
        };
        self.parse_as(source, path, language).map(Some)
    }

    pub fn parse_as(
        &self,
        source: &[u8],
        path: &Path,
        language: Language,
    ) -> Result<Cst, ParseFailure> {
        let content_hash = xxh3_64(source);
        if let Some(cached) = self.cache.get(content_hash, language) {
            return Ok(cached);
        }

        let mut parser = language.new_parser().map_err(|_| ParseFailure::GrammarUnavailable(language))?;
        let tree = parser.parse(source, None).ok_or(ParseFailure::GrammarUnavailable(language))?;

        if tree.root_node().has_error() {
            debug!(path = %path.display(), "parsed with syntax errors, proceeding best-effort");
        }

        let cst = Cst {
            tree: Arc::new(tree),
            source: Arc::from(source.to_vec().into_boxed_slice()),
            language,
            file_path: path.display().to_string(),
        };

        self.cache.insert(content_hash, language, cst.clone());
        Ok(cst)
    }

    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for ParserAdapter {
    fn default() -> Self {
        Self::new()
    }
}
