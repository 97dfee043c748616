//! In-memory parse cache: Moka, keyed by `(content_hash, language)` so
//! identical bytes parsed under two different grammars never collide.
//! Grounded on `drift-analysis`'s `parsers/cache.rs` `ParseCache`.

use std::mem::Discriminant;

use moka::sync::Cache;

use super::cst::Cst;
use super::language::Language;

type CacheKey = (u64, Discriminant<Language>);

fn make_key(content_hash: u64, lang: Language) -> CacheKey {
    (content_hash, std::mem::discriminant(&lang))
}

pub struct ParseCache {
    inner: Cache<CacheKey, Cst>,
}

impl ParseCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
        }
    }

    pub fn get(&self, content_hash: u64, lang: Language) -> Option<Cst> {
        self.inner.get(&make_key(content_hash, lang))
    }

    pub fn insert(&self, content_hash: u64, lang: Language, cst: Cst) {
        self.inner.insert(make_key(content_hash, lang), cst);
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    pub fn invalidate(&self, content_hash: u64, lang: Language) {
        self.inner.invalidate(&make_key(content_hash, lang));
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}
