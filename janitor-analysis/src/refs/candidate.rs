//! `CandidateReference` — the pre-resolution shape emitted by the
//! ingestion walk (§4.7). Serialized as analysis-cache kind 2 (§4.9):
//! "sufficient to replay resolution without re-parsing."

use serde::{Deserialize, Serialize};

use janitor_core::types::ReferenceKind;

/// One candidate reference discovered while walking a file's CST a second
/// time (§4.7's "ingestion protocol"), before any resolution strategy has
/// run. `add_reference` on [`super::tracker::ReferenceTracker`] consumes
/// these one at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateReference {
    /// The name referenced — a bare identifier, or a dotted path for
    /// qualified-name fallback matching.
    pub symbol_name: String,
    pub source_file: String,
    /// Qualified name of the enclosing definition, if the reference occurs
    /// inside one.
    pub source_symbol: Option<String>,
    /// Set when the reference originated from `self.x`/`cls.x` or from a
    /// method body within class `C` referencing a bare name that type
    /// inference resolved to `C`.
    pub class_context: Option<String>,
    /// Set when the referrer imported `symbol_name` from a file the
    /// dependency graph already resolved.
    pub target_file: Option<String>,
    pub kind: ReferenceKind,
}

impl CandidateReference {
    pub fn new(symbol_name: impl Into<String>, source_file: impl Into<String>, kind: ReferenceKind) -> Self {
        Self {
            symbol_name: symbol_name.into(),
            source_file: source_file.into(),
            source_symbol: None,
            class_context: None,
            target_file: None,
            kind,
        }
    }

    pub fn with_source_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.source_symbol = Some(symbol.into());
        self
    }

    pub fn with_class_context(mut self, class_name: impl Into<String>) -> Self {
        self.class_context = Some(class_name.into());
        self
    }

    pub fn with_target_file(mut self, file: impl Into<String>) -> Self {
        self.target_file = Some(file.into());
        self
    }
}
