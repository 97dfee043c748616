//! `SymbolId` — the sole canonical identity for an entity across the pipeline.

use std::fmt;
use std::path::Path;

/// `"{canonical_file_path}::{qualified_name}"`.
///
/// This is the only key the reference graph, the dead-symbol pipeline, and
/// the analysis cache ever use to talk about "the same symbol". Two entities
/// with the same `SymbolId` are the same entity by definition, even if they
/// came from different analysis runs (content-hash permitting).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct SymbolId(String);

impl SymbolId {
    /// Build a `SymbolId` from an already-canonical file path and a
    /// qualified name (e.g. `ClassName.method` or a bare `name`).
    pub fn new(canonical_file_path: &str, qualified_name: &str) -> Self {
        Self(format!("{canonical_file_path}::{qualified_name}"))
    }

    /// Build a `SymbolId` from a `Path`, canonicalizing separators to `/`
    /// so the same file never produces two different ids on different
    /// platforms.
    pub fn from_path(file: &Path, qualified_name: &str) -> Self {
        let normalized = file.to_string_lossy().replace('\\', "/");
        Self::new(&normalized, qualified_name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into `(file_path, qualified_name)`. Returns `None` if the
    /// id was not constructed through [`SymbolId::new`] (should not happen
    /// for ids that entered the system through this crate).
    pub fn split(&self) -> Option<(&str, &str)> {
        self.0.split_once("::")
    }

    pub fn file_path(&self) -> Option<&str> {
        self.split().map(|(f, _)| f)
    }

    pub fn qualified_name(&self) -> Option<&str> {
        self.split().map(|(_, q)| q)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SymbolId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_round_trips() {
        let id = SymbolId::new("a/b.py", "Class.method");
        assert_eq!(id.file_path(), Some("a/b.py"));
        assert_eq!(id.qualified_name(), Some("Class.method"));
    }

    #[test]
    fn from_path_normalizes_separators() {
        let id = SymbolId::from_path(Path::new("a\\b.py"), "run");
        assert_eq!(id.as_str(), "a/b.py::run");
    }
}
