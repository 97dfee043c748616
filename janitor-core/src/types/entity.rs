//! `Entity` — a single named top-level or class-scoped declaration.

use serde::{Deserialize, Serialize};

use super::identifiers::SymbolId;

/// The kind of declaration an [`Entity`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Function,
    AsyncFunction,
    Class,
    Method,
    ModuleVariable,
    Export,
}

impl EntityKind {
    /// The declaration keyword this kind begins with in source text, used
    /// to check invariant 1 of the testable-properties section: slicing the
    /// file at `byte_range` must start with this token.
    pub fn declaration_keywords(self, language: Language) -> &'static [&'static str] {
        use Language::*;
        match (self, language) {
            (EntityKind::Function, Python) => &["def"],
            (EntityKind::AsyncFunction, Python) => &["async"],
            (EntityKind::Class, Python) => &["class"],
            (EntityKind::Method, Python) => &["def", "async"],
            (EntityKind::ModuleVariable, Python) => &[],
            (EntityKind::Export, Python) => &[],
            (EntityKind::Function, JavaScriptTypeScript) => &["function", "async", "const", "let", "var"],
            (EntityKind::AsyncFunction, JavaScriptTypeScript) => &["async"],
            (EntityKind::Class, JavaScriptTypeScript) => &["class", "export"],
            (EntityKind::Method, JavaScriptTypeScript) => &[],
            (EntityKind::ModuleVariable, JavaScriptTypeScript) => &["const", "let", "var"],
            (EntityKind::Export, JavaScriptTypeScript) => &["export"],
        }
    }
}

/// Re-exported here rather than imported from `janitor-analysis` so that
/// `janitor-core` has no reverse dependency on the analysis crate; the
/// analysis crate's `Language` type converts into this one at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    JavaScriptTypeScript,
}

/// A half-open byte range `[start, end)` into a file's raw bytes.
///
/// Invariant: both ends always land on UTF-8 character boundaries of the
/// file content (see §8 invariant 2 of the specification this type
/// implements).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "ByteRange must be non-empty: {start}..{end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A line range, 1-indexed and inclusive, mirroring how editors and test
/// runners report locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

/// A single named top-level or class-scoped declaration extracted from
/// source.
///
/// Entities are immutable after extraction except for `protected_by`, which
/// the dead-symbol pipeline assigns exactly once, the first time a shield
/// matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    pub file_path: String,
    pub byte_range: ByteRange,
    pub line_range: LineRange,
    pub qualified_name: String,
    pub parent_class: Option<String>,
    pub base_classes: Vec<String>,
    pub decorators: Vec<String>,
    pub structural_hash: Option<u64>,
    pub protected_by: Option<String>,
}

impl Entity {
    pub fn symbol_id(&self) -> SymbolId {
        SymbolId::new(&self.file_path, &self.qualified_name)
    }

    /// True once a shield has claimed this entity; the pipeline uses this to
    /// short-circuit the remaining shields (§4.8: "the first matching
    /// shield assigns `protected_by`").
    pub fn is_protected(&self) -> bool {
        self.protected_by.is_some()
    }

    /// Dunder methods (`__init__`, `__eq__`, ...) are the target of the
    /// constructor shield: names that both start and end with `__`.
    pub fn is_dunder(&self) -> bool {
        self.name.starts_with("__") && self.name.ends_with("__") && self.name.len() > 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Entity {
        Entity {
            name: "__init__".into(),
            kind: EntityKind::Method,
            file_path: "a.py".into(),
            byte_range: ByteRange::new(0, 10),
            line_range: LineRange { start: 1, end: 2 },
            qualified_name: "C.__init__".into(),
            parent_class: Some("C".into()),
            base_classes: vec![],
            decorators: vec![],
            structural_hash: None,
            protected_by: None,
        }
    }

    #[test]
    fn dunder_detection() {
        assert!(sample().is_dunder());
        let mut e = sample();
        e.name = "_helper".into();
        assert!(!e.is_dunder());
    }

    #[test]
    fn symbol_id_uses_qualified_name() {
        let e = sample();
        assert_eq!(e.symbol_id().as_str(), "a.py::C.__init__");
    }
}
