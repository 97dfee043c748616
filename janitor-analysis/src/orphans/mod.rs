//! Orphan Detector (C6, §4.6). Grounded on `drift-analysis`'s coupling-graph
//! module's in-degree reasoning (`structural/coupling/cycle_detection.rs`):
//! orphan detection uses in-degree, not reachability, so cyclic import
//! graphs need no special handling here (§9: "cycles are fine").

use std::path::Path;

use janitor_core::constants::IMMORTAL_DIRS;
use janitor_core::types::FileGraph;

use crate::parser::Language;

const PYTHON_ENTRY_MARKER: &str = "__name__";
const PYTHON_MAIN_GUARD_PATTERNS: &[&str] = &[
    "if __name__ == \"__main__\"",
    "if __name__ == '__main__'",
];

/// Whether `path` lies under one of the immortal directories (§4.6,
/// GLOSSARY): matched by exact path-segment name anywhere in the path, not
/// substring, the same rule §4.5 uses for excluded directories.
pub fn is_immortal_directory(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|name| IMMORTAL_DIRS.contains(&name))
            .unwrap_or(false)
    })
}

/// Whether `source_text` contains a Python "run as script" guard (§4.6).
/// Cheap substring check rather than a full CST query: this is purely an
/// orphan-entry-point heuristic, not an extracted entity.
fn has_python_entry_marker(source_text: &str) -> bool {
    source_text.contains(PYTHON_ENTRY_MARKER)
        && PYTHON_MAIN_GUARD_PATTERNS
            .iter()
            .any(|p| source_text.contains(p))
}

/// Whether `path`'s file stem is `index` (JS/TS entry-point convention,
/// §4.6: "being named `index.*` for JS/TS").
fn is_js_index_entry(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| stem == "index")
        .unwrap_or(false)
}

/// Whether `path` is recognised as a project entry point by the same
/// markers §4.6 uses to spare orphan files: a Python "run as script" guard,
/// or a JS/TS `index.*` convention. Reused by the dead-symbol pipeline's
/// entry-point shield (§4.8 shield 4) to spare an entry file's top-level
/// declarations even when the file itself happens to have no callers.
pub fn is_entry_point_file(path: &Path, source_text: &str, language: Language) -> bool {
    if language.is_python() {
        has_python_entry_marker(source_text)
    } else {
        is_js_index_entry(path)
    }
}

/// A file is an orphan iff all three conditions in §4.6 hold: zero
/// in-degree, not under an immortal directory, and no entry-point marker.
pub fn is_orphan(
    path: &Path,
    source_text: &str,
    language: Language,
    graph: &FileGraph,
) -> bool {
    let normalized = super::depgraph::normalize(path);
    if graph.in_degree(&normalized) > 0 {
        return false;
    }
    if is_immortal_directory(path) {
        return false;
    }
    if language.is_python() {
        if has_python_entry_marker(source_text) {
            return false;
        }
    } else if is_js_index_entry(path) {
        return false;
    }
    true
}

/// Run orphan detection over every known file, given a lookup for its
/// source text and language (already parsed/read during Phase 1).
pub fn detect_orphans<'a>(
    files: impl IntoIterator<Item = (&'a Path, &'a str, Language)>,
    graph: &FileGraph,
) -> Vec<String> {
    files
        .into_iter()
        .filter(|(path, source, language)| is_orphan(path, source, *language, graph))
        .map(|(path, _, _)| super::depgraph::normalize(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_indegree_file_is_orphan() {
        let graph = FileGraph::new();
        assert!(is_orphan(
            Path::new("/proj/unused.py"),
            "x = 1",
            Language::Python,
            &graph
        ));
    }

    #[test]
    fn referenced_file_is_not_orphan() {
        let mut graph = FileGraph::new();
        graph.add_edge("/proj/a.py", "/proj/b.py");
        assert!(!is_orphan(Path::new("/proj/b.py"), "x = 1", Language::Python, &graph));
    }

    #[test]
    fn immortal_directory_protects_orphan() {
        let graph = FileGraph::new();
        assert!(!is_orphan(
            Path::new("/proj/tests/test_thing.py"),
            "x = 1",
            Language::Python,
            &graph
        ));
    }

    #[test]
    fn python_main_guard_protects_orphan() {
        let graph = FileGraph::new();
        assert!(!is_orphan(
            Path::new("/proj/cli.py"),
            "if __name__ == \"__main__\":\n    main()",
            Language::Python,
            &graph
        ));
    }

    #[test]
    fn js_index_entry_protected() {
        let graph = FileGraph::new();
        assert!(!is_orphan(
            Path::new("/proj/src/index.ts"),
            "export {}",
            Language::TypeScript,
            &graph
        ));
    }
}
