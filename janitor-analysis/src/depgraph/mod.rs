//! Dependency Graph Builder (C5, §4.5). Resolves every [`Import`] to zero
//! or more target files and emits a [`FileGraph`]. Grounded on
//! `drift-analysis`'s `structural/coupling/cycle_detection.rs` petgraph
//! usage and `call_graph/builder.rs`'s multi-strategy resolution-index
//! shape, retargeted to file-level import resolution.

mod javascript;
mod python;
mod walk;

pub use walk::{walk_all_files, walk_source_files};

use std::path::{Path, PathBuf};

use janitor_core::types::{FileGraph, Import};
use janitor_core::types::collections::FxHashSet;

use crate::parser::Language;

/// The set of canonical file paths known to the project scan. Resolution
/// only ever resolves *into* this set — an import that doesn't land on a
/// known file is dropped silently (§4.5: "Unresolved imports are dropped
/// silently").
pub struct KnownFiles {
    paths: FxHashSet<String>,
    root: PathBuf,
    has_src_root: bool,
}

impl KnownFiles {
    pub fn new(root: &Path, paths: impl IntoIterator<Item = String>) -> Self {
        let paths: FxHashSet<String> = paths.into_iter().collect();
        let has_src_root = paths.iter().any(|p| {
            Path::new(p)
                .strip_prefix(root)
                .ok()
                .and_then(|rel| rel.components().next())
                .map(|c| c.as_os_str() == "src")
                .unwrap_or(false)
        });
        Self {
            paths,
            root: root.to_path_buf(),
            has_src_root,
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(&normalize(path))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_src_root(&self) -> bool {
        self.has_src_root
    }
}

/// Canonicalize separators (never touches the filesystem — callers already
/// canonicalized at scan time) so the same file never produces two
/// differently-spelled graph keys on different platforms (§4.5).
pub fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

pub struct DependencyGraphBuilder<'a> {
    known: &'a KnownFiles,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(known: &'a KnownFiles) -> Self {
        Self { known }
    }

    /// Resolve one import to every target file it could refer to (almost
    /// always 0 or 1, occasionally more for an ambiguous bare package
    /// import matching several `__init__.py` candidates, though the "stop
    /// at the first resolution" rule in §4.5 generally collapses this to
    /// at most one).
    pub fn resolve(&self, import: &Import, language: Language) -> Vec<PathBuf> {
        let importer = Path::new(&import.file_path);
        if language.is_python() {
            python::resolve(self.known, importer, import)
        } else {
            javascript::resolve(self.known, importer, import)
        }
    }

    /// Build the full file graph from every import collected across the
    /// project, one edge per (importer, resolved target) pair.
    pub fn build(&self, imports: &[(Import, Language)]) -> FileGraph {
        let mut graph = FileGraph::new();
        for path in self.known.paths.iter() {
            graph.ensure_node(path);
        }
        for (import, language) in imports {
            for target in self.resolve(import, *language) {
                graph.add_edge(&normalize(Path::new(&import.file_path)), &normalize(&target));
            }
        }
        graph
    }
}
