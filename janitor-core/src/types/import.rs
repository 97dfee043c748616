//! `Import` — a single import-like statement extracted from a file.

use serde::{Deserialize, Serialize};

/// One imported name from one import statement. Multi-name imports
/// (`from x import a, b`) emit one `Import` per name, all sharing `module`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
    /// Dotted (Python) or path-like (JS/TS) module specifier as written.
    pub module: String,
    /// Local names bound by this import; empty for a bare module import
    /// (`import os`, `import './side-effects'`).
    pub names: Vec<String>,
    pub is_relative: bool,
    /// Number of leading dots for a Python relative import; `0` for
    /// absolute imports, always `>= 1` when `is_relative` is true.
    pub relative_level: u32,
    pub file_path: String,
}

impl Import {
    pub fn is_bare(&self) -> bool {
        self.names.is_empty()
    }
}
