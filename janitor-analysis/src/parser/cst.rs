//! `Cst` — a parsed file: the tree-sitter tree, its source bytes, and the
//! detected language, bundled so every downstream walker has everything it
//! needs without re-threading three parameters through every call (§4.1:
//! "a CST with byte ranges and a shared immutable byte buffer per file").

use std::sync::Arc;

use tree_sitter::Tree;

use super::language::Language;

#[derive(Clone)]
pub struct Cst {
    pub tree: Arc<Tree>,
    pub source: Arc<[u8]>,
    pub language: Language,
    pub file_path: String,
}

impl Cst {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Slice raw source bytes by a tree-sitter byte range. The adapter never
    /// assumes UTF-8 until this slice is taken and converted (§4.1).
    pub fn text_of(&self, node: &tree_sitter::Node) -> &[u8] {
        &self.source[node.byte_range()]
    }

    /// Lossy UTF-8 view of a node's text, used everywhere a human-readable
    /// string (decorator text, identifier name) is needed; malformed bytes
    /// become replacement characters rather than a hard failure (§7
    /// EncodingWarning: never abort extraction for an encoding issue).
    pub fn text_of_lossy(&self, node: &tree_sitter::Node) -> String {
        String::from_utf8_lossy(self.text_of(node)).into_owned()
    }
}
