//! `Reference` — a single edge in the symbol-level reference graph.

use serde::{Deserialize, Serialize};

use super::identifiers::SymbolId;

/// The way a reference was discovered, preserved so shields and reports can
/// distinguish "really called" from "synthetically protected".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    Call,
    Attribute,
    Import,
    TypeHint,
    String,
    ConstructorShield,
    InheritanceShield,
}

impl ReferenceKind {
    /// Synthetic shield references never correspond to a textual call site;
    /// they exist purely to protect an entity the way §4.7 describes.
    pub fn is_synthetic(self) -> bool {
        matches!(self, ReferenceKind::ConstructorShield | ReferenceKind::InheritanceShield)
    }
}

/// An edge from a referring location to a resolved symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub source_file: String,
    pub source_symbol: Option<String>,
    pub target_symbol_id: SymbolId,
    pub kind: ReferenceKind,
}

impl Reference {
    /// Whether this reference crosses a file boundary relative to the
    /// entity it targets (shield 1a vs 1b in §4.8).
    pub fn is_cross_file(&self) -> bool {
        self.target_symbol_id
            .file_path()
            .map(|target_file| target_file != self.source_file)
            .unwrap_or(true)
    }
}
