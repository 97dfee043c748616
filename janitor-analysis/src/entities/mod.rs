//! Entity Extractor (C2, §4.2). Walks a [`Cst`] and emits [`Entity`] and
//! [`Import`] records. One walker per language family, dispatched by the
//! CST's detected language; the walk shape (depth-first, field-based child
//! access, decorator accumulation passed down through recursion) is
//! grounded on `drift-analysis`'s `call_graph/builder.rs` node-extraction
//! phase, retargeted from call-graph nodes to declaration records.

pub mod javascript;
pub mod python;

use janitor_core::types::{Entity, Import};

use crate::parser::{Cst, Language};

/// Everything the extractor produced for one file.
#[derive(Debug, Default, Clone)]
pub struct ExtractionResult {
    pub entities: Vec<Entity>,
    pub imports: Vec<Import>,
}

pub fn extract(cst: &Cst) -> ExtractionResult {
    match cst.language {
        Language::Python => python::extract(cst),
        Language::JavaScript | Language::TypeScript | Language::Jsx | Language::Tsx => {
            javascript::extract(cst)
        }
    }
}
