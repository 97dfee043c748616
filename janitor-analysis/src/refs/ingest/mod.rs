//! Ingestion protocol (§4.7): "For each parsed file, walk the CST a
//! second time collecting candidate references." One walker per language
//! family, mirroring the split in `entities/`. Each walker also applies
//! the language-specific heuristics listed in §4.7 that synthesise a
//! reference even when the symbol never appears in a call position.

pub mod javascript;
pub mod python;

use janitor_core::types::entity::ByteRange;

use crate::parser::Cst;

/// Lossy-decode one entity's byte range directly from the raw source
/// buffer, never from an already-lossy whole-file string — decoding the
/// whole file first and then slicing by the original byte offsets would
/// desync if any replacement character changed the byte length (§7
/// EncodingWarning).
fn slice_lossy(cst: &Cst, range: ByteRange) -> String {
    let end = range.end.min(cst.source.len());
    let start = range.start.min(end);
    String::from_utf8_lossy(&cst.source[start..end]).into_owned()
}

fn last_segment(dotted: &str) -> String {
    dotted.rsplit('.').next().unwrap_or(dotted).to_string()
}
