//! Byte-range surgical deletion (§4.10 steps 3-4). Entities are sorted by
//! `byte_range.start` descending and spliced out back-to-front so earlier
//! ranges in the same file never shift under a later splice (§5:
//! "Mutations to a given file are serialised and apply bottom-to-top
//! within the file").

use janitor_core::types::entity::ByteRange;
use janitor_core::types::Entity;

/// Snap `range` to the nearest UTF-8 character boundaries: `start` moves
/// backward to the nearest boundary at or before it, `end` moves forward to
/// the nearest boundary at or after it. Returns `None` if the buffer is too
/// short for the range, or if snapping collapses the range entirely (no
/// "end >= start" after backing off a degenerate single-byte slice) — the
/// caller skips the entity per §7 `EncodingWarning`: "if splicing would
/// require it, skip the entity."
pub fn snap_to_char_boundaries(buffer: &[u8], range: ByteRange) -> Option<(usize, usize)> {
    let len = buffer.len();
    if range.start > len || range.end > len {
        return None;
    }
    let mut start = range.start;
    while start > 0 && !is_char_boundary(buffer, start) {
        start -= 1;
    }
    let mut end = range.end;
    while end < len && !is_char_boundary(buffer, end) {
        end += 1;
    }
    if end < start {
        return None;
    }
    Some((start, end))
}

fn is_char_boundary(buffer: &[u8], index: usize) -> bool {
    match buffer.get(index) {
        None => index == buffer.len(),
        Some(&byte) => (byte as i8) >= -0x40,
    }
}

/// Splice every entity's byte range out of `buffer`, in descending
/// start-offset order, skipping any entity whose range can't be safely
/// snapped. Returns the new buffer and the entities actually removed (for
/// the caller's orphan-import sweep and report).
pub fn splice_entities<'a>(buffer: &[u8], entities: &'a [Entity]) -> (Vec<u8>, Vec<&'a Entity>) {
    let mut sorted: Vec<&Entity> = entities.iter().collect();
    sorted.sort_by(|a, b| b.byte_range.start.cmp(&a.byte_range.start));

    let mut out = buffer.to_vec();
    let mut removed = Vec::with_capacity(sorted.len());

    for entity in sorted {
        match snap_to_char_boundaries(&out, entity.byte_range) {
            Some((start, end)) if start < end => {
                out.drain(start..end);
                removed.push(entity);
            }
            _ => {
                tracing::warn!(
                    file = %entity.file_path,
                    name = %entity.name,
                    "skipping entity whose byte range can't be safely spliced"
                );
            }
        }
    }

    removed.reverse();
    (out, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use janitor_core::types::entity::{EntityKind, LineRange};

    fn entity(start: usize, end: usize) -> Entity {
        Entity {
            name: "dead".to_string(),
            kind: EntityKind::Function,
            file_path: "a.py".to_string(),
            byte_range: ByteRange::new(start, end),
            line_range: LineRange { start: 1, end: 1 },
            qualified_name: "dead".to_string(),
            parent_class: None,
            base_classes: vec![],
            decorators: vec![],
            structural_hash: None,
            protected_by: None,
        }
    }

    #[test]
    fn splices_single_entity() {
        let buf = b"def live(): pass\ndef dead(): pass\n";
        let start = 18;
        let end = 34;
        assert_eq!(&buf[start..end], b"def dead(): pass\n");
        let e = entity(start, end);
        let (out, removed) = splice_entities(buf, &[e]);
        assert_eq!(out, b"def live(): pass\n");
        assert_eq!(removed.len(), 1);
    }

    #[test]
    fn splices_bottom_to_top_so_earlier_ranges_are_unaffected() {
        let buf = b"AAAABBBBCCCC";
        let e1 = entity(0, 4); // AAAA
        let e2 = entity(8, 12); // CCCC
        let (out, removed) = splice_entities(buf, &[e1, e2]);
        assert_eq!(out, b"BBBB");
        assert_eq!(removed.len(), 2);
    }

    #[test]
    fn multibyte_boundary_is_respected() {
        // "café" -> c(1) a(1) f(1) é(2 bytes). Range [0,4) would bisect é.
        let buf = "café!".as_bytes();
        let e = entity(0, 4);
        let (out, _removed) = splice_entities(buf, &[e]);
        // snapped end moves forward past the full 'é' to a boundary, so the
        // splice removes "caf\u{e9}" intact rather than truncating a byte.
        assert_eq!(String::from_utf8(out).unwrap(), "!");
    }

    #[test]
    fn out_of_bounds_range_is_skipped_not_panicked() {
        let buf = b"short";
        let e = entity(0, 100);
        let (out, removed) = splice_entities(buf, &[e]);
        assert_eq!(out, buf);
        assert!(removed.is_empty());
    }
}
