//! File fingerprinting (§4.9): the mtime+size fast pre-check that lets an
//! unchanged file skip re-hashing and re-parsing entirely — the mechanism
//! behind the near-O(1) no-change audit and the "parses nothing, reuses
//! everything" guarantee on a repeat run over an untouched tree. Grounded
//! on `drift-analysis`'s `engine/incremental.rs` `needs_analysis()`
//! content-hash check, retargeted from "skip re-lint" to "skip re-parse".

use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use xxhash_rust::xxh3::xxh3_64;

use janitor_core::traits::cache_store::FileMetadataRow;

/// A file's identity as observed on disk right now, cheap to obtain via a
/// single `stat` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFingerprint {
    pub mtime_secs: i64,
    pub mtime_nanos: i64,
    pub size: i64,
}

impl FileFingerprint {
    pub fn stat(path: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let modified = metadata.modified()?;
        let since_epoch = modified.duration_since(UNIX_EPOCH).unwrap_or_default();
        Ok(Self {
            mtime_secs: since_epoch.as_secs() as i64,
            mtime_nanos: since_epoch.subsec_nanos() as i64,
            size: metadata.len() as i64,
        })
    }

    fn matches_row(&self, row: &FileMetadataRow) -> bool {
        self.mtime_secs == row.mtime_secs
            && self.mtime_nanos == row.mtime_nanos
            && self.size == row.size
    }
}

/// Outcome of the fast pre-check (§4.9).
pub enum FreshnessCheck {
    /// `mtime`+`size` matched the recorded row exactly: the caller can
    /// reuse `content_hash` and every row keyed by it without reading the
    /// file's bytes at all.
    UnchangedTrusted { content_hash: Vec<u8> },
    /// No row, or `mtime`/`size` differ from what's recorded: the caller
    /// must read the file and hash it with [`hash_content`] to find out
    /// whether the content actually changed (a `touch` with no edits still
    /// lands here, and will come back unchanged once hashed).
    NeedsRehash,
}

pub fn check_freshness(
    fingerprint: &FileFingerprint,
    cached: Option<&FileMetadataRow>,
) -> FreshnessCheck {
    match cached {
        Some(row) if fingerprint.matches_row(row) => FreshnessCheck::UnchangedTrusted {
            content_hash: row.content_hash.clone(),
        },
        _ => FreshnessCheck::NeedsRehash,
    }
}

/// Full content hash, computed whenever the fast pre-check can't
/// short-circuit. `xxh3_64` matches the hash the parser adapter already
/// uses for its own parse-tree cache key, so a file's identity is
/// consistent across both cache layers.
pub fn hash_content(bytes: &[u8]) -> Vec<u8> {
    xxh3_64(bytes).to_be_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(mtime_secs: i64, mtime_nanos: i64, size: i64, hash: &[u8]) -> FileMetadataRow {
        FileMetadataRow {
            path: "a.py".to_string(),
            mtime_secs,
            mtime_nanos,
            size,
            content_hash: hash.to_vec(),
            last_analyzed_at: 0,
        }
    }

    #[test]
    fn matching_fingerprint_trusts_cached_hash() {
        let fp = FileFingerprint { mtime_secs: 10, mtime_nanos: 5, size: 100 };
        let cached = row(10, 5, 100, b"abc");
        match check_freshness(&fp, Some(&cached)) {
            FreshnessCheck::UnchangedTrusted { content_hash } => assert_eq!(content_hash, b"abc"),
            FreshnessCheck::NeedsRehash => panic!("expected trusted"),
        }
    }

    #[test]
    fn mismatched_size_forces_rehash() {
        let fp = FileFingerprint { mtime_secs: 10, mtime_nanos: 5, size: 101 };
        let cached = row(10, 5, 100, b"abc");
        assert!(matches!(
            check_freshness(&fp, Some(&cached)),
            FreshnessCheck::NeedsRehash
        ));
    }

    #[test]
    fn no_cached_row_forces_rehash() {
        let fp = FileFingerprint { mtime_secs: 10, mtime_nanos: 5, size: 100 };
        assert!(matches!(check_freshness(&fp, None), FreshnessCheck::NeedsRehash));
    }

    #[test]
    fn hash_content_is_deterministic() {
        assert_eq!(hash_content(b"hello"), hash_content(b"hello"));
        assert_ne!(hash_content(b"hello"), hash_content(b"world"));
    }
}
