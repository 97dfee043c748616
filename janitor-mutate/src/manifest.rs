//! The mutation-session manifest (§4.10, §6): `manifest.json` under
//! `<trash_root>/<session_id>/`, enumerating every touched path with its
//! pre-mutation hash and status. The backup directory is the single source
//! of truth for rollback (§4.10) — this file is its index.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use janitor_core::errors::MutationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Committed,
    RolledBack,
}

/// One manifest entry: `{original, backup, hash, timestamp}` plus a status
/// field tracking the session's eventual disposition (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub original: String,
    pub backup: String,
    /// Content hash captured at backup time, hex-encoded.
    pub hash: String,
    pub timestamp: u64,
    pub status: EntryStatus,
}

/// Read-modify-write manifest bound to one mutation session's directory.
/// Not internally synchronized — one mutation session owns one
/// `SafeMutator`, and §5 mandates refusing a second concurrent session on
/// the same project, so there is never more than one writer.
#[derive(Debug, Default)]
pub struct Manifest {
    entries: HashMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, MutationError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path).map_err(|source| MutationError::BackupFailure {
            path: path.display().to_string(),
            source,
        })?;
        let list: Vec<ManifestEntry> = serde_json::from_str(&text).unwrap_or_default();
        Ok(Self {
            entries: list.into_iter().map(|e| (e.original.clone(), e)).collect(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), MutationError> {
        let list: Vec<&ManifestEntry> = self.entries.values().collect();
        let json = serde_json::to_string_pretty(&list).unwrap_or_else(|_| "[]".to_string());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| MutationError::BackupFailure {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| MutationError::BackupFailure {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn contains(&self, original: &str) -> bool {
        self.entries.contains_key(original)
    }

    pub fn insert(&mut self, entry: ManifestEntry) {
        self.entries.insert(entry.original.clone(), entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.values()
    }

    pub fn set_status_all(&mut self, status: EntryStatus) {
        for entry in self.entries.values_mut() {
            entry.status = status;
        }
    }

    pub fn touched_paths(&self) -> Vec<PathBuf> {
        self.entries.keys().map(PathBuf::from).collect()
    }
}
