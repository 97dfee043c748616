//! Atomic backup-and-restore (§4.10 step 2, §7 `BackupFailure`/
//! `RestoreFailure`). One `BackupStore` per mutation session, rooted at
//! `<project_root>/.janitor_trash/<session_id>/`, mirroring every touched
//! file's pre-mutation bytes and recording it in the session [`Manifest`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use janitor_core::errors::MutationError;

use crate::manifest::{EntryStatus, Manifest, ManifestEntry};

pub struct BackupStore {
    project_root: PathBuf,
    session_dir: PathBuf,
    manifest_path: PathBuf,
    manifest: Manifest,
}

impl BackupStore {
    pub fn new(project_root: &Path, session_dir: &Path) -> Result<Self, MutationError> {
        fs::create_dir_all(session_dir).map_err(|source| MutationError::BackupFailure {
            path: session_dir.display().to_string(),
            source,
        })?;
        let manifest_path = session_dir.join("manifest.json");
        let manifest = Manifest::load(&manifest_path)?;
        Ok(Self {
            project_root: project_root.to_path_buf(),
            session_dir: session_dir.to_path_buf(),
            manifest_path,
            manifest,
        })
    }

    pub fn is_backed_up(&self, relative: &str) -> bool {
        self.manifest.contains(relative)
    }

    /// Back up `absolute_path` (relative key `relative`) if not already
    /// backed up this session. Idempotent: a second call for the same file
    /// is a no-op (§4.10: "If the file is not yet backed up this session").
    pub fn backup_if_needed(
        &mut self,
        relative: &str,
        absolute_path: &Path,
        content_hash_hex: &str,
    ) -> Result<(), MutationError> {
        if self.manifest.contains(relative) {
            return Ok(());
        }

        let backup_path = self.session_dir.join(relative);
        if let Some(parent) = backup_path.parent() {
            fs::create_dir_all(parent).map_err(|source| MutationError::BackupFailure {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::copy(absolute_path, &backup_path).map_err(|source| MutationError::BackupFailure {
            path: absolute_path.display().to_string(),
            source,
        })?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.manifest.insert(ManifestEntry {
            original: relative.to_string(),
            backup: backup_path.display().to_string(),
            hash: content_hash_hex.to_string(),
            timestamp,
            status: EntryStatus::Pending,
        });
        self.manifest.save(&self.manifest_path)
    }

    /// Copy every backup back to its original path. Partial-success
    /// tolerant (§4.10: "a failure to restore file F does not abort the
    /// restoration of G") and idempotent (`restore_all(); restore_all()`
    /// equals `restore_all()`, §8): re-running after a clean restore simply
    /// re-copies the same bytes back over themselves.
    pub fn restore_all(&mut self) -> Vec<MutationError> {
        let mut errors = Vec::new();
        let entries: Vec<ManifestEntry> = self.manifest.entries().cloned().collect();
        for entry in entries {
            let backup_path = PathBuf::from(&entry.backup);
            let original_path = self.project_root.join(&entry.original);
            if let Err(source) = fs::copy(&backup_path, &original_path) {
                errors.push(MutationError::RestoreFailure {
                    path: original_path.display().to_string(),
                    source,
                });
                continue;
            }
        }
        self.manifest.set_status_all(EntryStatus::RolledBack);
        if let Err(e) = self.manifest.save(&self.manifest_path) {
            errors.push(e);
        }
        errors
    }

    /// Commit the session: the backups are no longer needed as a rollback
    /// source, so the whole session directory is removed (§4.10: "it is
    /// deleted only on explicit commit").
    pub fn commit(mut self) -> Result<(), MutationError> {
        self.manifest.set_status_all(EntryStatus::Committed);
        self.manifest.save(&self.manifest_path)?;
        fs::remove_dir_all(&self.session_dir).map_err(|source| MutationError::BackupFailure {
            path: self.session_dir.display().to_string(),
            source,
        })
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    pub fn touched_count(&self) -> usize {
        self.manifest.touched_paths().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_then_restore_round_trips_content() {
        let dir = tempfile::tempdir().unwrap();
        let project_root = dir.path().to_path_buf();
        let file_path = project_root.join("a.py");
        fs::write(&file_path, "original content\n").unwrap();

        let session_dir = project_root.join(".janitor_trash").join("sess1");
        let mut store = BackupStore::new(&project_root, &session_dir).unwrap();
        store.backup_if_needed("a.py", &file_path, "deadbeef").unwrap();

        fs::write(&file_path, "mutated content\n").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "mutated content\n");

        let errors = store.restore_all();
        assert!(errors.is_empty());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original content\n");
    }

    #[test]
    fn restore_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let project_root = dir.path().to_path_buf();
        let file_path = project_root.join("a.py");
        fs::write(&file_path, "original\n").unwrap();

        let session_dir = project_root.join(".janitor_trash").join("sess1");
        let mut store = BackupStore::new(&project_root, &session_dir).unwrap();
        store.backup_if_needed("a.py", &file_path, "h").unwrap();
        fs::write(&file_path, "mutated\n").unwrap();

        store.restore_all();
        let first = fs::read_to_string(&file_path).unwrap();
        store.restore_all();
        let second = fs::read_to_string(&file_path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "original\n");
    }

    #[test]
    fn second_backup_of_same_file_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let project_root = dir.path().to_path_buf();
        let file_path = project_root.join("a.py");
        fs::write(&file_path, "v1\n").unwrap();

        let session_dir = project_root.join(".janitor_trash").join("sess1");
        let mut store = BackupStore::new(&project_root, &session_dir).unwrap();
        store.backup_if_needed("a.py", &file_path, "h1").unwrap();

        fs::write(&file_path, "v2\n").unwrap();
        store.backup_if_needed("a.py", &file_path, "h2").unwrap();

        // Backup should still hold v1, not v2, since the second call is a
        // no-op.
        let backup_path = session_dir.join("a.py");
        assert_eq!(fs::read_to_string(backup_path).unwrap(), "v1\n");
    }
}
