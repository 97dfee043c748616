//! `SafeMutator` — the Safe Mutator (C10, §4.10). Exposes
//! `delete_symbols`/`restore_all` over a set of files, backed by
//! [`crate::backup::BackupStore`] for the backup-and-restore half and
//! [`crate::splice`]/[`crate::orphan_sweep`] for the byte-surgery half. No
//! direct teacher counterpart — `drift` never mutates source, only reports
//! on it — built from first principles in the teacher's RAII/error-
//! propagation idiom: one `thiserror` variant per §7 failure mode, atomic
//! temp-file+rename writes for the final commit of each file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use janitor_core::errors::MutationError;
use janitor_core::types::entity::Language;
use janitor_core::types::Entity;

use crate::backup::BackupStore;
use crate::orphan_sweep;
use crate::splice;

/// One file's worth of planned deletions, as handed to `delete_symbols`.
/// `expected_content_hash` is the hash captured when the entities were
/// analyzed; if the file has since changed, the whole session aborts
/// before any write (§4.10 step 1, §7 `ConcurrentModification`).
pub struct FileMutationPlan {
    /// Path relative to the project root, used as the manifest/backup key.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub expected_content_hash: Vec<u8>,
    pub entities: Vec<Entity>,
    pub language: Language,
}

/// Outcome of one `delete_symbols` call: per-file counts of entities
/// actually removed (after the snap-to-boundary skip) and whether its
/// orphan-import sweep fired.
#[derive(Debug, Clone)]
pub struct FileMutationResult {
    pub relative_path: String,
    pub entities_removed: usize,
}

pub struct MutationSummary {
    pub files: Vec<FileMutationResult>,
}

/// One orphan file slated for wholesale removal (spec: orphan files are
/// "excised in place" alongside dead symbols, not just reported). Shares
/// the same concurrent-modification precondition as [`FileMutationPlan`].
pub struct OrphanFilePlan {
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub expected_content_hash: Vec<u8>,
}

pub fn hash_content(bytes: &[u8]) -> Vec<u8> {
    xxhash_rust::xxh3::xxh3_64(bytes).to_be_bytes().to_vec()
}

pub struct SafeMutator {
    project_root: PathBuf,
    backups: BackupStore,
}

impl SafeMutator {
    pub fn new(project_root: &Path, session_dir: &Path) -> Result<Self, MutationError> {
        Ok(Self {
            project_root: project_root.to_path_buf(),
            backups: BackupStore::new(project_root, session_dir)?,
        })
    }

    /// Delete the given entities from their files (§4.10 steps 1-6). Aborts
    /// the *whole session* before any write if any plan's file hash has
    /// drifted from the analysis-time hash (step 1), or if a backup can't
    /// be made (step 2) — both per §7's "abort before any write" policy. A
    /// write failure partway through, however, only rolls back what's been
    /// touched so far, via the caller invoking [`Self::restore_all`]
    /// immediately (§7 `MutationWriteFailure`).
    pub fn delete_symbols(
        &mut self,
        plans: Vec<FileMutationPlan>,
    ) -> Result<MutationSummary, MutationError> {
        // Step 1, whole-session precondition: verify every file's current
        // hash before touching anything, so a concurrent edit to file B
        // doesn't leave file A partially mutated.
        for plan in &plans {
            let current = fs::read(&plan.absolute_path).map_err(|source| {
                MutationError::BackupFailure {
                    path: plan.absolute_path.display().to_string(),
                    source,
                }
            })?;
            if hash_content(&current) != plan.expected_content_hash {
                return Err(MutationError::ConcurrentModification {
                    path: plan.relative_path.clone(),
                });
            }
        }

        let mut results = Vec::with_capacity(plans.len());
        for plan in plans {
            let result = self.mutate_one_file(plan)?;
            results.push(result);
        }
        Ok(MutationSummary { files: results })
    }

    fn mutate_one_file(&mut self, plan: FileMutationPlan) -> Result<FileMutationResult, MutationError> {
        let original_bytes = fs::read(&plan.absolute_path).map_err(|source| {
            MutationError::BackupFailure {
                path: plan.absolute_path.display().to_string(),
                source,
            }
        })?;

        if !self.backups.is_backed_up(&plan.relative_path) {
            let hash_hex = hex_encode(&plan.expected_content_hash);
            self.backups
                .backup_if_needed(&plan.relative_path, &plan.absolute_path, &hash_hex)?;
        }

        let (spliced, removed) = splice::splice_entities(&original_bytes, &plan.entities);

        let removed_names: HashSet<String> = removed.iter().map(|e| e.name.clone()).collect();
        let spliced_text = String::from_utf8_lossy(&spliced).into_owned();
        let swept_text = orphan_sweep::sweep(&spliced_text, &removed_names, plan.language);

        write_atomic(&plan.absolute_path, swept_text.as_bytes()).map_err(|source| {
            MutationError::WriteFailure {
                path: plan.absolute_path.display().to_string(),
                source,
            }
        })?;

        Ok(FileMutationResult {
            relative_path: plan.relative_path,
            entities_removed: removed.len(),
        })
    }

    /// Delete whole orphan files (backing each up first), reusing the same
    /// whole-session precondition as [`Self::delete_symbols`]: every file's
    /// current hash is checked before any removal happens, so a concurrent
    /// edit elsewhere aborts the batch before touching disk.
    pub fn delete_orphan_files(&mut self, plans: Vec<OrphanFilePlan>) -> Result<Vec<String>, MutationError> {
        for plan in &plans {
            let current = fs::read(&plan.absolute_path).map_err(|source| {
                MutationError::BackupFailure {
                    path: plan.absolute_path.display().to_string(),
                    source,
                }
            })?;
            if hash_content(&current) != plan.expected_content_hash {
                return Err(MutationError::ConcurrentModification {
                    path: plan.relative_path.clone(),
                });
            }
        }

        let mut removed = Vec::with_capacity(plans.len());
        for plan in plans {
            if !self.backups.is_backed_up(&plan.relative_path) {
                let hash_hex = hex_encode(&plan.expected_content_hash);
                self.backups
                    .backup_if_needed(&plan.relative_path, &plan.absolute_path, &hash_hex)?;
            }
            fs::remove_file(&plan.absolute_path).map_err(|source| MutationError::WriteFailure {
                path: plan.absolute_path.display().to_string(),
                source,
            })?;
            removed.push(plan.relative_path);
        }
        Ok(removed)
    }

    /// §4.10: "restore_all consults the manifest and copies every backup
    /// back to its original path... partial-success tolerant."
    pub fn restore_all(&mut self) -> Vec<MutationError> {
        self.backups.restore_all()
    }

    pub fn commit(self) -> Result<(), MutationError> {
        self.backups.commit()
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn touched_count(&self) -> usize {
        self.backups.touched_count()
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Write-then-rename so a crash mid-write never leaves a half-written file
/// in the original file's place (§4.10 step 6: "Write the buffer back
/// atomically (temp-file + rename)").
fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    std::io::Write::write_all(&mut tmp, content)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use janitor_core::types::entity::{ByteRange, EntityKind, LineRange};

    fn entity(name: &str, start: usize, end: usize) -> Entity {
        Entity {
            name: name.to_string(),
            kind: EntityKind::Function,
            file_path: "a.py".to_string(),
            byte_range: ByteRange::new(start, end),
            line_range: LineRange { start: 1, end: 1 },
            qualified_name: name.to_string(),
            parent_class: None,
            base_classes: vec![],
            decorators: vec![],
            structural_hash: None,
            protected_by: None,
        }
    }

    #[test]
    fn deletes_dead_symbol_and_commits() {
        let dir = tempfile::tempdir().unwrap();
        let project_root = dir.path().to_path_buf();
        let file_path = project_root.join("a.py");
        let content = b"def live(): pass\ndef dead(): pass\n".to_vec();
        fs::write(&file_path, &content).unwrap();

        let session_dir = project_root.join(".janitor_trash").join("sess1");
        let mut mutator = SafeMutator::new(&project_root, &session_dir).unwrap();

        let dead_start = 18;
        let dead_end = content.len();
        let plan = FileMutationPlan {
            relative_path: "a.py".to_string(),
            absolute_path: file_path.clone(),
            expected_content_hash: hash_content(&content),
            entities: vec![entity("dead", dead_start, dead_end)],
            language: Language::Python,
        };

        let summary = mutator.delete_symbols(vec![plan]).unwrap();
        assert_eq!(summary.files[0].entities_removed, 1);

        let after = fs::read_to_string(&file_path).unwrap();
        assert_eq!(after, "def live(): pass\n");

        mutator.commit().unwrap();
        assert!(!session_dir.exists());
    }

    #[test]
    fn concurrent_modification_aborts_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let project_root = dir.path().to_path_buf();
        let file_path = project_root.join("a.py");
        let original = b"def dead(): pass\n".to_vec();
        fs::write(&file_path, &original).unwrap();

        let stale_hash = hash_content(b"something else entirely");

        let session_dir = project_root.join(".janitor_trash").join("sess1");
        let mut mutator = SafeMutator::new(&project_root, &session_dir).unwrap();

        let plan = FileMutationPlan {
            relative_path: "a.py".to_string(),
            absolute_path: file_path.clone(),
            expected_content_hash: stale_hash,
            entities: vec![entity("dead", 0, original.len())],
            language: Language::Python,
        };

        let err = mutator.delete_symbols(vec![plan]).unwrap_err();
        assert!(matches!(err, MutationError::ConcurrentModification { .. }));
        assert_eq!(fs::read(&file_path).unwrap(), original);
    }

    #[test]
    fn rollback_restores_original_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let project_root = dir.path().to_path_buf();
        let file_path = project_root.join("a.py");
        let content = b"def live(): pass\ndef dead(): pass\n".to_vec();
        fs::write(&file_path, &content).unwrap();

        let session_dir = project_root.join(".janitor_trash").join("sess1");
        let mut mutator = SafeMutator::new(&project_root, &session_dir).unwrap();

        let plan = FileMutationPlan {
            relative_path: "a.py".to_string(),
            absolute_path: file_path.clone(),
            expected_content_hash: hash_content(&content),
            entities: vec![entity("dead", 18, content.len())],
            language: Language::Python,
        };
        mutator.delete_symbols(vec![plan]).unwrap();
        assert_ne!(fs::read(&file_path).unwrap(), content);

        let errors = mutator.restore_all();
        assert!(errors.is_empty());
        assert_eq!(fs::read(&file_path).unwrap(), content);
    }

    #[test]
    fn orphan_file_is_removed_then_restorable() {
        let dir = tempfile::tempdir().unwrap();
        let project_root = dir.path().to_path_buf();
        let file_path = project_root.join("orphan.py");
        let content = b"def unused(): pass\n".to_vec();
        fs::write(&file_path, &content).unwrap();

        let session_dir = project_root.join(".janitor_trash").join("sess1");
        let mut mutator = SafeMutator::new(&project_root, &session_dir).unwrap();

        let plan = OrphanFilePlan {
            relative_path: "orphan.py".to_string(),
            absolute_path: file_path.clone(),
            expected_content_hash: hash_content(&content),
        };
        let removed = mutator.delete_orphan_files(vec![plan]).unwrap();
        assert_eq!(removed, vec!["orphan.py".to_string()]);
        assert!(!file_path.exists());

        let errors = mutator.restore_all();
        assert!(errors.is_empty());
        assert_eq!(fs::read(&file_path).unwrap(), content);
    }
}
