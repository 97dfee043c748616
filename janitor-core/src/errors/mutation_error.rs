//! Errors from the safe-mutation engine (§4.10, §7).

use super::error_code::{self, JanitorErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// The file's content hash changed between analysis and mutation.
    /// Per §7: abort the mutation session before *any* write; no backups
    /// needed.
    #[error("file changed since analysis, aborting mutation session: {path}")]
    ConcurrentModification { path: String },

    /// Could not create a backup copy. Per §7: abort the whole mutation
    /// session before modifying the target file.
    #[error("failed to back up {path}: {source}")]
    BackupFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A write to a modified file failed. Per §7: immediately invoke
    /// `restore_all`.
    #[error("failed to write mutated {path}: {source}")]
    WriteFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Two concurrent mutation sessions on the same project root; §5
    /// mandates refusing the second.
    #[error("a mutation session is already active for this project (session {session_id})")]
    SessionAlreadyActive { session_id: String },

    /// A byte range could not be snapped to a UTF-8 boundary without
    /// crossing into non-UTF-8 bytes; the entity is skipped, not deleted.
    #[error("cannot splice non-UTF-8-safe range in {path}: {start}..{end}")]
    NonUtf8Range { path: String, start: usize, end: usize },

    #[error("I/O error restoring {path}: {source}")]
    RestoreFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl JanitorErrorCode for MutationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConcurrentModification { .. } => error_code::CONCURRENT_MODIFICATION,
            Self::BackupFailure { .. } => error_code::BACKUP_FAILURE,
            Self::WriteFailure { .. } | Self::RestoreFailure { .. } => {
                error_code::MUTATION_WRITE_FAILURE
            }
            Self::SessionAlreadyActive { .. } => error_code::SESSION_ALREADY_ACTIVE,
            Self::NonUtf8Range { .. } => error_code::MUTATION_WRITE_FAILURE,
        }
    }
}
