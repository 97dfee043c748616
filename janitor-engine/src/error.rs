//! `EngineError` — the Orchestrator's own error type, wrapping every
//! lower-layer taxonomy in one `Result` a caller can match on (§7:
//! "the core distinguishes user-visible verdicts... from internal
//! diagnostics").

use janitor_core::errors::error_code::JanitorErrorCode;
use janitor_core::errors::{AnalysisError, MutationError, SandboxError, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("mutation failed: {0}")]
    Mutation(#[from] MutationError),

    #[error("test sandbox error: {0}")]
    Sandbox(#[from] SandboxError),
}

impl JanitorErrorCode for EngineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Analysis(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Mutation(e) => e.error_code(),
            Self::Sandbox(e) => e.error_code(),
        }
    }
}

/// Maps an `EngineError` surfacing from `clean()` to its §6 exit code. Only
/// covers errors that abort the run outright; the rollback/commit verdicts
/// that `clean()` resolves *without* an `Err` carry their own exit code on
/// [`crate::report::CleanReport`] directly.
pub fn exit_code_for_error(error: &EngineError) -> i32 {
    match error {
        // §6: "unwritable trash directory or other pre-flight failure" —
        // neither variant has touched the filesystem yet when it fires.
        EngineError::Mutation(MutationError::SessionAlreadyActive { .. })
        | EngineError::Mutation(MutationError::BackupFailure { .. }) => 3,
        // §6: "concurrent modification or test-collection error".
        EngineError::Mutation(MutationError::ConcurrentModification { .. })
        | EngineError::Sandbox(_) => 2,
        _ => 2,
    }
}
