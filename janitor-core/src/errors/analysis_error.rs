//! Errors that abort an analysis run outright.
//!
//! `ParseFailure` and `ResolutionAmbiguity` from §7 are *not* represented
//! here: per the propagation policy, both are local and recovered silently
//! (skip the file / emit edges to all matches) rather than surfaced as a
//! `Result::Err`. This type only covers failures that stop the whole run.

use super::error_code::{self, JanitorErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("project root does not exist or is not a directory: {path}")]
    InvalidRoot { path: String },

    #[error("failed to walk project tree: {message}")]
    WalkFailed { message: String },

    #[error("rule pack error: {0}")]
    RulePack(#[from] super::detection_error::DetectionError),

    #[error("storage error: {0}")]
    Storage(#[from] super::storage_error::StorageError),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl JanitorErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RulePack(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            _ => error_code::PARSE_FAILURE,
        }
    }
}
