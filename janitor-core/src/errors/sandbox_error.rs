//! Errors from the test sandbox (§4.11, §7).

use super::error_code::{self, JanitorErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The test runner could not even collect tests (import error, etc.).
    /// Treated as new-failure-set = everything; rollback unconditionally.
    #[error("test collection failed (exit code {exit_code}): {output}")]
    CollectionError { exit_code: i32, output: String },

    /// Wall-clock exceeded; subprocess terminated. Per §7, treated the same
    /// as `CollectionError`.
    #[error("test run exceeded the wall-clock timeout of {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("no test command could be autodetected for this project")]
    NoRunnerDetected,

    #[error("configured test command failed to start: {command}: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl JanitorErrorCode for SandboxError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CollectionError { .. } => error_code::TEST_COLLECTION_ERROR,
            Self::Timeout { .. } => error_code::TEST_TIMEOUT,
            Self::NoRunnerDetected | Self::SpawnFailed { .. } => error_code::TEST_RUNNER_NOT_FOUND,
        }
    }
}
