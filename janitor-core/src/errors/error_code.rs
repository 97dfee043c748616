//! Stable string error codes, independent of `Display` text, so tooling can
//! match on them without parsing messages.

pub const PARSE_FAILURE: &str = "JAN-001";
pub const RESOLUTION_AMBIGUITY: &str = "JAN-002";
pub const CACHE_MISS: &str = "JAN-010";
pub const CACHE_CORRUPTION: &str = "JAN-011";
pub const DB_BUSY: &str = "JAN-012";
pub const DB_CORRUPT: &str = "JAN-013";
pub const DISK_FULL: &str = "JAN-014";
pub const MIGRATION_FAILED: &str = "JAN-015";
pub const STORAGE_ERROR: &str = "JAN-019";
pub const CONCURRENT_MODIFICATION: &str = "JAN-020";
pub const BACKUP_FAILURE: &str = "JAN-021";
pub const MUTATION_WRITE_FAILURE: &str = "JAN-022";
pub const SESSION_ALREADY_ACTIVE: &str = "JAN-023";
pub const TEST_COLLECTION_ERROR: &str = "JAN-030";
pub const TEST_TIMEOUT: &str = "JAN-031";
pub const TEST_RUNNER_NOT_FOUND: &str = "JAN-032";
pub const RULE_PACK_INVALID: &str = "JAN-040";

/// Attach a stable error code to a `thiserror` enum. Implemented for each of
/// the four public error types so log lines and reports carry a code a
/// caller can match on without string-matching `Display` output.
pub trait JanitorErrorCode {
    fn error_code(&self) -> &'static str;
}
