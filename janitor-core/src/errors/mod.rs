//! Error taxonomy for the janitor engine.
//!
//! Every error type here maps to one row of §7's taxonomy. Parse- and
//! resolution-level errors are recovered locally and never reach these
//! types; only errors that must surface to a caller (storage, mutation,
//! sandbox, rule-pack loading) get a `thiserror` enum.

pub mod analysis_error;
pub mod detection_error;
pub mod error_code;
pub mod mutation_error;
pub mod sandbox_error;
pub mod storage_error;

pub use analysis_error::AnalysisError;
pub use detection_error::DetectionError;
pub use mutation_error::MutationError;
pub use sandbox_error::SandboxError;
pub use storage_error::StorageError;
