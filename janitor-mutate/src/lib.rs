//! Safe-mutation engine (C10, §4.10) and test sandbox (C11, §4.11): the
//! two components that turn an audit's findings into an actual on-disk
//! change, with a backup-and-restore floor under every byte written and a
//! test-fingerprint ceiling over every mutation accepted.

pub mod backup;
pub mod manifest;
pub mod mutator;
pub mod orphan_sweep;
pub mod sandbox;
pub mod splice;

pub use backup::BackupStore;
pub use manifest::{EntryStatus, Manifest, ManifestEntry};
pub use mutator::{
    hash_content, FileMutationPlan, FileMutationResult, MutationSummary, OrphanFilePlan, SafeMutator,
};
pub use sandbox::{evaluate, MutationVerdict, RunnerFamily, TestOutcome, TestSandbox};
