//! Event payload structs, one per `JanitorEventHandler` callback.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AuditStartedEvent {
    pub root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PhaseStartedEvent {
    pub phase: &'static str,
}

#[derive(Debug, Clone)]
pub struct PhaseProgressEvent {
    pub phase: &'static str,
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct PhaseCompleteEvent {
    pub phase: &'static str,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct AuditCompleteEvent {
    pub orphan_count: usize,
    pub dead_symbol_count: usize,
    pub protected_count: usize,
    pub duration_ms: u64,
    pub from_cache: bool,
}

#[derive(Debug, Clone)]
pub struct MutationSessionStartedEvent {
    pub session_id: String,
    pub file_count: usize,
}

#[derive(Debug, Clone)]
pub struct BackupCreatedEvent {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct FileMutatedEvent {
    pub path: PathBuf,
    pub entities_removed: usize,
}

#[derive(Debug, Clone)]
pub struct TestRunStartedEvent {
    pub label: &'static str,
}

#[derive(Debug, Clone)]
pub struct TestRunCompleteEvent {
    pub label: &'static str,
    pub exit_code: i32,
    pub failure_count: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub enum MutationOutcome {
    Committed,
    RolledBack { reason: String },
}

#[derive(Debug, Clone)]
pub struct MutationSessionEndedEvent {
    pub session_id: String,
    pub outcome: MutationOutcome,
}

#[derive(Debug, Clone)]
pub struct EngineErrorEvent {
    pub message: String,
}
