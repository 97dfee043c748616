//! `JanitorEventHandler` — the observer trait external collaborators
//! implement to watch a run progress.

use super::types::*;

/// Every method has a no-op default so implementors only override the
/// events they care about (a CLI spinner cares about phase progress; a log
/// sink cares about everything).
pub trait JanitorEventHandler: Send + Sync {
    fn on_audit_started(&self, _event: &AuditStartedEvent) {}
    fn on_phase_started(&self, _event: &PhaseStartedEvent) {}
    fn on_phase_progress(&self, _event: &PhaseProgressEvent) {}
    fn on_phase_complete(&self, _event: &PhaseCompleteEvent) {}
    fn on_audit_complete(&self, _event: &AuditCompleteEvent) {}
    fn on_mutation_session_started(&self, _event: &MutationSessionStartedEvent) {}
    fn on_backup_created(&self, _event: &BackupCreatedEvent) {}
    fn on_file_mutated(&self, _event: &FileMutatedEvent) {}
    fn on_test_run_started(&self, _event: &TestRunStartedEvent) {}
    fn on_test_run_complete(&self, _event: &TestRunCompleteEvent) {}
    fn on_mutation_session_ended(&self, _event: &MutationSessionEndedEvent) {}
    fn on_error(&self, _event: &EngineErrorEvent) {}
}

/// A handler that discards every event; the default when no observer is
/// wired up (e.g. in unit tests exercising the pipeline directly).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventHandler;

impl JanitorEventHandler for NullEventHandler {}
