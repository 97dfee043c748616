//! `EventDispatcher` — broadcasts to zero or more registered handlers.
//!
//! The orchestrator holds one dispatcher and never needs to know whether
//! zero, one, or several observers are attached.

use std::sync::Arc;

use super::handler::JanitorEventHandler;
use super::types::*;

#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn JanitorEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn JanitorEventHandler>) {
        self.handlers.push(handler);
    }
}

impl JanitorEventHandler for EventDispatcher {
    fn on_audit_started(&self, event: &AuditStartedEvent) {
        for h in &self.handlers {
            h.on_audit_started(event);
        }
    }

    fn on_phase_started(&self, event: &PhaseStartedEvent) {
        for h in &self.handlers {
            h.on_phase_started(event);
        }
    }

    fn on_phase_progress(&self, event: &PhaseProgressEvent) {
        for h in &self.handlers {
            h.on_phase_progress(event);
        }
    }

    fn on_phase_complete(&self, event: &PhaseCompleteEvent) {
        for h in &self.handlers {
            h.on_phase_complete(event);
        }
    }

    fn on_audit_complete(&self, event: &AuditCompleteEvent) {
        for h in &self.handlers {
            h.on_audit_complete(event);
        }
    }

    fn on_mutation_session_started(&self, event: &MutationSessionStartedEvent) {
        for h in &self.handlers {
            h.on_mutation_session_started(event);
        }
    }

    fn on_backup_created(&self, event: &BackupCreatedEvent) {
        for h in &self.handlers {
            h.on_backup_created(event);
        }
    }

    fn on_file_mutated(&self, event: &FileMutatedEvent) {
        for h in &self.handlers {
            h.on_file_mutated(event);
        }
    }

    fn on_test_run_started(&self, event: &TestRunStartedEvent) {
        for h in &self.handlers {
            h.on_test_run_started(event);
        }
    }

    fn on_test_run_complete(&self, event: &TestRunCompleteEvent) {
        for h in &self.handlers {
            h.on_test_run_complete(event);
        }
    }

    fn on_mutation_session_ended(&self, event: &MutationSessionEndedEvent) {
        for h in &self.handlers {
            h.on_mutation_session_ended(event);
        }
    }

    fn on_error(&self, event: &EngineErrorEvent) {
        for h in &self.handlers {
            h.on_error(event);
        }
    }
}
