//! Observer hooks for a running session.
//!
//! The session calls these as state changes happen so a front-end can react
//! (print a badge, log a verdict) without polling.

use crate::diagnostic::DiagnosticOutcome;
use crate::model::ModuleId;
use crate::progression::CompletionOutcome;
use crate::session::PhaseKind;

/// Receives session events.
pub trait SessionObserver {
    fn on_phase_change(&self, from: PhaseKind, to: PhaseKind);
    fn on_diagnostic_complete(&self, outcome: &DiagnosticOutcome);
    fn on_task_checked(&self, module: ModuleId, task_id: &str, correct: bool);
    fn on_module_complete(&self, module: ModuleId, outcome: &CompletionOutcome);
}

/// No-op observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_phase_change(&self, _: PhaseKind, _: PhaseKind) {}
    fn on_diagnostic_complete(&self, _: &DiagnosticOutcome) {}
    fn on_task_checked(&self, _: ModuleId, _: &str, _: bool) {}
    fn on_module_complete(&self, _: ModuleId, _: &CompletionOutcome) {}
}
