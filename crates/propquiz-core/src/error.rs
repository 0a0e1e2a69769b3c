//! Session error types.
//!
//! These errors represent learner actions that are not valid in the current
//! state of the session. Answer evaluation itself never fails; a rejected
//! action leaves the session untouched.

use thiserror::Error;

use crate::session::PhaseKind;

/// Errors returned when an action is not allowed right now.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The action has no transition out of the current phase.
    #[error("`{action}` is not possible during {phase}")]
    InvalidAction {
        action: &'static str,
        phase: PhaseKind,
    },

    /// The final challenge was requested before every module was completed.
    #[error("final challenge is locked: {completed}/{total} modules completed")]
    FinalLocked { completed: usize, total: usize },

    /// There is no diagnostic item or task to act on.
    #[error("nothing to answer: no current item")]
    NoCurrentItem,

    /// Checking a diagnostic item without selecting an option.
    #[error("select an option first")]
    NoSelection,

    /// A diagnostic option index outside the item's option list.
    #[error("option {index} does not exist ({count} options)")]
    OptionOutOfRange { index: usize, count: usize },

    /// The current item was already checked; answers cannot be changed.
    #[error("answer already checked")]
    AlreadyChecked,

    /// Advancing requires the feedback of the current item to be shown.
    #[error("check your answer before moving on")]
    NotChecked,
}

impl SessionError {
    /// Returns `true` if the error comes from the final-challenge gate.
    pub fn is_locked(&self) -> bool {
        matches!(self, SessionError::FinalLocked { .. })
    }
}
