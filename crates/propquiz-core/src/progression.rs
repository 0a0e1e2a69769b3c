//! Learner profile and module progression.
//!
//! The profile is created with defaults at session start, receives the
//! diagnostic outcome once, and is updated only when a module run reaches the
//! end of its task list. The first completion of a module wins: replaying a
//! completed module never adds its badge or score a second time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::diagnostic::DiagnosticOutcome;
use crate::model::{ErrorType, Level, ModuleId};

/// Everything the session knows about the learner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub level: Level,
    pub error_patterns: Vec<ErrorType>,
    pub completed_modules: BTreeSet<ModuleId>,
    pub badges: Vec<String>,
    pub total_score: u32,
}

/// Per-module progress as seen from the module menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleState {
    NotStarted,
    InProgress,
    Completed,
}

/// What a module completion did to the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// First completion: the module was recorded and the score added.
    Recorded {
        badge: Option<&'static str>,
        score: u32,
    },
    /// The module had been completed before; the profile is unchanged.
    AlreadyCompleted,
}

impl LearnerProfile {
    /// Apply the diagnostic result (level and error patterns).
    pub fn apply_diagnostic(&mut self, outcome: &DiagnosticOutcome) {
        self.level = outcome.level;
        self.error_patterns = outcome.error_patterns.clone();
    }

    pub fn is_completed(&self, module: ModuleId) -> bool {
        self.completed_modules.contains(&module)
    }

    /// True iff every module of the fixed module set is completed.
    pub fn all_completed(&self) -> bool {
        ModuleId::ALL.iter().all(|m| self.is_completed(*m))
    }

    /// Number of completed modules.
    pub fn completed_count(&self) -> usize {
        self.completed_modules.len()
    }

    /// State of a module given the module currently being run, if any.
    pub fn module_state(&self, module: ModuleId, active: Option<ModuleId>) -> ModuleState {
        if self.is_completed(module) {
            ModuleState::Completed
        } else if active == Some(module) {
            ModuleState::InProgress
        } else {
            ModuleState::NotStarted
        }
    }

    /// Record the completion of a module run with its accumulated score.
    pub fn complete_module(&mut self, module: ModuleId, score: u32) -> CompletionOutcome {
        if !self.completed_modules.insert(module) {
            tracing::info!(%module, score, "module replayed, profile unchanged");
            return CompletionOutcome::AlreadyCompleted;
        }

        let badge = module.badge();
        if let Some(badge) = badge {
            self.badges.push(badge.to_string());
        }
        self.total_score += score;

        tracing::info!(
            %module,
            score,
            total = self.total_score,
            "module completed"
        );
        CompletionOutcome::Recorded { badge, score }
    }

    /// The module a novice is pointed to first.
    pub fn recommended_module(&self) -> Option<ModuleId> {
        (self.level == Level::Novice).then_some(ModuleId::Tables)
    }
}
