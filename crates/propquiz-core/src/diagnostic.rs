//! Diagnostic quiz engine and level derivation.
//!
//! The diagnostic runs every item of the content in order. For each item the
//! learner selects one option and checks it; the answer is recorded and
//! cannot be changed afterwards. When the last answer is recorded the learner
//! level and the error patterns are derived, exactly once.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::model::{DiagnosticItem, ErrorType, Level};

/// Correct answers at or below this count place the learner as novice.
pub const NOVICE_MAX_CORRECT: usize = 2;

/// Correct answers at or above this count place the learner as advanced.
pub const ADVANCED_MIN_CORRECT: usize = 4;

/// The recorded answer to one diagnostic item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticAnswer {
    pub item_id: String,
    pub correct: bool,
    #[serde(default)]
    pub error_type: Option<ErrorType>,
}

/// What the diagnostic tells us about the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticOutcome {
    pub level: Level,
    pub error_patterns: Vec<ErrorType>,
    pub correct_count: usize,
    pub item_count: usize,
}

/// Derive the learner level from the number of correct answers.
pub fn derive_level(answers: &[DiagnosticAnswer]) -> Level {
    let correct_count = answers.iter().filter(|a| a.correct).count();
    if correct_count <= NOVICE_MAX_CORRECT {
        Level::Novice
    } else if correct_count >= ADVANCED_MIN_CORRECT {
        Level::Advanced
    } else {
        Level::Developing
    }
}

/// Error types of all incorrect answers that carry one, in answer order.
/// Duplicates are kept.
pub fn extract_error_patterns(answers: &[DiagnosticAnswer]) -> Vec<ErrorType> {
    answers
        .iter()
        .filter(|a| !a.correct)
        .filter_map(|a| a.error_type.clone())
        .collect()
}

fn derive_outcome(answers: &[DiagnosticAnswer]) -> DiagnosticOutcome {
    DiagnosticOutcome {
        level: derive_level(answers),
        error_patterns: extract_error_patterns(answers),
        correct_count: answers.iter().filter(|a| a.correct).count(),
        item_count: answers.len(),
    }
}

/// Result of acknowledging the feedback of a diagnostic item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticStep {
    /// Moved on to the next item.
    Next,
    /// The last item was acknowledged.
    Complete(DiagnosticOutcome),
}

/// Runs the fixed sequence of diagnostic items.
#[derive(Debug, Clone)]
pub struct DiagnosticEngine {
    items: Vec<DiagnosticItem>,
    index: usize,
    selected: Option<usize>,
    checked: Option<DiagnosticAnswer>,
    answers: Vec<DiagnosticAnswer>,
    outcome: Option<DiagnosticOutcome>,
}

impl DiagnosticEngine {
    pub fn new(items: Vec<DiagnosticItem>) -> Self {
        // An empty diagnostic has nothing to ask: derive straight away.
        let outcome = items.is_empty().then(|| derive_outcome(&[]));
        Self {
            items,
            index: 0,
            selected: None,
            checked: None,
            answers: Vec::new(),
            outcome,
        }
    }

    /// The item currently shown, if any.
    pub fn current_item(&self) -> Option<&DiagnosticItem> {
        self.items.get(self.index)
    }

    /// Zero-based index of the current item.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Whether feedback for the current item is visible.
    pub fn feedback_visible(&self) -> bool {
        self.checked.is_some()
    }

    /// The checked answer of the current item, once feedback is visible.
    pub fn checked_answer(&self) -> Option<&DiagnosticAnswer> {
        self.checked.as_ref()
    }

    /// Feedback text for the current item, once checked.
    pub fn feedback(&self) -> Option<&str> {
        let answer = self.checked.as_ref()?;
        self.current_item().map(|item| item.feedback(answer.correct))
    }

    pub fn answers(&self) -> &[DiagnosticAnswer] {
        &self.answers
    }

    /// The derived outcome, available once the last answer is recorded.
    pub fn outcome(&self) -> Option<&DiagnosticOutcome> {
        self.outcome.as_ref()
    }

    /// Select an option of the current item. Selection can change until the
    /// answer is checked.
    pub fn select(&mut self, index: usize) -> Result<(), SessionError> {
        if self.checked.is_some() {
            return Err(SessionError::AlreadyChecked);
        }
        let item = self.current_item().ok_or(SessionError::NoCurrentItem)?;
        if index >= item.options.len() {
            return Err(SessionError::OptionOutOfRange {
                index,
                count: item.options.len(),
            });
        }
        self.selected = Some(index);
        Ok(())
    }

    /// Check the selected option, record the answer and show feedback.
    /// Returns whether the answer was correct.
    pub fn check(&mut self) -> Result<bool, SessionError> {
        if self.checked.is_some() {
            return Err(SessionError::AlreadyChecked);
        }
        let item = self.current_item().ok_or(SessionError::NoCurrentItem)?;
        let selected = self.selected.ok_or(SessionError::NoSelection)?;
        let option = item
            .options
            .get(selected)
            .ok_or(SessionError::OptionOutOfRange {
                index: selected,
                count: item.options.len(),
            })?;

        let answer = DiagnosticAnswer {
            item_id: item.id.clone(),
            correct: option.correct,
            error_type: if option.correct {
                None
            } else {
                option.error_type.clone()
            },
        };
        let correct = answer.correct;
        tracing::debug!(item = %answer.item_id, correct, "diagnostic answer recorded");

        self.answers.push(answer.clone());
        self.checked = Some(answer);

        if self.answers.len() == self.items.len() && self.outcome.is_none() {
            let outcome = derive_outcome(&self.answers);
            tracing::info!(
                level = %outcome.level,
                correct = outcome.correct_count,
                total = outcome.item_count,
                "diagnostic complete"
            );
            self.outcome = Some(outcome);
        }

        Ok(correct)
    }

    /// Acknowledge the feedback and move to the next item.
    pub fn advance(&mut self) -> Result<DiagnosticStep, SessionError> {
        if self.items.is_empty() {
            return Ok(DiagnosticStep::Complete(derive_outcome(&[])));
        }
        if self.checked.is_none() {
            return Err(SessionError::NotChecked);
        }
        if self.index + 1 < self.items.len() {
            self.index += 1;
            self.selected = None;
            self.checked = None;
            return Ok(DiagnosticStep::Next);
        }
        match &self.outcome {
            Some(outcome) => Ok(DiagnosticStep::Complete(outcome.clone())),
            None => Err(SessionError::NotChecked),
        }
    }
}
