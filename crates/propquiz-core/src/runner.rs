//! Module task runner.
//!
//! Walks a module's task list by index. Each task is submitted once, scored
//! flat (one point per correct answer) and then blocks until the learner
//! acknowledges the feedback. Hints are revealed one at a time before the
//! answer is checked.

use crate::error::SessionError;
use crate::evaluator::evaluate;
use crate::model::{Answer, ModuleId, Task};

/// Result of acknowledging a task's feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerStep {
    /// Moved on to the next task.
    Next,
    /// Advanced past the last task; the run's score is ready to commit.
    Finished { module: ModuleId, score: u32 },
}

/// The checked state of the current task.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedTask {
    pub correct: bool,
    pub answer: Option<Answer>,
}

/// One run through a module's tasks.
#[derive(Debug, Clone)]
pub struct TaskRunner {
    module: ModuleId,
    tasks: Vec<Task>,
    index: usize,
    score: u32,
    hint_level: usize,
    checked: Option<CheckedTask>,
}

impl TaskRunner {
    pub fn new(module: ModuleId, tasks: Vec<Task>) -> Self {
        Self {
            module,
            tasks,
            index: 0,
            score: 0,
            hint_level: 0,
            checked: None,
        }
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// The task currently shown; `None` for a module without tasks.
    pub fn current_task(&self) -> Option<&Task> {
        self.tasks.get(self.index)
    }

    /// Zero-based index of the current task.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Points scored so far in this run.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of tasks checked so far in this run.
    pub fn answered(&self) -> usize {
        self.index + usize::from(self.checked.is_some())
    }

    pub fn is_last_task(&self) -> bool {
        self.index + 1 >= self.tasks.len()
    }

    pub fn feedback_visible(&self) -> bool {
        self.checked.is_some()
    }

    pub fn checked(&self) -> Option<&CheckedTask> {
        self.checked.as_ref()
    }

    pub fn hint_level(&self) -> usize {
        self.hint_level
    }

    /// Hints revealed so far. Hints are hidden once feedback is shown.
    pub fn visible_hints(&self) -> &[String] {
        match self.current_task() {
            Some(task) if self.checked.is_none() => &task.hints()[..self.hint_level],
            _ => &[],
        }
    }

    /// Whether another hint can be revealed for the current task.
    pub fn can_reveal_hint(&self) -> bool {
        self.checked.is_none()
            && self
                .current_task()
                .is_some_and(|t| self.hint_level < t.hints().len())
    }

    /// Reveal the next hint. Returns the newly revealed hint, or `None` when
    /// every hint is shown or the answer was already checked.
    pub fn reveal_hint(&mut self) -> Option<&str> {
        if !self.can_reveal_hint() {
            return None;
        }
        self.hint_level += 1;
        let level = self.hint_level;
        self.current_task()
            .and_then(|t| t.hints().get(level - 1))
            .map(String::as_str)
    }

    /// Submit an answer for the current task, evaluate it and show feedback.
    pub fn submit(&mut self, answer: Option<Answer>) -> Result<bool, SessionError> {
        if self.checked.is_some() {
            return Err(SessionError::AlreadyChecked);
        }
        let task = self.current_task().ok_or(SessionError::NoCurrentItem)?;
        let correct = evaluate(task, answer.as_ref());
        tracing::debug!(
            module = %self.module,
            task = task.id(),
            correct,
            "task checked"
        );
        if correct {
            self.score += 1;
        }
        self.checked = Some(CheckedTask { correct, answer });
        Ok(correct)
    }

    /// Acknowledge the feedback and move on. Past the last task the run is
    /// finished and reports its score.
    pub fn advance(&mut self) -> Result<RunnerStep, SessionError> {
        if self.current_task().is_none() {
            return Err(SessionError::NoCurrentItem);
        }
        if self.checked.is_none() {
            return Err(SessionError::NotChecked);
        }
        if self.index + 1 < self.tasks.len() {
            self.index += 1;
            self.hint_level = 0;
            self.checked = None;
            return Ok(RunnerStep::Next);
        }
        Ok(RunnerStep::Finished {
            module: self.module,
            score: self.score,
        })
    }
}
