//! Task answer evaluation.
//!
//! Maps a task and a submitted answer to a correctness verdict. Evaluation is
//! pure: it never mutates its inputs, never fails, and always yields the same
//! verdict for the same task and answer.
//!
//! Two tolerances are in play and they intentionally differ:
//! - completion cells accept `|entry - solution| <= 0.1`
//! - choice/mixed/problem answers accept `|answer - solution| < 0.1`

use crate::model::{
    Answer, CalculationTask, CellEntries, ClassificationTask, CompletionTask, Relation, Task,
    TrapTask,
};

/// Inclusive tolerance for completion table cells.
pub const COMPLETION_TOLERANCE: f64 = 0.1;

/// Exclusive tolerance for single-number answers.
pub const CALCULATION_TOLERANCE: f64 = 0.1;

/// Evaluate a submitted answer against a task.
///
/// A missing submission, or an answer whose shape does not fit the task
/// variant, is incorrect.
pub fn evaluate(task: &Task, answer: Option<&Answer>) -> bool {
    let Some(answer) = answer else {
        tracing::debug!(task = task.id(), "no submission, marking incorrect");
        return false;
    };

    let correct = match (task, answer) {
        (Task::Recognition(t) | Task::Situation(t), Answer::Label(label)) => {
            evaluate_label(t, *label)
        }
        (Task::Completion(t), Answer::Cells(entries)) => evaluate_completion(t, entries),
        (Task::Choice(t) | Task::Mixed(t) | Task::Problem(t), Answer::Text(input)) => {
            evaluate_calculation(t, input)
        }
        (Task::Trap(t), Answer::Choice(value)) => evaluate_trap(t, *value),
        (Task::Trap(t), Answer::Text(input)) => match input.trim().parse::<i64>() {
            Ok(value) => evaluate_trap(t, value),
            Err(_) => false,
        },
        _ => {
            tracing::debug!(
                task = task.id(),
                kind = %task.kind(),
                "answer shape does not match task"
            );
            false
        }
    };

    tracing::debug!(task = task.id(), correct, "evaluated answer");
    correct
}

/// Parse a learner's numeric input, treating anything unusable as zero.
///
/// Leading/trailing whitespace is ignored and a decimal comma is accepted.
/// Empty, unparseable and non-finite input all yield `0.0`.
pub fn parse_numeric_or_zero(input: &str) -> f64 {
    let normalized = input.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

fn evaluate_label(task: &ClassificationTask, label: Relation) -> bool {
    label == task.correct
}

fn evaluate_completion(task: &CompletionTask, entries: &CellEntries) -> bool {
    task.blanks()
        .all(|(row, col)| cell_within_tolerance(task, entries, row, col))
}

fn evaluate_calculation(task: &CalculationTask, input: &str) -> bool {
    (parse_numeric_or_zero(input) - task.solution).abs() < CALCULATION_TOLERANCE
}

fn evaluate_trap(task: &TrapTask, value: i64) -> bool {
    task.option(value).is_some_and(|o| o.correct)
}

fn cell_within_tolerance(
    task: &CompletionTask,
    entries: &CellEntries,
    row: usize,
    col: usize,
) -> bool {
    let Some(expected) = task.solution_at(row, col) else {
        return false;
    };
    let entry = entries
        .get(&(row, col))
        .map(|s| parse_numeric_or_zero(s))
        .unwrap_or(0.0);
    (entry - expected).abs() <= COMPLETION_TOLERANCE
}

/// Per-cell verdicts for the blank cells of a completion table, in row-major
/// order. Used to mark individual cells after checking.
pub fn completion_cell_verdicts(
    task: &CompletionTask,
    entries: &CellEntries,
) -> Vec<((usize, usize), bool)> {
    task.blanks()
        .map(|(row, col)| ((row, col), cell_within_tolerance(task, entries, row, col)))
        .collect()
}
