//! The `propquiz evaluate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use propquiz_core::evaluator::{completion_cell_verdicts, evaluate};
use propquiz_core::model::{Answer, Task};

use crate::config::load_config;
use crate::input::parse_answer;

pub fn execute(task_id: String, answer: String, content_path: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let content =
        super::resolve_content(content_path.as_deref(), config.content_path.as_deref())?;

    let (module, task) = content
        .find_task(&task_id)
        .with_context(|| format!("no task with ID `{task_id}`"))?;
    let answer = parse_answer(task, &answer)
        .with_context(|| format!("invalid answer for {} task `{task_id}`", task.kind()))?;

    let correct = evaluate(task, Some(&answer));
    println!(
        "{task_id} ({module}, {}): {}",
        task.kind(),
        if correct { "correct" } else { "incorrect" }
    );

    if let (Task::Completion(t), Answer::Cells(entries)) = (task, &answer) {
        for ((row, col), ok) in completion_cell_verdicts(t, entries) {
            println!(
                "  cell ({}, {}): {}",
                row + 1,
                col + 1,
                if ok { "ok" } else { "wrong" }
            );
        }
    }

    Ok(())
}
