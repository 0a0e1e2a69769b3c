//! Turning a line of learner input into an [`Answer`].

use anyhow::{bail, Result};

use propquiz_core::model::{Answer, Relation, Task};

/// Parse one line of input as an answer to `task`.
///
/// - recognition/situation: a relation name (`proportional`, `anti`, `keine`)
///   or its button number `1`-`3`
/// - completion: the blank cells' values separated by whitespace, in
///   row-major order; missing trailing values leave those cells empty
/// - choice/mixed/problem: the raw number, kept as text
/// - trap: the integer value of the chosen option
pub fn parse_answer(task: &Task, input: &str) -> Result<Answer> {
    let input = input.trim();
    match task {
        Task::Recognition(_) | Task::Situation(_) => parse_relation(input).map(Answer::Label),
        Task::Completion(t) => {
            let blanks: Vec<_> = t.blanks().collect();
            let values: Vec<&str> = input.split_whitespace().collect();
            if values.len() > blanks.len() {
                bail!(
                    "expected at most {} value(s), got {}",
                    blanks.len(),
                    values.len()
                );
            }
            Ok(Answer::cells(
                blanks
                    .into_iter()
                    .zip(values)
                    .map(|((row, col), value)| (row, col, value)),
            ))
        }
        Task::Choice(_) | Task::Mixed(_) | Task::Problem(_) => Ok(Answer::text(input)),
        Task::Trap(_) => match input.parse::<i64>() {
            Ok(value) => Ok(Answer::Choice(value)),
            Err(_) => bail!("enter one of the offered whole numbers, not `{input}`"),
        },
    }
}

fn parse_relation(input: &str) -> Result<Relation> {
    if let Ok(n) = input.parse::<usize>() {
        return match n.checked_sub(1).and_then(|i| Relation::ALL.get(i)) {
            Some(relation) => Ok(*relation),
            None => bail!("choose 1-{}", Relation::ALL.len()),
        };
    }
    input.parse::<Relation>().map_err(anyhow::Error::msg)
}
