//! JSON content loader.
//!
//! Loads a content document from disk (or the bundled German content) and
//! validates it for authoring mistakes.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{Content, ModuleId, Task};

/// The German content shipped with the library.
pub const BUNDLED_CONTENT: &str = include_str!("../content/zuordnungen.json");

impl Content {
    /// Parse the bundled content document.
    pub fn bundled() -> Result<Self> {
        parse_content_str(BUNDLED_CONTENT, Path::new("<bundled>"))
    }
}

/// Parse a content document from a JSON file.
pub fn parse_content(path: &Path) -> Result<Content> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read content file: {}", path.display()))?;

    parse_content_str(&content, path)
}

/// Parse a JSON string into [`Content`].
pub fn parse_content_str(content: &str, source_path: &Path) -> Result<Content> {
    let parsed: Content = serde_json::from_str(content)
        .with_context(|| format!("failed to parse content JSON: {}", source_path.display()))?;

    tracing::debug!(
        source = %source_path.display(),
        items = parsed.diagnostic.items.len(),
        tasks = parsed.max_score(),
        "content loaded"
    );
    Ok(parsed)
}

/// Load content from `path`, or the bundled content when no path is given.
pub fn load_content(path: Option<&Path>) -> Result<Content> {
    match path {
        Some(path) => parse_content(path),
        None => Content::bundled(),
    }
}

/// A warning from content validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item or task ID (if applicable).
    pub location: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn at(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            message: message.into(),
        }
    }
}

/// Validate content for common authoring issues.
pub fn validate_content(content: &Content) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if content.diagnostic.items.is_empty() {
        warnings.push(ValidationWarning {
            location: None,
            message: "diagnostic has no items".into(),
        });
    }

    let mut seen_items = HashSet::new();
    for item in &content.diagnostic.items {
        if !seen_items.insert(item.id.as_str()) {
            warnings.push(ValidationWarning::at(
                &item.id,
                format!("duplicate diagnostic item ID: {}", item.id),
            ));
        }
        if !item.options.iter().any(|o| o.correct) {
            warnings.push(ValidationWarning::at(&item.id, "no option is marked correct"));
        }
    }

    let mut seen_tasks = HashSet::new();
    for module in ModuleId::ALL {
        let tasks = content.tasks(module);
        if tasks.is_empty() {
            warnings.push(ValidationWarning::at(
                module.to_string(),
                "module has no tasks",
            ));
        }
        for task in tasks {
            if !seen_tasks.insert(task.id()) {
                warnings.push(ValidationWarning::at(
                    task.id(),
                    format!("duplicate task ID: {}", task.id()),
                ));
            }
            validate_task(task, &mut warnings);
        }
    }

    warnings
}

fn validate_task(task: &Task, warnings: &mut Vec<ValidationWarning>) {
    match task {
        Task::Completion(t) => {
            let blanks: Vec<_> = t.blanks().collect();
            if blanks.is_empty() {
                warnings.push(ValidationWarning::at(&t.id, "completion table has no blank cells"));
            }
            if blanks.iter().any(|&(r, c)| t.solution_at(r, c).is_none()) {
                warnings.push(ValidationWarning::at(
                    &t.id,
                    "solution table does not cover every blank cell",
                ));
            }
        }
        Task::Choice(t) | Task::Mixed(t) | Task::Problem(t) => {
            if !t.solution.is_finite() {
                warnings.push(ValidationWarning::at(&t.id, "solution is not a finite number"));
            }
        }
        Task::Trap(t) => {
            if !t.options.iter().any(|o| o.correct) {
                warnings.push(ValidationWarning::at(&t.id, "no option is marked correct"));
            }
            let mut values = HashSet::new();
            if t.options.iter().any(|o| !values.insert(o.value)) {
                warnings.push(ValidationWarning::at(
                    &t.id,
                    "option values are not unique; only the first is reachable",
                ));
            }
        }
        Task::Recognition(_) | Task::Situation(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const MINIMAL_JSON: &str = r#"{
        "diagnostic": {
            "items": [
                {
                    "id": "d1",
                    "question": "Welche Zuordnung ist proportional?",
                    "options": [
                        {"text": "A", "correct": true},
                        {"text": "B", "errorType": "additive"}
                    ],
                    "correctFeedback": "Richtig!",
                    "wrongFeedback": "Schau auf den Quotienten."
                }
            ]
        },
        "tables": {"tasks": [
            {"type": "recognition", "id": "t1", "question": "Welcher Typ?",
             "data": [[1, 4], [2, 8]], "correct": "proportional"}
        ]},
        "strategies": {"tasks": [
            {"type": "choice", "id": "s1", "question": "Preis?", "solution": 4.5, "unit": "€"}
        ]},
        "context": {"tasks": [
            {"type": "problem", "id": "c1", "text": "Wie lange?", "solution": 16}
        ]}
    }"#;

    fn warnings_for(json: &str) -> Vec<ValidationWarning> {
        let content = parse_content_str(json, &PathBuf::from("test.json")).unwrap();
        validate_content(&content)
    }

    #[test]
    fn parse_valid_json() {
        let content = parse_content_str(MINIMAL_JSON, &PathBuf::from("test.json")).unwrap();
        assert_eq!(content.diagnostic.items.len(), 1);
        let item = &content.diagnostic.items[0];
        assert_eq!(item.options[1].error_type.as_ref().unwrap().as_str(), "additive");
        assert_eq!(item.wrong_feedback, "Schau auf den Quotienten.");
        assert_eq!(content.max_score(), 3);
        assert!(validate_content(&content).is_empty());
    }

    #[test]
    fn parse_missing_modules_defaults_to_empty() {
        let content =
            parse_content_str(r#"{"diagnostic": {"items": []}}"#, &PathBuf::from("t.json"))
                .unwrap();
        assert!(content.tables.tasks.is_empty());
        let warnings = validate_content(&content);
        assert!(warnings.iter().any(|w| w.message == "diagnostic has no items"));
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.message == "module has no tasks")
                .count(),
            3
        );
    }

    #[test]
    fn parse_malformed_json() {
        let result = parse_content_str("{ not json", &PathBuf::from("bad.json"));
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }

    #[test]
    fn parse_unknown_task_type_fails() {
        let json = r#"{"diagnostic": {"items": []},
            "tables": {"tasks": [{"type": "puzzle", "id": "x"}]}}"#;
        assert!(parse_content_str(json, &PathBuf::from("t.json")).is_err());
    }

    #[test]
    fn validate_duplicate_ids() {
        let json = MINIMAL_JSON.replace(r#""id": "c1""#, r#""id": "t1""#);
        let warnings = warnings_for(&json);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("duplicate task ID: t1")));
    }

    #[test]
    fn validate_diagnostic_without_correct_option() {
        let json = MINIMAL_JSON.replace(r#""correct": true"#, r#""correct": false"#);
        let warnings = warnings_for(&json);
        assert!(warnings
            .iter()
            .any(|w| w.location.as_deref() == Some("d1") && w.message.contains("correct")));
    }

    #[test]
    fn validate_completion_and_trap_tasks() {
        let json = MINIMAL_JSON.replace(
            r#"{"type": "problem", "id": "c1", "text": "Wie lange?", "solution": 16}"#,
            r#"{"type": "completion", "id": "c1", "description": "Fülle aus",
                "data": [[1, 2], [3, null]], "solution": [[1, 2]]},
               {"type": "completion", "id": "c2", "description": "Voll",
                "data": [[1, 2]], "solution": [[1, 2]]},
               {"type": "trap", "id": "c3", "text": "Falle",
                "options": [{"value": 2}, {"value": 2}]}"#,
        );
        let warnings = warnings_for(&json);
        let has = |id: &str, needle: &str| {
            warnings
                .iter()
                .any(|w| w.location.as_deref() == Some(id) && w.message.contains(needle))
        };
        assert!(has("c1", "does not cover"));
        assert!(has("c2", "no blank cells"));
        assert!(has("c3", "no option is marked correct"));
        assert!(has("c3", "not unique"));
    }

    #[test]
    fn bundled_content_is_valid() {
        let content = Content::bundled().unwrap();
        assert_eq!(content.diagnostic.items.len(), 5);
        assert_eq!(content.tables.tasks.len(), 3);
        assert_eq!(content.strategies.tasks.len(), 3);
        assert_eq!(content.context.tasks.len(), 4);
        assert_eq!(content.max_score(), 10);
        let warnings = validate_content(&content);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        std::fs::write(&path, MINIMAL_JSON).unwrap();

        let content = load_content(Some(&path)).unwrap();
        assert_eq!(content.find_task("s1").unwrap().0, ModuleId::Strategies);
        assert!(load_content(Some(&dir.path().join("missing.json"))).is_err());
        assert!(load_content(None).is_ok());
    }
}
