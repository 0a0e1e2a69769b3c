//! Core data model types for propquiz.
//!
//! These are the types that describe the bundled learning content
//! (diagnostic items, module task lists) and the answers a learner submits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Learner level and error classification
// ---------------------------------------------------------------------------

/// Learner level derived from the diagnostic quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Novice,
    #[default]
    Developing,
    Advanced,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Novice => write!(f, "novice"),
            Level::Developing => write!(f, "developing"),
            Level::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "novice" => Ok(Level::Novice),
            "developing" => Ok(Level::Developing),
            "advanced" => Ok(Level::Advanced),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

/// A content-defined misconception label attached to wrong diagnostic options
/// (e.g. `additive`, `overlinearization`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorType(pub String);

impl ErrorType {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The relationship label a classification task asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Proportional,
    Antiproportional,
    /// Neither proportional nor inverse-proportional.
    #[serde(rename = "none")]
    Neither,
}

impl Relation {
    /// All labels, in the order they are offered to the learner.
    pub const ALL: [Relation; 3] = [
        Relation::Proportional,
        Relation::Antiproportional,
        Relation::Neither,
    ];

    /// Label shown on the answer button.
    pub fn label(self) -> &'static str {
        match self {
            Relation::Proportional => "Proportional",
            Relation::Antiproportional => "Antiproportional",
            Relation::Neither => "Keine von beiden",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Proportional => write!(f, "proportional"),
            Relation::Antiproportional => write!(f, "antiproportional"),
            Relation::Neither => write!(f, "none"),
        }
    }
}

impl FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "proportional" | "p" => Ok(Relation::Proportional),
            "antiproportional" | "anti" | "a" => Ok(Relation::Antiproportional),
            "none" | "keine" | "n" | "k" => Ok(Relation::Neither),
            other => Err(format!("unknown relation: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

/// The fixed set of practice modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleId {
    Tables,
    Strategies,
    Context,
}

impl ModuleId {
    /// Every module, in menu order. All of them must be completed to unlock
    /// the final challenge.
    pub const ALL: [ModuleId; 3] = [ModuleId::Tables, ModuleId::Strategies, ModuleId::Context];

    /// Short module name.
    pub fn name(self) -> &'static str {
        match self {
            ModuleId::Tables => "Tabellen-Detektive",
            ModuleId::Strategies => "Rechen-Strategien",
            ModuleId::Context => "Kontext-Profis",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ModuleId::Tables => "📊",
            ModuleId::Strategies => "🧮",
            ModuleId::Context => "🌟",
        }
    }

    /// Module name prefixed with its icon, used as the runner heading.
    pub fn display_name(self) -> String {
        format!("{} {}", self.icon(), self.name())
    }

    pub fn description(self) -> &'static str {
        match self {
            ModuleId::Tables => "Zuordnungstypen erkennen",
            ModuleId::Strategies => "Flexibel rechnen lernen",
            ModuleId::Context => "Textaufgaben lösen",
        }
    }

    /// Badge awarded on the first completion of this module.
    pub fn badge(self) -> Option<&'static str> {
        match self {
            ModuleId::Tables => Some("🏆 Tabellen-Profi"),
            ModuleId::Strategies => Some("🧮 Rechen-Champion"),
            ModuleId::Context => Some("🌟 Alltagsprofi"),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleId::Tables => write!(f, "tables"),
            ModuleId::Strategies => write!(f, "strategies"),
            ModuleId::Context => write!(f, "context"),
        }
    }
}

impl FromStr for ModuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tables" | "1" => Ok(ModuleId::Tables),
            "strategies" | "2" => Ok(ModuleId::Strategies),
            "context" | "3" => Ok(ModuleId::Context),
            other => Err(format!("unknown module: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Content document
// ---------------------------------------------------------------------------

/// The immutable learning content: diagnostic items plus one task list per
/// module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub diagnostic: DiagnosticSection,
    #[serde(default)]
    pub tables: ModuleSection,
    #[serde(default)]
    pub strategies: ModuleSection,
    #[serde(default)]
    pub context: ModuleSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticSection {
    #[serde(default)]
    pub items: Vec<DiagnosticItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleSection {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Content {
    /// The fixed task list of a module.
    pub fn tasks(&self, module: ModuleId) -> &[Task] {
        match module {
            ModuleId::Tables => &self.tables.tasks,
            ModuleId::Strategies => &self.strategies.tasks,
            ModuleId::Context => &self.context.tasks,
        }
    }

    /// Look up a task by id across all modules.
    pub fn find_task(&self, id: &str) -> Option<(ModuleId, &Task)> {
        ModuleId::ALL.into_iter().find_map(|module| {
            self.tasks(module)
                .iter()
                .find(|t| t.id() == id)
                .map(|t| (module, t))
        })
    }

    /// Highest total score a learner can reach (one point per task).
    pub fn max_score(&self) -> usize {
        ModuleId::ALL.iter().map(|m| self.tasks(*m).len()).sum()
    }
}

/// A single placement-quiz question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticItem {
    pub id: String,
    pub question: String,
    pub options: Vec<DiagnosticOption>,
    #[serde(default)]
    pub correct_feedback: String,
    #[serde(default)]
    pub wrong_feedback: String,
}

impl DiagnosticItem {
    /// Feedback text for a checked answer.
    pub fn feedback(&self, correct: bool) -> &str {
        if correct {
            &self.correct_feedback
        } else {
            &self.wrong_feedback
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticOption {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
    #[serde(default)]
    pub error_type: Option<ErrorType>,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// A practice task. The variant decides how an answer is evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Task {
    /// Classify a value table.
    Recognition(ClassificationTask),
    /// Classify an everyday situation.
    Situation(ClassificationTask),
    /// Fill the blank cells of a value table.
    Completion(CompletionTask),
    Choice(CalculationTask),
    Mixed(CalculationTask),
    Problem(CalculationTask),
    /// Pick the right value among tempting wrong ones.
    Trap(TrapTask),
}

/// Variant tag of a [`Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Recognition,
    Situation,
    Completion,
    Choice,
    Mixed,
    Problem,
    Trap,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskKind::Recognition => "recognition",
            TaskKind::Situation => "situation",
            TaskKind::Completion => "completion",
            TaskKind::Choice => "choice",
            TaskKind::Mixed => "mixed",
            TaskKind::Problem => "problem",
            TaskKind::Trap => "trap",
        };
        f.write_str(s)
    }
}

impl Task {
    pub fn id(&self) -> &str {
        match self {
            Task::Recognition(t) | Task::Situation(t) => &t.id,
            Task::Completion(t) => &t.id,
            Task::Choice(t) | Task::Mixed(t) | Task::Problem(t) => &t.id,
            Task::Trap(t) => &t.id,
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Recognition(_) => TaskKind::Recognition,
            Task::Situation(_) => TaskKind::Situation,
            Task::Completion(_) => TaskKind::Completion,
            Task::Choice(_) => TaskKind::Choice,
            Task::Mixed(_) => TaskKind::Mixed,
            Task::Problem(_) => TaskKind::Problem,
            Task::Trap(_) => TaskKind::Trap,
        }
    }

    /// The question text shown above the task.
    pub fn prompt(&self) -> &str {
        match self {
            Task::Recognition(t) | Task::Situation(t) => &t.question,
            Task::Completion(t) => &t.description,
            Task::Choice(t) | Task::Mixed(t) | Task::Problem(t) => &t.question,
            Task::Trap(t) => &t.text,
        }
    }

    /// Progressive hints, revealed one at a time.
    pub fn hints(&self) -> &[String] {
        match self {
            Task::Recognition(t) | Task::Situation(t) => &t.hints,
            Task::Completion(t) => &t.hints,
            Task::Choice(t) | Task::Mixed(t) | Task::Problem(t) => &t.hints,
            Task::Trap(t) => &t.hints,
        }
    }
}

/// Recognition and situation tasks: pick the relationship type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationTask {
    pub id: String,
    #[serde(alias = "situation")]
    pub question: String,
    /// Optional value table as `[x, y]` pairs.
    #[serde(default)]
    pub data: Vec<[f64; 2]>,
    pub correct: Relation,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub correct_feedback: Option<String>,
    #[serde(default)]
    pub wrong_feedback: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl ClassificationTask {
    /// Feedback text for a checked answer; wrong answers fall back to the
    /// explanation.
    pub fn feedback(&self, correct: bool) -> Option<&str> {
        if correct {
            self.correct_feedback.as_deref()
        } else {
            self.wrong_feedback
                .as_deref()
                .or(self.explanation.as_deref())
        }
    }
}

/// A value table with blank (`null`) cells and the full solution table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionTask {
    pub id: String,
    pub description: String,
    pub data: Vec<Vec<Option<f64>>>,
    pub solution: Vec<Vec<f64>>,
    #[serde(default)]
    pub hints: Vec<String>,
}

impl CompletionTask {
    /// Positions of the blank cells in row-major order.
    pub fn blanks(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.data.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_none())
                .map(move |(col, _)| (row, col))
        })
    }

    pub fn solution_at(&self, row: usize, col: usize) -> Option<f64> {
        self.solution.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// Choice, mixed and problem tasks: compute a single number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationTask {
    pub id: String,
    #[serde(alias = "text")]
    pub question: String,
    pub solution: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}

/// Overlinearization trap: several integer options, some flagged correct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrapTask {
    pub id: String,
    pub text: String,
    pub options: Vec<TrapOption>,
    #[serde(default)]
    pub correct_feedback: Option<String>,
    #[serde(default)]
    pub wrong_feedback: Option<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}

impl TrapTask {
    /// Find an option by its value (not its position).
    pub fn option(&self, value: i64) -> Option<&TrapOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapOption {
    pub value: i64,
    #[serde(default)]
    pub correct: bool,
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

/// Raw learner entries for a completion table, keyed by `(row, col)`.
pub type CellEntries = BTreeMap<(usize, usize), String>;

/// A learner's submitted answer, in the shape of the task it answers.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// A relationship label for recognition/situation tasks.
    Label(Relation),
    /// Raw numeric input for choice/mixed/problem tasks.
    Text(String),
    /// Raw inputs for the blank cells of a completion table.
    Cells(CellEntries),
    /// The selected option value of a trap task.
    Choice(i64),
}

impl Answer {
    pub fn text(input: impl Into<String>) -> Self {
        Answer::Text(input.into())
    }

    /// Build a cell answer from `(row, col, input)` triples.
    pub fn cells<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, S)>,
        S: Into<String>,
    {
        Answer::Cells(
            entries
                .into_iter()
                .map(|(row, col, value)| ((row, col), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_display_and_parse() {
        assert_eq!(Relation::Neither.to_string(), "none");
        assert_eq!(
            "Antiproportional".parse::<Relation>().unwrap(),
            Relation::Antiproportional
        );
        assert_eq!("keine".parse::<Relation>().unwrap(), Relation::Neither);
        assert_eq!("p".parse::<Relation>().unwrap(), Relation::Proportional);
        assert!("linear".parse::<Relation>().is_err());
    }

    #[test]
    fn module_badges_and_names() {
        assert_eq!(ModuleId::Tables.badge(), Some("🏆 Tabellen-Profi"));
        assert_eq!(ModuleId::Strategies.badge(), Some("🧮 Rechen-Champion"));
        assert_eq!(ModuleId::Context.badge(), Some("🌟 Alltagsprofi"));
        assert_eq!(ModuleId::Context.display_name(), "🌟 Kontext-Profis");
        assert_eq!("2".parse::<ModuleId>().unwrap(), ModuleId::Strategies);
        assert_eq!("Tables".parse::<ModuleId>().unwrap(), ModuleId::Tables);
    }

    #[test]
    fn level_defaults_to_developing() {
        assert_eq!(Level::default(), Level::Developing);
        assert_eq!("ADVANCED".parse::<Level>().unwrap(), Level::Advanced);
    }

    #[test]
    fn task_deserializes_by_type_tag() {
        let json = r#"[
            {"type": "situation", "id": "s1", "situation": "Fahrzeit und Strecke", "correct": "proportional"},
            {"type": "completion", "id": "c1", "description": "Fülle aus",
             "data": [[1, 2], [2, null]], "solution": [[1, 2], [2, 4]]},
            {"type": "problem", "id": "p1", "text": "Wie viel?", "solution": 4.5, "unit": "€"},
            {"type": "trap", "id": "t1", "text": "Falle", "options": [{"value": 4}, {"value": 2, "correct": true}]}
        ]"#;
        let tasks: Vec<Task> = serde_json::from_str(json).unwrap();

        assert_eq!(tasks[0].kind(), TaskKind::Situation);
        assert_eq!(tasks[0].prompt(), "Fahrzeit und Strecke");
        assert_eq!(tasks[1].kind(), TaskKind::Completion);
        assert_eq!(tasks[2].prompt(), "Wie viel?");
        match &tasks[3] {
            Task::Trap(trap) => {
                assert!(!trap.options[0].correct);
                assert!(trap.option(2).unwrap().correct);
            }
            other => panic!("expected trap, got {other:?}"),
        }
    }

    #[test]
    fn completion_blanks_in_row_major_order() {
        let task = CompletionTask {
            id: "c".into(),
            description: String::new(),
            data: vec![
                vec![Some(1.0), None],
                vec![None, Some(4.0)],
                vec![Some(3.0), None],
            ],
            solution: vec![vec![1.0, 2.0], vec![2.0, 4.0], vec![3.0, 6.0]],
            hints: vec![],
        };
        let blanks: Vec<_> = task.blanks().collect();
        assert_eq!(blanks, vec![(0, 1), (1, 0), (2, 1)]);
        assert_eq!(task.solution_at(2, 1), Some(6.0));
        assert_eq!(task.solution_at(5, 0), None);
    }

    #[test]
    fn classification_feedback_falls_back_to_explanation() {
        let task = ClassificationTask {
            id: "r".into(),
            question: String::new(),
            data: vec![],
            correct: Relation::Proportional,
            hints: vec![],
            correct_feedback: Some("Richtig!".into()),
            wrong_feedback: None,
            explanation: Some("Quotient prüfen.".into()),
        };
        assert_eq!(task.feedback(true), Some("Richtig!"));
        assert_eq!(task.feedback(false), Some("Quotient prüfen."));
    }
}
