//! Phase controller.
//!
//! A [`Session`] owns the learner profile and the phase cursor and moves the
//! learner through start → diagnostic → module selection ↔ module run →
//! final summary → final reflection → start. Every learner action is a method
//! call; an action that has no transition from the current phase is rejected
//! with a [`SessionError`] and changes nothing.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diagnostic::{DiagnosticEngine, DiagnosticStep};
use crate::error::SessionError;
use crate::model::{Answer, Content, ModuleId};
use crate::progression::{LearnerProfile, ModuleState};
use crate::runner::{RunnerStep, TaskRunner};
use crate::summary::SessionSummary;
use crate::traits::{NoopObserver, SessionObserver};

/// The phase a session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseKind {
    Start,
    Diagnostic,
    ModuleSelection,
    ModuleRunning,
    FinalSummary,
    FinalReflection,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhaseKind::Start => "start",
            PhaseKind::Diagnostic => "diagnostic",
            PhaseKind::ModuleSelection => "module selection",
            PhaseKind::ModuleRunning => "module run",
            PhaseKind::FinalSummary => "final summary",
            PhaseKind::FinalReflection => "final reflection",
        };
        f.write_str(s)
    }
}

enum Phase {
    Start,
    Diagnostic(DiagnosticEngine),
    ModuleSelection,
    ModuleRunning(TaskRunner),
    FinalSummary,
    FinalReflection,
}

impl Phase {
    fn kind(&self) -> PhaseKind {
        match self {
            Phase::Start => PhaseKind::Start,
            Phase::Diagnostic(_) => PhaseKind::Diagnostic,
            Phase::ModuleSelection => PhaseKind::ModuleSelection,
            Phase::ModuleRunning(_) => PhaseKind::ModuleRunning,
            Phase::FinalSummary => PhaseKind::FinalSummary,
            Phase::FinalReflection => PhaseKind::FinalReflection,
        }
    }
}

/// One learner's pass through the program.
pub struct Session {
    id: Uuid,
    content: Arc<Content>,
    profile: LearnerProfile,
    phase: Phase,
    observer: Box<dyn SessionObserver>,
}

impl Session {
    pub fn new(content: Arc<Content>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            profile: LearnerProfile::default(),
            phase: Phase::Start,
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn profile(&self) -> &LearnerProfile {
        &self.profile
    }

    pub fn phase(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// The diagnostic engine, while in the diagnostic phase.
    pub fn diagnostic(&self) -> Option<&DiagnosticEngine> {
        match &self.phase {
            Phase::Diagnostic(engine) => Some(engine),
            _ => None,
        }
    }

    /// The task runner, while a module is running.
    pub fn runner(&self) -> Option<&TaskRunner> {
        match &self.phase {
            Phase::ModuleRunning(runner) => Some(runner),
            _ => None,
        }
    }

    pub fn active_module(&self) -> Option<ModuleId> {
        self.runner().map(TaskRunner::module)
    }

    pub fn module_state(&self, module: ModuleId) -> ModuleState {
        self.profile.module_state(module, self.active_module())
    }

    /// Whether the final challenge can be started right now.
    pub fn can_start_final(&self) -> bool {
        matches!(self.phase, Phase::ModuleSelection) && self.profile.all_completed()
    }

    /// The module a novice is pointed to first.
    pub fn recommended_module(&self) -> Option<ModuleId> {
        self.profile.recommended_module()
    }

    /// Summary of the session so far.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_session(self)
    }

    // -----------------------------------------------------------------------
    // Learner actions
    // -----------------------------------------------------------------------

    /// Leave the start screen and begin the diagnostic quiz.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.expect_phase(PhaseKind::Start, "start")?;
        let engine = DiagnosticEngine::new(self.content.diagnostic.items.clone());
        self.transition(Phase::Diagnostic(engine));
        Ok(())
    }

    /// Select an option of the current diagnostic item.
    pub fn select_option(&mut self, index: usize) -> Result<(), SessionError> {
        self.diagnostic_mut("select option")?.select(index)
    }

    /// Check the selected diagnostic option.
    pub fn check_option(&mut self) -> Result<bool, SessionError> {
        self.diagnostic_mut("check option")?.check()
    }

    /// Select and check a diagnostic option in one step.
    pub fn answer_diagnostic(&mut self, index: usize) -> Result<bool, SessionError> {
        let engine = self.diagnostic_mut("answer diagnostic")?;
        engine.select(index)?;
        engine.check()
    }

    /// Submit an answer for the current task of the running module.
    pub fn submit(&mut self, answer: Option<Answer>) -> Result<bool, SessionError> {
        let phase = self.phase.kind();
        let Phase::ModuleRunning(runner) = &mut self.phase else {
            return Err(SessionError::InvalidAction {
                action: "submit",
                phase,
            });
        };
        let correct = runner.submit(answer)?;
        if let Some(task) = runner.current_task() {
            self.observer
                .on_task_checked(runner.module(), task.id(), correct);
        }
        Ok(correct)
    }

    /// Reveal the next hint of the current task.
    pub fn reveal_hint(&mut self) -> Result<Option<&str>, SessionError> {
        let phase = self.phase.kind();
        match &mut self.phase {
            Phase::ModuleRunning(runner) => Ok(runner.reveal_hint()),
            _ => Err(SessionError::InvalidAction {
                action: "reveal hint",
                phase,
            }),
        }
    }

    /// Acknowledge the current feedback or summary and move on.
    ///
    /// After the last diagnostic item the profile receives the diagnostic
    /// outcome and the module menu opens. After the last task of a module the
    /// run is committed to the profile and the module menu opens again.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        match &mut self.phase {
            Phase::Diagnostic(engine) => {
                if let DiagnosticStep::Complete(outcome) = engine.advance()? {
                    self.profile.apply_diagnostic(&outcome);
                    self.observer.on_diagnostic_complete(&outcome);
                    self.transition(Phase::ModuleSelection);
                }
                Ok(())
            }
            Phase::ModuleRunning(runner) => {
                if let RunnerStep::Finished { module, score } = runner.advance()? {
                    let outcome = self.profile.complete_module(module, score);
                    self.observer.on_module_complete(module, &outcome);
                    self.transition(Phase::ModuleSelection);
                }
                Ok(())
            }
            Phase::FinalSummary => {
                self.transition(Phase::FinalReflection);
                Ok(())
            }
            _ => Err(self.invalid("advance")),
        }
    }

    /// Open a module from the module menu.
    pub fn select_module(&mut self, module: ModuleId) -> Result<(), SessionError> {
        self.expect_phase(PhaseKind::ModuleSelection, "select module")?;
        let tasks = self.content.tasks(module).to_vec();
        if tasks.is_empty() {
            tracing::warn!(%module, "module has no tasks");
        }
        self.transition(Phase::ModuleRunning(TaskRunner::new(module, tasks)));
        Ok(())
    }

    /// Abandon the running module. Its score is discarded.
    pub fn back(&mut self) -> Result<(), SessionError> {
        let Phase::ModuleRunning(runner) = &self.phase else {
            return Err(self.invalid("back"));
        };
        tracing::info!(
            module = %runner.module(),
            discarded = runner.score(),
            "module run abandoned"
        );
        self.transition(Phase::ModuleSelection);
        Ok(())
    }

    /// Start the final challenge. Only possible once every module is
    /// completed.
    pub fn start_final_challenge(&mut self) -> Result<(), SessionError> {
        self.expect_phase(PhaseKind::ModuleSelection, "start final challenge")?;
        if !self.profile.all_completed() {
            return Err(SessionError::FinalLocked {
                completed: self.profile.completed_count(),
                total: ModuleId::ALL.len(),
            });
        }
        self.transition(Phase::FinalSummary);
        Ok(())
    }

    /// Start over from the reflection screen with a fresh profile.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.expect_phase(PhaseKind::FinalReflection, "restart")?;
        self.profile = LearnerProfile::default();
        self.id = Uuid::new_v4();
        self.transition(Phase::Start);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn transition(&mut self, next: Phase) {
        let from = self.phase.kind();
        self.phase = next;
        let to = self.phase.kind();
        tracing::info!(session = %self.id, %from, %to, "phase change");
        self.observer.on_phase_change(from, to);
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidAction {
            action,
            phase: self.phase.kind(),
        }
    }

    fn expect_phase(&self, phase: PhaseKind, action: &'static str) -> Result<(), SessionError> {
        if self.phase.kind() == phase {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn diagnostic_mut(
        &mut self,
        action: &'static str,
    ) -> Result<&mut DiagnosticEngine, SessionError> {
        let phase = self.phase.kind();
        match &mut self.phase {
            Phase::Diagnostic(engine) => Ok(engine),
            _ => Err(SessionError::InvalidAction { action, phase }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CalculationTask, DiagnosticItem, DiagnosticOption, DiagnosticSection, ErrorType, Level,
        ModuleSection, Task,
    };

    fn item(id: &str) -> DiagnosticItem {
        DiagnosticItem {
            id: id.into(),
            question: format!("Frage {id}"),
            options: vec![
                DiagnosticOption {
                    text: "richtig".into(),
                    correct: true,
                    error_type: None,
                },
                DiagnosticOption {
                    text: "falsch".into(),
                    correct: false,
                    error_type: Some(ErrorType::new(format!("err-{id}"))),
                },
            ],
            correct_feedback: "Gut".into(),
            wrong_feedback: "Schade".into(),
        }
    }

    fn task(id: &str, solution: f64) -> Task {
        Task::Problem(CalculationTask {
            id: id.into(),
            question: id.into(),
            solution,
            unit: None,
            hints: vec!["Dreisatz".into()],
        })
    }

    fn content() -> Arc<Content> {
        Arc::new(Content {
            diagnostic: DiagnosticSection {
                items: (1..=5).map(|i| item(&format!("d{i}"))).collect(),
            },
            tables: ModuleSection {
                tasks: vec![task("t1", 1.0), task("t2", 2.0), task("t3", 3.0)],
            },
            strategies: ModuleSection {
                tasks: vec![task("s1", 4.0)],
            },
            context: ModuleSection {
                tasks: vec![task("c1", 5.0), task("c2", 6.0)],
            },
        })
    }

    /// Answer the diagnostic with `correct` right answers first.
    fn finish_diagnostic(session: &mut Session, correct: usize) {
        session.start().unwrap();
        for i in 0..5 {
            let option = if i < correct { 0 } else { 1 };
            session.answer_diagnostic(option).unwrap();
            session.advance().unwrap();
        }
    }

    fn run_module(session: &mut Session, module: ModuleId, answers: &[&str]) {
        session.select_module(module).unwrap();
        for answer in answers {
            session.submit(Some(Answer::text(*answer))).unwrap();
            session.advance().unwrap();
        }
    }

    #[test]
    fn novice_after_one_correct_answer() {
        let mut session = Session::new(content());
        session.start().unwrap();
        // Only the third item is answered correctly.
        for i in 0..5 {
            session.answer_diagnostic(usize::from(i != 2)).unwrap();
            session.advance().unwrap();
        }
        assert_eq!(session.phase(), PhaseKind::ModuleSelection);
        let profile = session.profile();
        assert_eq!(profile.level, Level::Novice);
        assert_eq!(
            profile.error_patterns,
            vec![
                ErrorType::new("err-d1"),
                ErrorType::new("err-d2"),
                ErrorType::new("err-d4"),
                ErrorType::new("err-d5"),
            ]
        );
        assert_eq!(profile.recommended_module(), Some(ModuleId::Tables));
    }

    #[test]
    fn diagnostic_levels_from_session() {
        for (correct, level) in [(3, Level::Developing), (4, Level::Advanced)] {
            let mut session = Session::new(content());
            finish_diagnostic(&mut session, correct);
            assert_eq!(session.profile().level, level);
        }
    }

    #[test]
    fn completing_tables_awards_badge_once() {
        let mut session = Session::new(content());
        finish_diagnostic(&mut session, 5);
        run_module(&mut session, ModuleId::Tables, &["1", "2", "3"]);

        let profile = session.profile();
        assert_eq!(session.phase(), PhaseKind::ModuleSelection);
        assert_eq!(profile.total_score, 3);
        assert_eq!(profile.badges, vec!["🏆 Tabellen-Profi"]);
        assert!(profile.is_completed(ModuleId::Tables));
    }

    #[test]
    fn replaying_completed_module_changes_nothing() {
        let mut session = Session::new(content());
        finish_diagnostic(&mut session, 5);
        run_module(&mut session, ModuleId::Tables, &["1", "0", "0"]);
        run_module(&mut session, ModuleId::Tables, &["1", "2", "3"]);

        let profile = session.profile();
        assert_eq!(profile.total_score, 1);
        assert_eq!(profile.badges.len(), 1);
        assert_eq!(profile.completed_modules.len(), 1);
    }

    #[test]
    fn back_discards_run_score() {
        let mut session = Session::new(content());
        finish_diagnostic(&mut session, 5);
        session.select_module(ModuleId::Tables).unwrap();
        assert_eq!(session.module_state(ModuleId::Tables), ModuleState::InProgress);
        session.submit(Some(Answer::text("1"))).unwrap();
        session.advance().unwrap();
        session.back().unwrap();

        assert_eq!(session.phase(), PhaseKind::ModuleSelection);
        assert_eq!(session.profile().total_score, 0);
        assert_eq!(session.module_state(ModuleId::Tables), ModuleState::NotStarted);

        // Re-entering starts from the first task with a fresh counter.
        session.select_module(ModuleId::Tables).unwrap();
        let runner = session.runner().unwrap();
        assert_eq!(runner.position(), 0);
        assert_eq!(runner.score(), 0);
    }

    #[test]
    fn final_challenge_locked_until_all_modules_done() {
        let mut session = Session::new(content());
        finish_diagnostic(&mut session, 5);
        run_module(&mut session, ModuleId::Tables, &["1", "2", "3"]);
        run_module(&mut session, ModuleId::Strategies, &["4"]);

        assert!(!session.can_start_final());
        let err = session.start_final_challenge().unwrap_err();
        assert!(err.is_locked());
        assert_eq!(session.phase(), PhaseKind::ModuleSelection);

        run_module(&mut session, ModuleId::Context, &["5", "6"]);
        assert!(session.can_start_final());
        session.start_final_challenge().unwrap();
        assert_eq!(session.phase(), PhaseKind::FinalSummary);
        assert_eq!(session.profile().total_score, 6);
    }

    #[test]
    fn restart_resets_profile() {
        let mut session = Session::new(content());
        finish_diagnostic(&mut session, 1);
        run_module(&mut session, ModuleId::Tables, &["1", "2", "3"]);
        run_module(&mut session, ModuleId::Strategies, &["4"]);
        run_module(&mut session, ModuleId::Context, &["5", "6"]);
        session.start_final_challenge().unwrap();
        session.advance().unwrap();
        assert_eq!(session.phase(), PhaseKind::FinalReflection);

        let first_id = session.id();
        session.restart().unwrap();
        assert_eq!(session.phase(), PhaseKind::Start);
        assert_eq!(session.profile(), &LearnerProfile::default());
        assert_ne!(session.id(), first_id);
    }

    #[test]
    fn disallowed_actions_are_rejected() {
        let mut session = Session::new(content());
        assert_eq!(
            session.advance(),
            Err(SessionError::InvalidAction {
                action: "advance",
                phase: PhaseKind::Start
            })
        );
        assert!(session.select_module(ModuleId::Tables).is_err());
        assert!(session.restart().is_err());
        assert!(session.submit(None).is_err());
        assert!(session.start_final_challenge().is_err());

        session.start().unwrap();
        assert!(session.start().is_err());
        assert!(session.back().is_err());
        assert_eq!(session.advance(), Err(SessionError::NotChecked));
        assert_eq!(session.phase(), PhaseKind::Diagnostic);
    }

    #[test]
    fn hints_through_session() {
        let mut session = Session::new(content());
        finish_diagnostic(&mut session, 5);
        assert!(session.reveal_hint().is_err());
        session.select_module(ModuleId::Strategies).unwrap();
        assert_eq!(session.reveal_hint().unwrap(), Some("Dreisatz"));
        assert_eq!(session.reveal_hint().unwrap(), None);
    }
}
