//! The `propquiz play` command.
//!
//! Renders the session as plain text and feeds it one learner line at a time.
//! The loop is generic over its reader and writer so tests can script a whole
//! playthrough.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::Table;

use propquiz_core::diagnostic::DiagnosticOutcome;
use propquiz_core::evaluator::completion_cell_verdicts;
use propquiz_core::model::{Answer, ModuleId, Relation, Task};
use propquiz_core::progression::{CompletionOutcome, ModuleState};
use propquiz_core::session::{PhaseKind, Session};
use propquiz_core::traits::SessionObserver;

use crate::config::load_config_from;
use crate::input::parse_answer;

/// Prints badges and diagnostic results as they happen.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_phase_change(&self, from: PhaseKind, to: PhaseKind) {
        tracing::debug!(%from, %to, "screen change");
    }

    fn on_diagnostic_complete(&self, outcome: &DiagnosticOutcome) {
        eprintln!(
            "  Diagnose: {}/{} richtig, Level {}",
            outcome.correct_count, outcome.item_count, outcome.level
        );
    }

    fn on_task_checked(&self, module: ModuleId, task_id: &str, correct: bool) {
        tracing::debug!(%module, task = task_id, correct, "task checked");
    }

    fn on_module_complete(&self, module: ModuleId, outcome: &CompletionOutcome) {
        match outcome {
            CompletionOutcome::Recorded {
                badge: Some(badge),
                score,
            } => eprintln!("  Neues Abzeichen: {badge} (+{score} Punkte)"),
            CompletionOutcome::Recorded { badge: None, score } => {
                eprintln!("  {} abgeschlossen (+{score} Punkte)", module.name())
            }
            CompletionOutcome::AlreadyCompleted => eprintln!(
                "  {} war schon abgeschlossen, Punkte zählen nur einmal.",
                module.name()
            ),
        }
    }
}

/// Settings for an interactive run.
#[derive(Debug, Clone)]
pub struct PlayOptions {
    pub show_hints: bool,
    /// Explicit summary file; otherwise `<summary_dir>/<session id>.json`.
    pub summary_path: Option<PathBuf>,
    pub summary_dir: PathBuf,
}

pub fn execute(
    content_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    summary_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let content =
        super::resolve_content(content_path.as_deref(), config.content_path.as_deref())?;

    let session = Session::new(Arc::new(content)).with_observer(Box::new(ConsoleObserver));
    let options = PlayOptions {
        show_hints: config.show_hints,
        summary_path,
        summary_dir: config.summary_dir,
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    play(session, &mut stdin.lock(), &mut stdout.lock(), &options)
}

struct Console<'a, R, W> {
    input: &'a mut R,
    out: &'a mut W,
}

impl<R: BufRead, W: Write> Console<'_, R, W> {
    /// Print a prompt and read one trimmed line. `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{prompt}> ")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Run the session until the learner quits or the input ends.
pub fn play<R: BufRead, W: Write>(
    mut session: Session,
    input: &mut R,
    out: &mut W,
    options: &PlayOptions,
) -> Result<()> {
    let mut console = Console { input, out };
    loop {
        let keep_going = match session.phase() {
            PhaseKind::Start => start_screen(&mut session, &mut console)?,
            PhaseKind::Diagnostic => diagnostic_screen(&mut session, &mut console)?,
            PhaseKind::ModuleSelection => module_menu(&mut session, &mut console)?,
            PhaseKind::ModuleRunning => task_screen(&mut session, &mut console, options)?,
            PhaseKind::FinalSummary => final_summary(&mut session, &mut console, options)?,
            PhaseKind::FinalReflection => reflection(&mut session, &mut console)?,
        };
        if !keep_going {
            break;
        }
    }
    writeln!(console.out, "Bis bald! 👋")?;
    Ok(())
}

fn start_screen<R: BufRead, W: Write>(
    session: &mut Session,
    c: &mut Console<'_, R, W>,
) -> Result<bool> {
    writeln!(c.out, "🎯 Zuordnungen meistern")?;
    writeln!(
        c.out,
        "Proportionale und antiproportionale Zuordnungen verstehen\n"
    )?;
    writeln!(c.out, "Was erwartet dich?")?;
    for line in [
        "Wertetabellen verstehen und vervollständigen",
        "Graphen proportionaler Zuordnungen erkennen",
        "Flexible Rechenstrategien entwickeln",
        "Textaufgaben aus dem Alltag lösen",
    ] {
        writeln!(c.out, "  ✓ {line}")?;
    }
    if c.read_line("\n[Enter] Los geht's! 🚀 ")?.is_none() {
        return Ok(false);
    }
    session.start()?;
    Ok(true)
}

fn diagnostic_screen<R: BufRead, W: Write>(
    session: &mut Session,
    c: &mut Console<'_, R, W>,
) -> Result<bool> {
    let Some(engine) = session.diagnostic() else {
        return Ok(true);
    };
    let Some(item) = engine.current_item() else {
        // Nothing to ask; move straight on to the modules.
        session.advance()?;
        return Ok(true);
    };
    let option_count = item.options.len();
    let is_last = engine.position() + 1 == engine.item_count();

    writeln!(
        c.out,
        "\n📋 Eingangsdiagnose: Frage {} von {}",
        engine.position() + 1,
        engine.item_count()
    )?;
    writeln!(c.out, "{}", item.question)?;
    for (i, option) in item.options.iter().enumerate() {
        writeln!(c.out, "  {}) {}", i + 1, option.text)?;
    }

    let correct = loop {
        let Some(line) = c.read_line("")? else {
            return Ok(false);
        };
        let Some(index) = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|i| *i < option_count)
        else {
            writeln!(c.out, "Bitte eine Zahl von 1 bis {option_count} eingeben.")?;
            continue;
        };
        match session.answer_diagnostic(index) {
            Ok(correct) => break correct,
            Err(e) => writeln!(c.out, "⚠️ {e}")?,
        }
    };

    let feedback = session
        .diagnostic()
        .and_then(|e| e.feedback())
        .unwrap_or_default();
    writeln!(c.out, "{} {feedback}", if correct { "✓" } else { "✗" })?;

    let prompt = if is_last {
        "[Enter] Diagnose abschließen "
    } else {
        "[Enter] Nächste Frage "
    };
    if c.read_line(prompt)?.is_none() {
        return Ok(false);
    }
    session.advance()?;

    if session.phase() == PhaseKind::ModuleSelection {
        writeln!(c.out, "\nDiagnose abgeschlossen. Dein Level: {}", session.profile().level)?;
    }
    Ok(true)
}

fn module_menu<R: BufRead, W: Write>(
    session: &mut Session,
    c: &mut Console<'_, R, W>,
) -> Result<bool> {
    let profile = session.profile();
    writeln!(c.out, "\n🎓 Deine Lernmodule")?;
    writeln!(
        c.out,
        "Level: {} • Punkte: {}",
        profile.level, profile.total_score
    )?;
    if let Some(module) = session.recommended_module() {
        writeln!(c.out, "💡 Tipp: Starte mit \"{}\"!", module.name())?;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Modul", "Beschreibung", "Aufgaben", "Status"]);
    for (i, module) in ModuleId::ALL.iter().enumerate() {
        let status = match session.module_state(*module) {
            ModuleState::Completed => format!("✓ {}", module.badge().unwrap_or("fertig")),
            ModuleState::InProgress => "läuft".to_string(),
            ModuleState::NotStarted => "offen".to_string(),
        };
        table.add_row(vec![
            (i + 1).to_string(),
            module.display_name(),
            module.description().to_string(),
            session.content().tasks(*module).len().to_string(),
            status,
        ]);
    }
    writeln!(c.out, "{table}")?;

    let lock = if session.can_start_final() { "" } else { " 🔒" };
    writeln!(c.out, "f) 🏆 Final-Challenge{lock}   q) Beenden")?;

    loop {
        let Some(line) = c.read_line("")? else {
            return Ok(false);
        };
        match line.as_str() {
            "q" => return Ok(false),
            "f" => match session.start_final_challenge() {
                Ok(()) => return Ok(true),
                Err(e) => writeln!(c.out, "🔒 {e}")?,
            },
            other => match other.parse::<ModuleId>() {
                Ok(module) => {
                    session.select_module(module)?;
                    return Ok(true);
                }
                Err(_) => writeln!(c.out, "Bitte 1-3, f oder q eingeben.")?,
            },
        }
    }
}

fn task_screen<R: BufRead, W: Write>(
    session: &mut Session,
    c: &mut Console<'_, R, W>,
    options: &PlayOptions,
) -> Result<bool> {
    let Some(runner) = session.runner() else {
        return Ok(true);
    };
    let Some(task) = runner.current_task().cloned() else {
        writeln!(c.out, "Dieses Modul hat keine Aufgaben.")?;
        session.back()?;
        return Ok(true);
    };

    writeln!(
        c.out,
        "\n{}: Aufgabe {} von {} • Punkte: {}/{}",
        runner.module().display_name(),
        runner.position() + 1,
        runner.task_count(),
        runner.score(),
        runner.answered()
    )?;
    render_task(&task, c.out)?;
    writeln!(c.out, "(? = Tipp, z = zurück)")?;

    loop {
        let Some(line) = c.read_line("")? else {
            return Ok(false);
        };
        match line.as_str() {
            "" => continue,
            "?" => {
                if !options.show_hints {
                    writeln!(c.out, "Tipps sind ausgeschaltet.")?;
                    continue;
                }
                match session.reveal_hint()?.map(str::to_string) {
                    Some(hint) => {
                        let level = session.runner().map_or(0, |r| r.hint_level());
                        let total = task.hints().len();
                        writeln!(c.out, "💡 Tipp {level}/{total}: {hint}")?;
                    }
                    None => writeln!(c.out, "Keine weiteren Tipps.")?,
                }
            }
            "z" => {
                session.back()?;
                writeln!(c.out, "Zurück zur Modulauswahl.")?;
                return Ok(true);
            }
            input => match parse_answer(&task, input) {
                Ok(answer) => {
                    let correct = session.submit(Some(answer.clone()))?;
                    render_feedback(&task, &answer, correct, c.out)?;
                    break;
                }
                Err(e) => writeln!(c.out, "⚠️ {e}")?,
            },
        }
    }

    if c.read_line("[Enter] Weiter ")?.is_none() {
        return Ok(false);
    }
    session.advance()?;
    Ok(true)
}

fn render_task<W: Write>(task: &Task, out: &mut W) -> Result<()> {
    writeln!(out, "{}", task.prompt())?;
    match task {
        Task::Recognition(t) | Task::Situation(t) => {
            if !t.data.is_empty() {
                let mut table = Table::new();
                table.set_header(vec!["x", "y"]);
                for [x, y] in &t.data {
                    table.add_row(vec![format_number(*x), format_number(*y)]);
                }
                writeln!(out, "{table}")?;
            }
            for (i, relation) in Relation::ALL.iter().enumerate() {
                writeln!(out, "  {}) {}", i + 1, relation.label())?;
            }
        }
        Task::Completion(t) => {
            let mut table = Table::new();
            table.set_header(vec!["x", "y"]);
            for row in &t.data {
                table.add_row(
                    row.iter()
                        .map(|cell| cell.map_or_else(|| "?".to_string(), format_number))
                        .collect::<Vec<_>>(),
                );
            }
            writeln!(out, "{table}")?;
            writeln!(
                out,
                "Gib die {} fehlenden Werte der Reihe nach ein (mit Leerzeichen getrennt).",
                t.blanks().count()
            )?;
        }
        Task::Choice(t) | Task::Mixed(t) | Task::Problem(t) => {
            if let Some(unit) = &t.unit {
                writeln!(out, "Antwort in {unit}:")?;
            }
        }
        Task::Trap(t) => {
            let values: Vec<String> = t.options.iter().map(|o| o.value.to_string()).collect();
            writeln!(out, "Wähle: {}", values.join(" | "))?;
        }
    }
    Ok(())
}

fn render_feedback<W: Write>(task: &Task, answer: &Answer, correct: bool, out: &mut W) -> Result<()> {
    match (task, answer) {
        (Task::Recognition(t) | Task::Situation(t), _) => {
            let text = t.feedback(correct);
            if correct {
                writeln!(out, "✓ {}", text.unwrap_or("Richtig!"))?;
            } else {
                writeln!(out, "✗ {}", text.unwrap_or("Leider falsch."))?;
                writeln!(out, "  Richtig ist: {}", t.correct.label())?;
            }
        }
        (Task::Completion(t), Answer::Cells(entries)) => {
            if correct {
                writeln!(out, "✓ Alle Werte stimmen!")?;
            } else {
                for ((row, col), ok) in completion_cell_verdicts(t, entries) {
                    if !ok {
                        let expected = t.solution_at(row, col).map(format_number);
                        writeln!(
                            out,
                            "✗ Zeile {}: richtig ist {}",
                            row + 1,
                            expected.as_deref().unwrap_or("?")
                        )?;
                    }
                }
            }
        }
        (Task::Choice(t) | Task::Mixed(t) | Task::Problem(t), _) => {
            if correct {
                writeln!(out, "✓ Perfekt gelöst!")?;
            } else {
                let solution = format_number(t.solution);
                let line = match &t.unit {
                    Some(unit) => format!("{solution} {unit}"),
                    None => solution,
                };
                writeln!(out, "⚠️ Nicht ganz. Die richtige Lösung ist {line}.")?;
            }
        }
        (Task::Trap(t), _) => {
            let text = if correct {
                t.correct_feedback.as_deref().unwrap_or("Richtig!")
            } else {
                t.wrong_feedback.as_deref().unwrap_or("Leider falsch.")
            };
            writeln!(out, "{} {text}", if correct { "✓" } else { "✗" })?;
        }
        _ => writeln!(out, "{}", if correct { "✓" } else { "✗" })?,
    }
    Ok(())
}

fn final_summary<R: BufRead, W: Write>(
    session: &mut Session,
    c: &mut Console<'_, R, W>,
    options: &PlayOptions,
) -> Result<bool> {
    let summary = session.summary();

    writeln!(c.out, "\n🏆 Final-Challenge")?;
    writeln!(c.out, "Deine Leistung:")?;
    writeln!(
        c.out,
        "  Module gemeistert: {}/{}",
        summary.modules_mastered, summary.module_count
    )?;
    writeln!(c.out, "  Badges erhalten: {}", summary.badges.len())?;
    writeln!(
        c.out,
        "  Gesamtpunkte: {}/{}",
        summary.total_score, summary.max_score
    )?;
    if !summary.badges.is_empty() {
        writeln!(c.out, "Deine Badges: {}", summary.badges.join("  "))?;
    }

    let path = options
        .summary_path
        .clone()
        .unwrap_or_else(|| options.summary_dir.join(format!("{}.json", summary.id)));
    summary.save_json(&path)?;
    writeln!(c.out, "Zusammenfassung gespeichert: {}", path.display())?;

    if c.read_line("[Enter] Abschließen ")?.is_none() {
        return Ok(false);
    }
    session.advance()?;
    Ok(true)
}

fn reflection<R: BufRead, W: Write>(
    session: &mut Session,
    c: &mut Console<'_, R, W>,
) -> Result<bool> {
    writeln!(c.out, "\n🎉 Geschafft!")?;
    writeln!(c.out, "Du hast das Lernprogramm erfolgreich abgeschlossen!")?;
    writeln!(c.out, "Was hast du gelernt?")?;
    for line in [
        "Proportionale Zuordnungen erkennen",
        "Antiproportionale Zuordnungen erkennen",
        "Verschiedene Rechenstrategien anwenden",
        "Textaufgaben lösen",
        "Erkennen wenn etwas NICHT proportional ist",
    ] {
        writeln!(c.out, "  ☑ {line}")?;
    }

    let Some(line) = c.read_line("Nochmal starten? 🔄 (j/n) ")? else {
        return Ok(false);
    };
    if line.eq_ignore_ascii_case("j") {
        session.restart()?;
        return Ok(true);
    }
    Ok(false)
}

/// Format a number the way it is written in German: no trailing `.0`, comma
/// as decimal separator.
fn format_number(value: f64) -> String {
    value.to_string().replace('.', ",")
}
