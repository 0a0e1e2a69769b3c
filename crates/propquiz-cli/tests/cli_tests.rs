//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn propquiz() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("propquiz").unwrap()
}

const BUNDLED: &str = "../propquiz-core/content/zuordnungen.json";

const SMALL_CONTENT: &str = r#"{
    "diagnostic": {"items": [
        {"id": "d1", "question": "2 Brote kosten 4 €. Was kostet 1 Brot?",
         "options": [{"text": "2 €", "correct": true}, {"text": "3 €", "errorType": "additive"}],
         "correctFeedback": "Richtig!", "wrongFeedback": "Halbiere den Preis."}
    ]},
    "tables": {"tasks": [
        {"type": "recognition", "id": "t1", "question": "Typ?",
         "data": [[1, 2], [2, 4]], "correct": "proportional"}
    ]},
    "strategies": {"tasks": [
        {"type": "trap", "id": "s1", "text": "Falle",
         "options": [{"value": 3}, {"value": 1, "correct": true}]}
    ]},
    "context": {"tasks": [
        {"type": "problem", "id": "c1", "text": "Wie viel?", "solution": 12, "unit": "€"}
    ]}
}"#;

fn write_small_content(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("small.json");
    std::fs::write(&path, SMALL_CONTENT).unwrap();
    path
}

#[test]
fn validate_bundled_content() {
    propquiz()
        .arg("validate")
        .arg("--content")
        .arg(BUNDLED)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 diagnostic items, 10 tasks"))
        .stdout(predicate::str::contains("Content valid"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(
        &path,
        r#"{"diagnostic": {"items": []},
            "tables": {"tasks": [
                {"type": "choice", "id": "x", "question": "?", "solution": 1},
                {"type": "choice", "id": "x", "question": "?", "solution": 2}
            ]}}"#,
    )
    .unwrap();

    propquiz()
        .arg("validate")
        .arg("--content")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("diagnostic has no items"))
        .stdout(predicate::str::contains("[x] WARNING: duplicate task ID: x"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    propquiz()
        .arg("validate")
        .arg("--content")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ nope").unwrap();

    propquiz()
        .arg("validate")
        .arg("--content")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse content JSON"));
}

#[test]
fn modules_lists_bundled_modules() {
    propquiz()
        .arg("modules")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tabellen-Detektive"))
        .stdout(predicate::str::contains("Rechen-Champion"))
        .stdout(predicate::str::contains("max score 10"));
}

#[test]
fn modules_respects_content_env_override() {
    let dir = TempDir::new().unwrap();
    let path = write_small_content(&dir);

    propquiz()
        .current_dir(dir.path())
        .env("PROPQUIZ_CONTENT", &path)
        .arg("modules")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 diagnostic items, max score 3"));
}

#[test]
fn evaluate_calculation_answers() {
    propquiz()
        .args(["evaluate", "--task", "c4", "--answer", "42,5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c4 (context, problem): correct"));

    propquiz()
        .args(["evaluate", "--task", "s2", "--answer", "15.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("incorrect"));
}

#[test]
fn evaluate_completion_marks_cells() {
    propquiz()
        .args(["evaluate", "--task", "t3", "--answer", "5 11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("t3 (tables, completion): incorrect"))
        .stdout(predicate::str::contains("cell (2, 2): ok"))
        .stdout(predicate::str::contains("cell (3, 2): wrong"));
}

#[test]
fn evaluate_trap_by_value() {
    propquiz()
        .args(["evaluate", "--task", "s3", "--answer", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("correct"));
}

#[test]
fn evaluate_unknown_task_fails() {
    propquiz()
        .args(["evaluate", "--task", "zz", "--answer", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no task with ID `zz`"));
}

#[test]
fn evaluate_unparseable_label_fails() {
    propquiz()
        .args(["evaluate", "--task", "t1", "--answer", "linear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid answer for recognition task"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    propquiz()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created propquiz.toml"))
        .stdout(predicate::str::contains("Created content/zuordnungen.json"));

    assert!(dir.path().join("propquiz.toml").exists());
    assert!(dir.path().join("content/zuordnungen.json").exists());

    propquiz()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--content")
        .arg("content/zuordnungen.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("Content valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    propquiz().current_dir(dir.path()).arg("init").assert().success();

    propquiz()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn play_scripted_session() {
    let dir = TempDir::new().unwrap();
    let content = write_small_content(&dir);
    let summary = dir.path().join("out").join("summary.json");

    // start, diagnostic (wrong), tables, strategies, context (wrong),
    // final challenge, reflection.
    let script = [
        "", "2", "", "1", "p", "", "2", "1", "", "3", "11", "", "f", "", "n",
    ]
    .join("\n")
        + "\n";

    propquiz()
        .current_dir(dir.path())
        .arg("play")
        .arg("--content")
        .arg(&content)
        .arg("--summary")
        .arg(&summary)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dein Level: novice"))
        .stdout(predicate::str::contains("Die richtige Lösung ist 12 €."))
        .stdout(predicate::str::contains("Gesamtpunkte: 2/3"))
        .stdout(predicate::str::contains("🎉 Geschafft!"))
        .stderr(predicate::str::contains("Neues Abzeichen: 🏆 Tabellen-Profi"));

    let json = std::fs::read_to_string(&summary).unwrap();
    assert!(json.contains("\"total_score\": 2"));
    assert!(json.contains("\"level\": \"novice\""));
}

#[test]
fn play_with_hints_disabled_by_config() {
    let dir = TempDir::new().unwrap();
    let content = write_small_content(&dir);
    std::fs::write(dir.path().join("propquiz.toml"), "show_hints = false\n").unwrap();

    propquiz()
        .current_dir(dir.path())
        .arg("play")
        .arg("--content")
        .arg(&content)
        .write_stdin("\n1\n\n1\n?\nz\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tipps sind ausgeschaltet."))
        .stdout(predicate::str::contains("Bis bald!"));
}

#[test]
fn play_missing_config_fails() {
    propquiz()
        .arg("play")
        .arg("--config")
        .arg("no_such_config.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn help_output() {
    propquiz()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("proportional"));
}

#[test]
fn version_output() {
    propquiz()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("propquiz"));
}
