//! Session summary with JSON export and markdown rendering.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ErrorType, Level, ModuleId};
use crate::session::Session;

/// Snapshot of a learner's session, as shown on the final screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session identifier.
    pub id: Uuid,
    /// When the summary was taken.
    pub created_at: DateTime<Utc>,
    pub level: Level,
    /// Number of completed modules.
    pub modules_mastered: usize,
    /// Number of modules in the program.
    pub module_count: usize,
    pub badges: Vec<String>,
    pub total_score: u32,
    /// One point per task across all modules.
    pub max_score: usize,
    /// Error patterns from the diagnostic, in answer order.
    pub error_patterns: Vec<ErrorType>,
    pub modules: Vec<ModuleSummary>,
}

/// One row of the per-module table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub module: ModuleId,
    pub name: String,
    pub task_count: usize,
    pub completed: bool,
    #[serde(default)]
    pub badge: Option<String>,
}

impl SessionSummary {
    pub(crate) fn from_session(session: &Session) -> Self {
        let profile = session.profile();
        let content = session.content();

        let modules = ModuleId::ALL
            .iter()
            .map(|&module| {
                let completed = profile.is_completed(module);
                ModuleSummary {
                    module,
                    name: module.display_name(),
                    task_count: content.tasks(module).len(),
                    completed,
                    badge: module
                        .badge()
                        .filter(|_| completed)
                        .map(str::to_string),
                }
            })
            .collect();

        Self {
            id: session.id(),
            created_at: Utc::now(),
            level: profile.level,
            modules_mastered: profile.completed_count(),
            module_count: ModuleId::ALL.len(),
            badges: profile.badges.clone(),
            total_score: profile.total_score,
            max_score: content.max_score(),
            error_patterns: profile.error_patterns.clone(),
            modules,
        }
    }

    /// How often each error pattern occurred in the diagnostic.
    pub fn error_pattern_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for pattern in &self.error_patterns {
            *counts.entry(pattern.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let summary: SessionSummary =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(summary)
    }

    /// Format the summary as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Geschafft!\n\n");
        md.push_str(&format!(
            "**Level:** {} | **Module gemeistert:** {}/{} | **Punkte:** {}/{}\n\n",
            self.level, self.modules_mastered, self.module_count, self.total_score, self.max_score
        ));

        md.push_str("| Modul | Aufgaben | Abgeschlossen | Abzeichen |\n");
        md.push_str("|-------|----------|---------------|-----------|\n");
        for m in &self.modules {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                m.name,
                m.task_count,
                if m.completed { "ja" } else { "nein" },
                m.badge.as_deref().unwrap_or("-")
            ));
        }
        md.push('\n');

        if !self.badges.is_empty() {
            md.push_str("## Abzeichen\n\n");
            for badge in &self.badges {
                md.push_str(&format!("- {badge}\n"));
            }
            md.push('\n');
        }

        let counts = self.error_pattern_counts();
        if !counts.is_empty() {
            md.push_str("## Fehlermuster aus der Diagnose\n\n");
            md.push_str("| Muster | Anzahl |\n");
            md.push_str("|--------|--------|\n");
            for (pattern, count) in counts {
                md.push_str(&format!("| {pattern} | {count} |\n"));
            }
        }

        md
    }
}
