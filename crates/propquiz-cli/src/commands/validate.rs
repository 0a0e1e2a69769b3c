//! The `propquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use propquiz_core::model::ModuleId;

pub fn execute(content_path: PathBuf) -> Result<()> {
    let content = propquiz_core::parser::parse_content(&content_path)?;

    println!(
        "Content: {} ({} diagnostic items, {} tasks)",
        content_path.display(),
        content.diagnostic.items.len(),
        content.max_score()
    );
    for module in ModuleId::ALL {
        println!("  {}: {} tasks", module, content.tasks(module).len());
    }

    let warnings = propquiz_core::parser::validate_content(&content);
    for w in &warnings {
        let prefix = w
            .location
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Content valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
