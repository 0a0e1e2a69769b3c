//! The `propquiz modules` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use propquiz_core::model::ModuleId;

use crate::config::load_config;

pub fn execute(content_path: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let content =
        super::resolve_content(content_path.as_deref(), config.content_path.as_deref())?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Module", "Description", "Tasks", "Badge"]);
    for (i, module) in ModuleId::ALL.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(module.display_name()),
            Cell::new(module.description()),
            Cell::new(content.tasks(*module).len()),
            Cell::new(module.badge().unwrap_or("-")),
        ]);
    }

    println!("{table}");
    println!(
        "{} diagnostic items, max score {}",
        content.diagnostic.items.len(),
        content.max_score()
    );

    Ok(())
}
