//! The `propquiz init` command.

use std::path::Path;

use anyhow::Result;

use propquiz_core::parser::BUNDLED_CONTENT;

pub fn execute() -> Result<()> {
    if Path::new("propquiz.toml").exists() {
        println!("propquiz.toml already exists, skipping.");
    } else {
        std::fs::write("propquiz.toml", SAMPLE_CONFIG)?;
        println!("Created propquiz.toml");
    }

    std::fs::create_dir_all("content")?;
    let content_path = Path::new("content/zuordnungen.json");
    if content_path.exists() {
        println!("content/zuordnungen.json already exists, skipping.");
    } else {
        std::fs::write(content_path, BUNDLED_CONTENT)?;
        println!("Created content/zuordnungen.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit content/zuordnungen.json to adapt the tasks");
    println!("  2. Run: propquiz validate --content content/zuordnungen.json");
    println!("  3. Run: propquiz play");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# propquiz configuration

content_path = "content/zuordnungen.json"
summary_dir = "./propquiz-summaries"
show_hints = true
"#;
