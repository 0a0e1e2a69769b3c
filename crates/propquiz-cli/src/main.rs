//! propquiz CLI — play the proportionality course in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod input;

#[derive(Parser)]
#[command(
    name = "propquiz",
    version,
    about = "Adaptive practice for proportional and inverse-proportional relationships"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive session
    Play {
        /// Content JSON file (default: bundled content)
        #[arg(long)]
        content: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Where to write the session summary JSON
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Validate a content JSON file
    Validate {
        /// Path to content file
        #[arg(long)]
        content: PathBuf,
    },

    /// List modules with task counts and badges
    Modules {
        /// Content JSON file (default: bundled content)
        #[arg(long)]
        content: Option<PathBuf>,
    },

    /// Evaluate a single answer for a task
    Evaluate {
        /// Task ID
        #[arg(long)]
        task: String,

        /// Answer as typed by a learner
        #[arg(long, allow_hyphen_values = true)]
        answer: String,

        /// Content JSON file (default: bundled content)
        #[arg(long)]
        content: Option<PathBuf>,
    },

    /// Create starter config and content files
    Init,
}

fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "propquiz=warn".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            content,
            config,
            summary,
        } => commands::play::execute(content, config, summary),
        Commands::Validate { content } => commands::validate::execute(content),
        Commands::Modules { content } => commands::modules::execute(content),
        Commands::Evaluate {
            task,
            answer,
            content,
        } => commands::evaluate::execute(task, answer, content),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
