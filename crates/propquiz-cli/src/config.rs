//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level propquiz configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropquizConfig {
    /// Content document to play. The bundled content is used when unset.
    #[serde(default)]
    pub content_path: Option<PathBuf>,
    /// Directory the session summary is written to.
    #[serde(default = "default_summary_dir")]
    pub summary_dir: PathBuf,
    /// Offer hints during module runs.
    #[serde(default = "default_true")]
    pub show_hints: bool,
}

fn default_summary_dir() -> PathBuf {
    PathBuf::from("./propquiz-summaries")
}

fn default_true() -> bool {
    true
}

impl Default for PropquizConfig {
    fn default() -> Self {
        Self {
            content_path: None,
            summary_dir: default_summary_dir(),
            show_hints: true,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `propquiz.toml` in the current directory
/// 2. `~/.config/propquiz/config.toml`
///
/// Environment variable override: `PROPQUIZ_CONTENT`.
pub fn load_config() -> Result<PropquizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<PropquizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("propquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loading config");
            toml::from_str::<PropquizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => PropquizConfig::default(),
    };

    if let Ok(content) = std::env::var("PROPQUIZ_CONTENT") {
        if !content.is_empty() {
            config.content_path = Some(PathBuf::from(content));
        }
    }

    config.content_path = config.content_path.as_deref().map(resolve_path);
    config.summary_dir = resolve_path(&config.summary_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("propquiz"))
}
