pub mod evaluate;
pub mod init;
pub mod modules;
pub mod play;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use propquiz_core::model::Content;
use propquiz_core::parser;

/// Load the content named on the command line, else the configured content,
/// else the bundled content.
fn resolve_content(flag: Option<&Path>, configured: Option<&Path>) -> Result<Content> {
    let path = flag.or(configured);
    if let Some(path) = path {
        tracing::info!(path = %path.display(), "loading content");
    }
    parser::load_content(path)
}
