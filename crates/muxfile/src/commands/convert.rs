//! Convert a workspace file between formats

use std::path::PathBuf;

use anyhow::{Context, Result};
use muxfile_core::{
    expand, inline,
    workspace::{read_document, render_document, WorkspaceFormat},
};

use super::write_output;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub file: PathBuf,
    pub format: WorkspaceFormat,
    /// Write the expanded tree instead of the compact form.
    pub canonical: bool,
    pub output: Option<PathBuf>,
    pub force: bool,
}

/// The document is normalized first, so a conversion also validates it.
pub fn run(options: &ConvertOptions) -> Result<()> {
    let (raw, source) = read_document(&options.file)?;
    let canonical = expand(&raw)
        .with_context(|| format!("Invalid workspace {}", options.file.display()))?;
    let value = if options.canonical {
        canonical.to_value()?
    } else {
        inline(&canonical)
    };
    tracing::debug!(from = %source, to = %options.format, canonical = options.canonical, "converting");
    let text = render_document(&value, options.format)?;
    write_output(&text, options.output.as_deref(), options.force)
}
