//! Freeze a running session into a workspace file

use std::path::{Path, PathBuf};

use anyhow::Result;
use muxfile_core::{
    freeze_session, inline,
    workspace::{render_document, WorkspaceFormat},
    Error,
};

use super::{settings, write_output, SocketOverride};

#[derive(Debug, Clone)]
pub struct FreezeOptions {
    pub session: String,
    pub format: Option<WorkspaceFormat>,
    pub output: Option<PathBuf>,
    pub force: bool,
    pub socket: SocketOverride,
}

pub fn run(options: &FreezeOptions) -> Result<()> {
    let config = settings(&options.socket)?;
    let server = config.tmux_server().detect().map_err(Error::from)?;
    let frozen = freeze_session(&server, &options.session)?;

    let format = output_format(
        options.format,
        options.output.as_deref(),
        config.freeze_format,
    );
    let text = render_document(&inline(&frozen), format)?;
    write_output(&text, options.output.as_deref(), options.force)
}

/// `--format`, else the output file's extension, else the configured default.
fn output_format(
    explicit: Option<WorkspaceFormat>,
    output: Option<&Path>,
    fallback: WorkspaceFormat,
) -> WorkspaceFormat {
    explicit
        .or_else(|| output.and_then(|path| WorkspaceFormat::from_path(path).ok()))
        .unwrap_or(fallback)
}
