//! List workspaces in the workspace directory

use std::path::Path;

use anyhow::Result;
use muxfile_core::{
    config::load_config,
    workspace::{list_workspaces, WorkspaceFormat},
    ResolveContext,
};
use serde_json::json;

#[derive(Debug, Clone, Copy, Default)]
pub struct LsOptions {
    pub json: bool,
}

pub fn run(options: &LsOptions) -> Result<()> {
    let config = load_config()?;
    let ctx = ResolveContext::from_env()?;
    let dir = config.workspace_dir_path(&ctx)?;
    let files = list_workspaces(&dir)?;

    if options.json {
        let entries: Vec<_> = files
            .iter()
            .map(|path| {
                json!({
                    "name": name(path),
                    "path": path.display().to_string(),
                    "format": WorkspaceFormat::from_path(path).ok().map(|f| f.to_string()),
                })
            })
            .collect();
        let output = json!({
            "workspace_dir": dir.display().to_string(),
            "workspaces": entries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if files.is_empty() {
        tracing::info!(dir = %dir.display(), "no workspaces found");
    }
    for path in &files {
        println!("{}", name(path));
    }
    Ok(())
}

fn name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
