//! Configuration validation (Immutable functional pattern)

use std::path::PathBuf;

use super::types::Config;
use crate::{
    builder::BuildOptions,
    mux::TmuxServer,
    workspace::NodePath,
    Error, Result, ResolveContext,
};

// ═══════════════════════════════════════════════════════════════════════════
// VALIDATION LOGIC
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if:
    /// - `workspace_dir` or `tmux.binary` is empty
    /// - Both `tmux.socket_name` and `tmux.socket_path` are set
    /// - A socket setting or hook command is blank
    pub fn validate(&self) -> Result<()> {
        if self.workspace_dir.trim().is_empty() {
            return Err(Error::invalid_config("workspace_dir cannot be empty"));
        }

        if self.tmux.binary.trim().is_empty() {
            return Err(Error::invalid_config("tmux.binary cannot be empty"));
        }

        match (&self.tmux.socket_name, &self.tmux.socket_path) {
            (Some(_), Some(_)) => {
                return Err(Error::invalid_config(
                    "tmux.socket_name and tmux.socket_path are mutually exclusive",
                ))
            }
            (Some(value), None) | (None, Some(value)) if value.trim().is_empty() => {
                return Err(Error::invalid_config(
                    "tmux socket settings cannot be empty - unset them instead",
                ))
            }
            _ => {}
        }

        for point in crate::hooks::HookPoint::ALL {
            if self
                .hooks
                .commands(point)
                .iter()
                .any(|command| command.trim().is_empty())
            {
                return Err(Error::invalid_config(format!(
                    "hooks.{point} contains an empty command"
                )));
            }
        }

        Ok(())
    }

    /// Workspace directory with `~` and variables expanded.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the directory cannot be expanded.
    pub fn workspace_dir_path(&self, ctx: &ResolveContext) -> Result<PathBuf> {
        ctx.expand_path(&self.workspace_dir, &NodePath::root().key("workspace_dir"))
            .map(|path| ctx.cwd().join(path))
            .map_err(|e| Error::invalid_config(format!("workspace_dir: {e}")))
    }

    /// Build options implied by the configuration.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            on_conflict: self.on_conflict,
            best_effort: self.best_effort_hooks.iter().copied().collect(),
        }
    }

    /// tmux server described by the `[tmux]` table.
    pub fn tmux_server(&self) -> TmuxServer {
        let server = TmuxServer::new().with_binary(&self.tmux.binary);
        let server = match &self.tmux.socket_name {
            Some(name) => server.with_socket_name(name),
            None => server,
        };
        match &self.tmux.socket_path {
            Some(path) => server.with_socket_path(shellexpand::tilde(path).into_owned()),
            None => server,
        }
    }
}
