//! Built-in plugin running shell commands from the `[hooks]` config table
//!
//! Commands for a point execute sequentially with `$SHELL -c` in the
//! resolved directory of the node the hook fires for. The first non-zero
//! exit fails the callback.

use std::{path::Path, process::Command, sync::Arc};

use super::{HookContext, HookError, HookFn, HookPoint, Plugin};
use crate::config::HooksConfig;

/// Environment exported to every hook command.
pub const SESSION_VAR: &str = "MUXFILE_SESSION";
pub const WINDOW_VAR: &str = "MUXFILE_WINDOW";
pub const PANE_VAR: &str = "MUXFILE_PANE";
pub const HOOK_VAR: &str = "MUXFILE_HOOK";

#[derive(Debug, Clone, Default)]
pub struct ShellHooks {
    config: HooksConfig,
}

impl ShellHooks {
    #[must_use]
    pub const fn new(config: HooksConfig) -> Self {
        Self { config }
    }
}

impl Plugin for ShellHooks {
    fn name(&self) -> &str {
        "shell"
    }

    fn hooks(&self) -> Vec<(HookPoint, HookFn)> {
        HookPoint::ALL
            .into_iter()
            .filter(|point| !self.config.commands(*point).is_empty())
            .map(|point| {
                let commands: Arc<[String]> = self.config.commands(point).into();
                let hook: HookFn = Box::new(move |ctx: &HookContext<'_>| run_commands(&commands, ctx));
                (point, hook)
            })
            .collect()
    }
}

fn run_commands(commands: &[String], ctx: &HookContext<'_>) -> Result<(), HookError> {
    let shell = get_user_shell()?;
    let cwd = ctx.start_directory();
    for (index, command) in commands.iter().enumerate() {
        tracing::info!(
            hook = ctx.point.event_name(),
            step = index + 1,
            total = commands.len(),
            %command,
            "running hook command"
        );
        let output = hook_command(&shell, command, cwd, ctx)
            .output()
            .map_err(|e| format!("failed to run `{command}` with {shell}: {e}"))?;
        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "a signal".to_string(), |code| code.to_string());
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("`{command}` exited with {code}: {}", stderr.trim()).into());
        }
    }
    Ok(())
}

fn hook_command(shell: &str, command: &str, cwd: &Path, ctx: &HookContext<'_>) -> Command {
    let mut cmd = Command::new(shell);
    cmd.arg("-c")
        .arg(command)
        .current_dir(cwd)
        .env(SESSION_VAR, &ctx.session.name)
        .env(HOOK_VAR, ctx.point.event_name());
    if let Some((window, _)) = ctx.window {
        cmd.env(WINDOW_VAR, &window.id);
    }
    if let Some((pane, _)) = ctx.pane {
        cmd.env(PANE_VAR, &pane.id);
    }
    cmd
}

/// Get the user's default shell from the SHELL environment variable
///
/// Falls back to `/bin/sh` if SHELL is not set.
fn get_user_shell() -> Result<String, HookError> {
    match std::env::var("SHELL") {
        Ok(shell) if shell.is_empty() => Err("SHELL environment variable is empty".into()),
        Ok(shell) => Ok(shell),
        Err(_) => Ok("/bin/sh".to_string()),
    }
}
