//! Freeze a live session back into a workspace tree.
//!
//! Pane commands are only kept when they are something worth re-running:
//! interactive shells (including login shells such as `-bash`) and bare
//! interpreters are dropped.

use crate::{
    mux::{MuxError, Multiplexer, PaneSnapshot, SessionSnapshot, WindowSnapshot},
    workspace::{PaneConfig, WindowConfig, WorkspaceConfig},
    Error, Result,
};

const SHELLS: &[&str] = &["bash", "zsh", "sh", "fish", "dash", "ksh", "tcsh", "csh"];
const INTERPRETERS: &[&str] = &["python", "python3", "ruby", "node"];

/// Capture `name` from the multiplexer and freeze it.
///
/// # Errors
///
/// Returns `Error::NotFound` if the session does not exist and
/// `Error::Multiplexer` if it cannot be observed.
pub fn freeze_session(mux: &dyn Multiplexer, name: &str) -> Result<WorkspaceConfig> {
    let snapshot = mux.snapshot(name).map_err(|e| match e {
        MuxError::NotFound(_) => Error::not_found(format!("session '{name}'")),
        other => Error::Multiplexer(other),
    })?;
    tracing::info!(session = name, windows = snapshot.windows.len(), "freezing session");
    Ok(freeze(&snapshot))
}

/// Convert an observed session into a canonical workspace tree.
pub fn freeze(snapshot: &SessionSnapshot) -> WorkspaceConfig {
    WorkspaceConfig {
        session_name: snapshot.name.clone(),
        windows: snapshot.windows.iter().map(freeze_window).collect(),
        ..WorkspaceConfig::default()
    }
}

fn freeze_window(window: &WindowSnapshot) -> WindowConfig {
    let shared_path = window
        .panes
        .first()
        .map(|pane| pane.current_path.as_str())
        .filter(|first| {
            !first.is_empty() && window.panes.iter().all(|pane| pane.current_path == *first)
        });

    WindowConfig {
        window_name: Some(window.name.clone()).filter(|name| !name.is_empty()),
        start_directory: shared_path.map(str::to_string),
        layout: Some(window.layout.clone()).filter(|layout| !layout.is_empty()),
        focus: window.active,
        panes: window
            .panes
            .iter()
            .map(|pane| freeze_pane(pane, shared_path.is_none()))
            .collect(),
        ..WindowConfig::default()
    }
}

fn freeze_pane(pane: &PaneSnapshot, change_directory: bool) -> PaneConfig {
    let mut commands = Vec::new();
    if change_directory && !pane.current_path.is_empty() {
        commands.push(format!("cd {}", shell_quote(&pane.current_path)));
    }
    let command = pane.current_command.trim();
    if !command.is_empty() && !is_idle(command) {
        commands.push(command.to_string());
    }
    PaneConfig {
        focus: pane.active,
        ..PaneConfig::with_commands(commands)
    }
}

/// A shell or interpreter sitting at its prompt.
fn is_idle(command: &str) -> bool {
    let program = command.strip_prefix('-').unwrap_or(command);
    let program = program.rsplit('/').next().unwrap_or(program);
    SHELLS.contains(&program) || INTERPRETERS.contains(&program)
}

fn shell_quote(path: &str) -> String {
    if path
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "/._-~+".contains(c))
    {
        path.to_string()
    } else {
        format!("'{}'", path.replace('\'', r"'\''"))
    }
}
