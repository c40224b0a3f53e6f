//! tmux adapter - Imperative Shell
//!
//! Each trait method is one `tmux` invocation. Handles carry tmux's stable
//! ids (`$1`, `@2`, `%3`) so later commands never depend on names or indexes.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use super::{
    MuxError, Multiplexer, OptionTarget, PaneHandle, PaneSnapshot, SessionHandle,
    SessionSnapshot, WindowHandle, WindowSnapshot,
};
use crate::hooks::Version;

const SESSION_FORMAT: &str = "#{session_id}\t#{window_id}\t#{pane_id}";
const WINDOW_FORMAT: &str = "#{window_id}\t#{pane_id}";
const PANE_FORMAT: &str = "#{pane_id}";
const LIST_WINDOWS_FORMAT: &str = "#{window_id}\t#{window_name}\t#{window_layout}\t#{window_active}";
const LIST_PANES_FORMAT: &str = "#{pane_current_path}\t#{pane_current_command}\t#{pane_active}";

/// A tmux server reached through the `tmux` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmuxServer {
    binary: PathBuf,
    socket_name: Option<String>,
    socket_path: Option<PathBuf>,
}

impl Default for TmuxServer {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tmux"),
            socket_name: None,
            socket_path: None,
        }
    }
}

impl TmuxServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_binary(self, binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ..self
        }
    }

    /// Use `tmux -L <name>`.
    #[must_use]
    pub fn with_socket_name(self, name: impl Into<String>) -> Self {
        Self {
            socket_name: Some(name.into()),
            ..self
        }
    }

    /// Use `tmux -S <path>`.
    #[must_use]
    pub fn with_socket_path(self, path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: Some(path.into()),
            ..self
        }
    }

    /// Resolve the binary on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns `MuxError::NotAvailable` if the binary cannot be found.
    pub fn detect(self) -> Result<Self, MuxError> {
        let binary = which::which(&self.binary)
            .map_err(|_| MuxError::NotAvailable(self.binary.display().to_string()))?;
        Ok(Self { binary, ..self })
    }

    fn socket_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(name) = &self.socket_name {
            args.extend(["-L".to_string(), name.clone()]);
        }
        if let Some(path) = &self.socket_path {
            args.extend(["-S".to_string(), path.display().to_string()]);
        }
        args
    }

    fn run(&self, args: &[&str]) -> Result<String, MuxError> {
        tracing::trace!(binary = %self.binary.display(), ?args, "running tmux");
        let output = Command::new(&self.binary)
            .args(self.socket_args())
            .args(args)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MuxError::NotAvailable(self.binary.display().to_string())
                } else {
                    MuxError::Io(format!("Failed to run {}: {e}", self.binary.display()))
                }
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout)
                .trim_end_matches(['\n', '\r'])
                .to_string())
        } else {
            Err(MuxError::CommandFailed {
                command: format!("tmux {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Multiplexer for TmuxServer {
    fn has_session(&self, name: &str) -> Result<bool, MuxError> {
        match self.run(&["has-session", "-t", &exact(name)]) {
            Ok(_) => Ok(true),
            Err(MuxError::CommandFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn create_session(
        &self,
        name: &str,
        start_directory: &Path,
        window_name: Option<&str>,
    ) -> Result<SessionHandle, MuxError> {
        let dir = start_directory.to_string_lossy();
        let mut args = vec![
            "new-session",
            "-d",
            "-P",
            "-F",
            SESSION_FORMAT,
            "-s",
            name,
            "-c",
            &dir,
        ];
        if let Some(window_name) = window_name {
            args.extend(["-n", window_name]);
        }
        let [session_id, window_id, pane_id] = fields(&self.run(&args)?)?;
        Ok(session_handle(name, session_id, window_id, pane_id))
    }

    fn find_session(&self, name: &str) -> Result<SessionHandle, MuxError> {
        let target = format!("{}:", exact(name));
        let output = self
            .run(&["display-message", "-p", "-t", &target, SESSION_FORMAT])
            .map_err(|e| match e {
                MuxError::CommandFailed { .. } => MuxError::NotFound(format!("session '{name}'")),
                other => other,
            })?;
        let [session_id, window_id, pane_id] = fields(&output)?;
        Ok(session_handle(name, session_id, window_id, pane_id))
    }

    fn kill_session(&self, name: &str) -> Result<(), MuxError> {
        self.run(&["kill-session", "-t", &exact(name)]).map(drop)
    }

    fn create_window(
        &self,
        session: &SessionHandle,
        name: Option<&str>,
        start_directory: &Path,
    ) -> Result<WindowHandle, MuxError> {
        let dir = start_directory.to_string_lossy();
        let target = format!("{}:", session.id);
        let mut args = vec![
            "new-window",
            "-d",
            "-P",
            "-F",
            WINDOW_FORMAT,
            "-t",
            &target,
            "-c",
            &dir,
        ];
        if let Some(name) = name {
            args.extend(["-n", name]);
        }
        let [window_id, pane_id] = fields(&self.run(&args)?)?;
        Ok(WindowHandle {
            id: window_id,
            initial_pane: PaneHandle { id: pane_id },
        })
    }

    fn rename_window(&self, window: &WindowHandle, name: &str) -> Result<(), MuxError> {
        self.run(&["rename-window", "-t", &window.id, "--", name]).map(drop)
    }

    fn split_pane(
        &self,
        window: &WindowHandle,
        start_directory: &Path,
    ) -> Result<PaneHandle, MuxError> {
        let dir = start_directory.to_string_lossy();
        let output = self.run(&[
            "split-window",
            "-d",
            "-P",
            "-F",
            PANE_FORMAT,
            "-t",
            &window.id,
            "-c",
            &dir,
        ])?;
        let [pane_id] = fields(&output)?;
        Ok(PaneHandle { id: pane_id })
    }

    fn change_directory(
        &self,
        pane: &PaneHandle,
        start_directory: &Path,
    ) -> Result<(), MuxError> {
        let dir = start_directory.to_string_lossy();
        self.run(&["respawn-pane", "-k", "-t", &pane.id, "-c", &dir])
            .map(drop)
    }

    fn send_command(&self, pane: &PaneHandle, text: &str, enter: bool) -> Result<(), MuxError> {
        self.run(&["send-keys", "-t", &pane.id, "-l", "--", text])?;
        if enter {
            self.run(&["send-keys", "-t", &pane.id, "Enter"])?;
        }
        Ok(())
    }

    fn set_option(
        &self,
        target: OptionTarget<'_>,
        key: &str,
        value: &str,
    ) -> Result<(), MuxError> {
        match target {
            OptionTarget::Global => self.run(&["set-option", "-g", "--", key, value]),
            OptionTarget::Session(session) => {
                self.run(&["set-option", "-t", &session.id, "--", key, value])
            }
            OptionTarget::Window(window) => {
                self.run(&["set-option", "-w", "-t", &window.id, "--", key, value])
            }
        }
        .map(drop)
    }

    fn set_environment(
        &self,
        session: &SessionHandle,
        key: &str,
        value: &str,
    ) -> Result<(), MuxError> {
        self.run(&["set-environment", "-t", &session.id, "--", key, value])
            .map(drop)
    }

    fn select_layout(&self, window: &WindowHandle, layout: &str) -> Result<(), MuxError> {
        self.run(&["select-layout", "-t", &window.id, layout]).map(drop)
    }

    fn select_window(&self, window: &WindowHandle) -> Result<(), MuxError> {
        self.run(&["select-window", "-t", &window.id]).map(drop)
    }

    fn select_pane(&self, pane: &PaneHandle) -> Result<(), MuxError> {
        self.run(&["select-pane", "-t", &pane.id]).map(drop)
    }

    fn snapshot(&self, name: &str) -> Result<SessionSnapshot, MuxError> {
        if !self.has_session(name)? {
            return Err(MuxError::NotFound(format!("session '{name}'")));
        }
        let listing = self.run(&["list-windows", "-t", &exact(name), "-F", LIST_WINDOWS_FORMAT])?;
        let windows = parse_window_lines(&listing)?
            .into_iter()
            .map(|(id, mut window)| {
                let panes = self.run(&["list-panes", "-t", &id, "-F", LIST_PANES_FORMAT])?;
                window.panes = parse_pane_lines(&panes)?;
                Ok(window)
            })
            .collect::<Result<Vec<_>, MuxError>>()?;
        Ok(SessionSnapshot {
            name: name.to_string(),
            windows,
        })
    }

    fn version(&self) -> Result<Version, MuxError> {
        parse_version(&self.run(&["-V"])?)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// OUTPUT PARSING (pure)
// ═══════════════════════════════════════════════════════════════════════════

/// Exact-match session target; a bare name would prefix-match.
fn exact(name: &str) -> String {
    format!("={name}")
}

fn session_handle(
    name: &str,
    session_id: String,
    window_id: String,
    pane_id: String,
) -> SessionHandle {
    SessionHandle {
        name: name.to_string(),
        id: session_id,
        initial_window: WindowHandle {
            id: window_id,
            initial_pane: PaneHandle { id: pane_id },
        },
    }
}

fn fields<const N: usize>(line: &str) -> Result<[String; N], MuxError> {
    let parts: Vec<String> = line.split('\t').map(str::to_string).collect();
    <[String; N]>::try_from(parts).map_err(|parts| {
        MuxError::Parse(format!(
            "expected {N} tab-separated fields, got {}: {line:?}",
            parts.len()
        ))
    })
}

fn parse_window_lines(output: &str) -> Result<Vec<(String, WindowSnapshot)>, MuxError> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            let [id, name, layout, active] = fields(line)?;
            Ok((
                id,
                WindowSnapshot {
                    name,
                    layout,
                    active: active == "1",
                    panes: Vec::new(),
                },
            ))
        })
        .collect()
}

fn parse_pane_lines(output: &str) -> Result<Vec<PaneSnapshot>, MuxError> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            let [current_path, current_command, active] = fields(line)?;
            Ok(PaneSnapshot {
                current_path,
                current_command,
                active: active == "1",
            })
        })
        .collect()
}

fn parse_version(output: &str) -> Result<Version, MuxError> {
    let text = output.trim();
    let text = text.strip_prefix("tmux ").unwrap_or(text);
    Version::parse(text).map_err(|e| MuxError::Parse(e.to_string()))
}
