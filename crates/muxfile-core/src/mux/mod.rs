//! Multiplexer abstraction
//!
//! The builder and freezer talk to a terminal multiplexer only through the
//! [`Multiplexer`] trait. [`TmuxServer`] drives a real tmux server through
//! its CLI; [`MemoryMux`] is an in-process fake that records every call.

mod memory;
mod tmux;

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

pub use memory::{MemoryMux, MuxCall};
pub use tmux::TmuxServer;

use crate::hooks::Version;

// ═══════════════════════════════════════════════════════════════════════════
// HANDLES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaneHandle {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowHandle {
    pub id: String,
    /// The pane tmux creates along with the window.
    pub initial_pane: PaneHandle,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    pub name: String,
    pub id: String,
    /// The window tmux creates along with the session.
    pub initial_window: WindowHandle,
}

/// Scope of a `set-option` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionTarget<'a> {
    Global,
    Session(&'a SessionHandle),
    Window(&'a WindowHandle),
}

// ═══════════════════════════════════════════════════════════════════════════
// SNAPSHOTS
// ═══════════════════════════════════════════════════════════════════════════

/// Observed state of a live session, input to freeze.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub name: String,
    pub windows: Vec<WindowSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowSnapshot {
    pub name: String,
    pub layout: String,
    pub active: bool,
    pub panes: Vec<PaneSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaneSnapshot {
    pub current_path: String,
    pub current_command: String,
    pub active: bool,
}

// ═══════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MuxError {
    #[error("{0} is not installed or not on PATH")]
    NotAvailable(String),

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("{0}")]
    Io(String),

    #[error("unexpected multiplexer output: {0}")]
    Parse(String),

    #[error("no such {0}")]
    NotFound(String),
}

// ═══════════════════════════════════════════════════════════════════════════
// TRAIT
// ═══════════════════════════════════════════════════════════════════════════

/// Operations the builder and freezer need from a multiplexer.
///
/// Every method maps to a single multiplexer command, so a failure points at
/// exactly one step.
pub trait Multiplexer {
    /// Whether a session with exactly this name exists.
    ///
    /// # Errors
    ///
    /// Returns `MuxError` if the multiplexer cannot be queried.
    fn has_session(&self, name: &str) -> Result<bool, MuxError>;

    /// Create a detached session whose first window starts in `start_directory`.
    ///
    /// # Errors
    ///
    /// Returns `MuxError` if the session cannot be created.
    fn create_session(
        &self,
        name: &str,
        start_directory: &Path,
        window_name: Option<&str>,
    ) -> Result<SessionHandle, MuxError>;

    /// Handle for an existing session.
    ///
    /// # Errors
    ///
    /// Returns `MuxError::NotFound` if no session has this name.
    fn find_session(&self, name: &str) -> Result<SessionHandle, MuxError>;

    /// # Errors
    ///
    /// Returns `MuxError` if the session cannot be killed.
    fn kill_session(&self, name: &str) -> Result<(), MuxError>;

    /// # Errors
    ///
    /// Returns `MuxError` if the window cannot be created.
    fn create_window(
        &self,
        session: &SessionHandle,
        name: Option<&str>,
        start_directory: &Path,
    ) -> Result<WindowHandle, MuxError>;

    /// # Errors
    ///
    /// Returns `MuxError` if the window cannot be renamed.
    fn rename_window(&self, window: &WindowHandle, name: &str) -> Result<(), MuxError>;

    /// Split `window` and return the new pane.
    ///
    /// # Errors
    ///
    /// Returns `MuxError` if there is no room for a new pane.
    fn split_pane(
        &self,
        window: &WindowHandle,
        start_directory: &Path,
    ) -> Result<PaneHandle, MuxError>;

    /// Move an existing pane's shell to `start_directory`.
    ///
    /// # Errors
    ///
    /// Returns `MuxError` if the pane cannot be changed.
    fn change_directory(&self, pane: &PaneHandle, start_directory: &Path)
        -> Result<(), MuxError>;

    /// Type `text` into the pane, pressing Enter afterwards when `enter`.
    ///
    /// # Errors
    ///
    /// Returns `MuxError` if the keys cannot be sent.
    fn send_command(&self, pane: &PaneHandle, text: &str, enter: bool) -> Result<(), MuxError>;

    /// # Errors
    ///
    /// Returns `MuxError` if the option is rejected.
    fn set_option(&self, target: OptionTarget<'_>, key: &str, value: &str)
        -> Result<(), MuxError>;

    /// # Errors
    ///
    /// Returns `MuxError` if the variable cannot be set.
    fn set_environment(
        &self,
        session: &SessionHandle,
        key: &str,
        value: &str,
    ) -> Result<(), MuxError>;

    /// # Errors
    ///
    /// Returns `MuxError` if the layout is unknown.
    fn select_layout(&self, window: &WindowHandle, layout: &str) -> Result<(), MuxError>;

    /// # Errors
    ///
    /// Returns `MuxError` if the window cannot be selected.
    fn select_window(&self, window: &WindowHandle) -> Result<(), MuxError>;

    /// # Errors
    ///
    /// Returns `MuxError` if the pane cannot be selected.
    fn select_pane(&self, pane: &PaneHandle) -> Result<(), MuxError>;

    /// Observe windows and panes of a live session.
    ///
    /// # Errors
    ///
    /// Returns `MuxError::NotFound` if the session does not exist.
    fn snapshot(&self, name: &str) -> Result<SessionSnapshot, MuxError>;

    /// Version of the multiplexer, for plugin compatibility checks.
    ///
    /// # Errors
    ///
    /// Returns `MuxError` if the version cannot be determined.
    fn version(&self) -> Result<Version, MuxError>;
}

/// Text form of an option value: booleans become `on`/`off`.
pub fn option_value(value: &Value) -> String {
    crate::workspace::option_text(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_option_value_booleans() {
        assert_eq!(option_value(&json!(true)), "on");
        assert_eq!(option_value(&json!(false)), "off");
        assert_eq!(option_value(&json!(50)), "50");
        assert_eq!(option_value(&json!("vi")), "vi");
    }

    #[test]
    fn test_mux_error_display() {
        let err = MuxError::CommandFailed {
            command: "tmux split-window".to_string(),
            stderr: "no space for new pane".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`tmux split-window` failed: no space for new pane"
        );
    }
}
