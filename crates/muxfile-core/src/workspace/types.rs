//! Canonical workspace tree
//!
//! These are the fully expanded, type-uniform structures produced by
//! [`expand`](super::expand). Every command field is a sequence, focus flags
//! are plain booleans, and keys the schema does not know are kept in `extra`
//! so a freeze round-trip does not drop user metadata.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::Result;

/// Option mapping (`key -> scalar`) applied with `set-option`.
pub type Options = BTreeMap<String, Value>;

/// Root of a workspace document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WorkspaceConfig {
    pub session_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_directory: Option<String>,
    /// Session-wide before-commands, prepended to every pane.
    #[serde(rename = "shell_command_before")]
    pub global_before_command: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_script: Option<String>,
    pub options: Options,
    pub global_options: Options,
    pub environment: BTreeMap<String, String>,
    pub windows: Vec<WindowConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WindowConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_directory: Option<String>,
    pub shell_command_before: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub focus: bool,
    pub options: Options,
    /// Options applied once every pane of the window exists.
    pub options_after: Options,
    pub panes: Vec<PaneConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaneConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_directory: Option<String>,
    pub shell_command_before: Vec<String>,
    pub shell_command: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub focus: bool,
    /// Press Enter after each command (false leaves it typed at the prompt).
    #[serde(skip_serializing_if = "is_true")]
    pub enter: bool,
    /// Seconds to wait before sending commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_before: Option<f64>,
    /// Seconds to wait after sending commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_after: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PaneConfig {
    fn default() -> Self {
        Self {
            start_directory: None,
            shell_command_before: Vec::new(),
            shell_command: Vec::new(),
            focus: false,
            enter: true,
            sleep_before: None,
            sleep_after: None,
            extra: Map::new(),
        }
    }
}

impl PaneConfig {
    /// A pane running the given commands.
    #[must_use]
    pub fn with_commands<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shell_command: commands.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl WorkspaceConfig {
    /// Render the canonical tree as a document value.
    ///
    /// The result is itself valid input for `expand`, which maps it back to
    /// an equal tree.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

const fn is_false(value: &bool) -> bool {
    !*value
}

const fn is_true(value: &bool) -> bool {
    *value
}
