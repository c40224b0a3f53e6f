//! Configuration merging logic (Immutable functional pattern)
//!
//! Later configs override earlier ones (defaults → global → env → CLI).
//! A field left at its default value in `other` keeps the value from `self`.

use super::{
    defaults::{DEFAULT_TMUX_BINARY, DEFAULT_WORKSPACE_DIR},
    types::{Config, HooksConfig, TmuxConfig},
};
use crate::{builder::ConflictPolicy, workspace::WorkspaceFormat};

// ═══════════════════════════════════════════════════════════════════════════
// MERGE IMPLEMENTATIONS (Immutable pattern)
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Merge another config into this one (other takes precedence) - immutable pattern
    ///
    /// Lists are replaced, not appended: `hooks.before_script = ["a", "b"]`
    /// merged with `["c"]` yields `["c"]`.
    pub fn merge(self, other: Self) -> Self {
        Self {
            workspace_dir: if other.workspace_dir == DEFAULT_WORKSPACE_DIR {
                self.workspace_dir
            } else {
                other.workspace_dir
            },
            on_conflict: if other.on_conflict == ConflictPolicy::default() {
                self.on_conflict
            } else {
                other.on_conflict
            },
            best_effort_hooks: if other.best_effort_hooks.is_empty() {
                self.best_effort_hooks
            } else {
                other.best_effort_hooks
            },
            freeze_format: if other.freeze_format == WorkspaceFormat::default() {
                self.freeze_format
            } else {
                other.freeze_format
            },
            tmux: self.tmux.merge(other.tmux),
            hooks: self.hooks.merge(other.hooks),
        }
    }
}

impl TmuxConfig {
    fn merge(self, other: Self) -> Self {
        Self {
            binary: if other.binary == DEFAULT_TMUX_BINARY {
                self.binary
            } else {
                other.binary
            },
            socket_name: other.socket_name.or(self.socket_name),
            socket_path: other.socket_path.or(self.socket_path),
        }
    }
}

impl HooksConfig {
    fn merge(self, other: Self) -> Self {
        let pick = |own: Vec<String>, theirs: Vec<String>| {
            if theirs.is_empty() {
                own
            } else {
                theirs
            }
        };
        Self {
            before_workspace_build: pick(self.before_workspace_build, other.before_workspace_build),
            on_window_create: pick(self.on_window_create, other.on_window_create),
            before_script: pick(self.before_script, other.before_script),
            after_window_finished: pick(self.after_window_finished, other.after_window_finished),
            on_workspace_build_complete: pick(
                self.on_workspace_build_complete,
                other.on_workspace_build_complete,
            ),
        }
    }
}
