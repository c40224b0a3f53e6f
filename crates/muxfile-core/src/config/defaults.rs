//! Default configuration values

use super::types::{Config, HooksConfig, TmuxConfig};
use crate::{builder::ConflictPolicy, workspace::WorkspaceFormat};

pub(super) const DEFAULT_WORKSPACE_DIR: &str = "~/.muxfile";
pub(super) const DEFAULT_TMUX_BINARY: &str = "tmux";

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_dir: DEFAULT_WORKSPACE_DIR.to_string(),
            on_conflict: ConflictPolicy::default(),
            best_effort_hooks: Vec::new(),
            freeze_format: WorkspaceFormat::default(),
            tmux: TmuxConfig::default(),
            hooks: HooksConfig::default(),
        }
    }
}

impl Default for TmuxConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_TMUX_BINARY.to_string(),
            socket_name: None,
            socket_path: None,
        }
    }
}
