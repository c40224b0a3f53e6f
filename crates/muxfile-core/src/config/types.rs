//! Configuration type definitions

use serde::{Deserialize, Serialize};

use crate::{builder::ConflictPolicy, hooks::HookPoint, workspace::WorkspaceFormat};

// ═══════════════════════════════════════════════════════════════════════════
// MAIN CONFIGURATION STRUCTURE
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory searched for named workspaces (`muxfile load <name>`).
    pub workspace_dir: String,
    /// What `load` does when the session already exists.
    pub on_conflict: ConflictPolicy,
    /// Hook points whose failures are logged instead of aborting the build.
    pub best_effort_hooks: Vec<HookPoint>,
    /// Default output format of `freeze`.
    pub freeze_format: WorkspaceFormat,
    pub tmux: TmuxConfig,
    pub hooks: HooksConfig,
}

// ═══════════════════════════════════════════════════════════════════════════
// NESTED CONFIGURATION STRUCTURES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TmuxConfig {
    pub binary: String,
    /// `tmux -L`
    pub socket_name: Option<String>,
    /// `tmux -S`
    pub socket_path: Option<String>,
}

/// Shell commands run at each lifecycle point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct HooksConfig {
    pub before_workspace_build: Vec<String>,
    pub on_window_create: Vec<String>,
    pub before_script: Vec<String>,
    pub after_window_finished: Vec<String>,
    pub on_workspace_build_complete: Vec<String>,
}

impl HooksConfig {
    /// Commands configured for `point`.
    pub fn commands(&self, point: HookPoint) -> &[String] {
        match point {
            HookPoint::BeforeWorkspaceBuild => &self.before_workspace_build,
            HookPoint::OnWindowCreate => &self.on_window_create,
            HookPoint::BeforeScript => &self.before_script,
            HookPoint::AfterWindowFinished => &self.after_window_finished,
            HookPoint::OnWorkspaceBuildComplete => &self.on_workspace_build_complete,
        }
    }

    pub fn is_empty(&self) -> bool {
        HookPoint::ALL
            .iter()
            .all(|point| self.commands(*point).is_empty())
    }
}
