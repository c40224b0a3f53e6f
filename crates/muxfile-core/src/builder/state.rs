//! Build state machine and the per-build bookkeeping record.
//!
//! The resolved workspace is never mutated during a build; everything the
//! builder learns (handles, counters, warnings, transitions) lives in a
//! [`BuildRecord`] owned by the running build.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::BuildPhase;
use crate::{
    mux::{PaneHandle, WindowHandle},
    workspace::NodePath,
    Error, Result,
};

// ═══════════════════════════════════════════════════════════════════════════
// STATE TYPES & TRANSITIONS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Pending,
    SessionPhase,
    WindowPhase,
    PanePhase,
    FocusPhase,
    Completed,
    Aborted,
}

impl BuildState {
    /// Returns true if this state allows transition to `next`
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::SessionPhase)
                | (Self::SessionPhase, Self::WindowPhase | Self::FocusPhase)
                | (
                    Self::WindowPhase,
                    Self::WindowPhase | Self::PanePhase | Self::FocusPhase
                )
                | (Self::PanePhase, Self::PanePhase | Self::WindowPhase)
                | (Self::FocusPhase, Self::Completed)
        ) || (matches!(next, Self::Aborted) && !self.is_terminal())
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    /// Phase reported for errors raised in this state.
    pub const fn phase(self) -> BuildPhase {
        match self {
            Self::Pending | Self::SessionPhase => BuildPhase::Session,
            Self::WindowPhase => BuildPhase::Window,
            Self::PanePhase => BuildPhase::Pane,
            Self::FocusPhase => BuildPhase::Focus,
            Self::Completed | Self::Aborted => BuildPhase::Complete,
        }
    }
}

/// State transition event with timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: BuildState,
    pub to: BuildState,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// BUILD RECORD
// ═══════════════════════════════════════════════════════════════════════════

/// Handles created (or reused) for one declared window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltWindow {
    pub index: usize,
    pub handle: WindowHandle,
    pub panes: Vec<PaneHandle>,
}

/// Mutable bookkeeping for a single build.
#[derive(Debug, Clone)]
pub struct BuildRecord {
    state: BuildState,
    history: Vec<StateTransition>,
    pub windows: Vec<BuiltWindow>,
    pub commands_sent: usize,
    pub warnings: Vec<String>,
}

impl Default for BuildRecord {
    fn default() -> Self {
        Self {
            state: BuildState::Pending,
            history: Vec::new(),
            windows: Vec::new(),
            commands_sent: 0,
            warnings: Vec::new(),
        }
    }
}

impl BuildRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> BuildState {
        self.state
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Move to `next`, recording the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::Build` if the transition is not allowed from the
    /// current state.
    pub fn advance(&mut self, next: BuildState, reason: impl Into<String>) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::build(
                self.state.phase(),
                NodePath::root(),
                format!("invalid build transition {} -> {next}", self.state),
            ));
        }
        let reason = reason.into();
        tracing::trace!(from = %self.state, to = %next, %reason, "build transition");
        self.history.push(StateTransition {
            from: self.state,
            to: next,
            timestamp: Utc::now(),
            reason,
        });
        self.state = next;
        Ok(())
    }

    /// Mark the build aborted; a no-op once terminal.
    pub fn abort(&mut self, error: &Error) {
        if !self.state.is_terminal() {
            self.history.push(StateTransition {
                from: self.state,
                to: BuildState::Aborted,
                timestamp: Utc::now(),
                reason: error.to_string(),
            });
            self.state = BuildState::Aborted;
        }
    }

    pub(super) fn into_history(self) -> Vec<StateTransition> {
        self.history
    }
}
