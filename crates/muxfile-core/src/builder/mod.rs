//! Session builder
//!
//! Drives a [`Multiplexer`] through the construction of a session from a
//! [`ResolvedWorkspace`]. The build is strictly sequential and moves through
//! [`BuildState`]s:
//!
//! ```text
//! Pending → SessionPhase → WindowPhase ⇄ PanePhase → FocusPhase → Completed
//!                  (any non-terminal state) → Aborted
//! ```
//!
//! A failed multiplexer call aborts the build with an error naming the phase
//! and the node path. Whatever was created so far is left in place.

mod script;
mod state;

use std::{collections::BTreeSet, path::Path};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use script::run_before_script;
pub use state::{BuildRecord, BuildState, BuiltWindow, StateTransition};

use crate::{
    hooks::{HookContext, HookPoint, HookRegistry},
    mux::{option_value, MuxError, Multiplexer, OptionTarget, PaneHandle, SessionHandle, WindowHandle},
    workspace::{NodePath, ResolvedPane, ResolvedWindow, ResolvedWorkspace},
    Error, Result,
};

// ═══════════════════════════════════════════════════════════════════════════
// OPTIONS & RESULTS
// ═══════════════════════════════════════════════════════════════════════════

/// What to do when the session name is already taken.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Fail before touching the multiplexer.
    #[default]
    Abort,
    /// Kill the existing session, then build from scratch.
    KillAndRecreate,
    /// Add the declared windows to the existing session.
    Append,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub on_conflict: ConflictPolicy,
    /// Hook points whose failures are downgraded to warnings.
    pub best_effort: BTreeSet<HookPoint>,
}

/// Step of the build an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    Session,
    BeforeScript,
    Window,
    Pane,
    Focus,
    Complete,
}

/// Outcome of a completed build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub session: SessionHandle,
    pub windows: Vec<BuiltWindow>,
    /// The windows were added to a session that already existed.
    pub appended: bool,
    pub commands_sent: usize,
    /// Failures of best-effort hooks.
    pub warnings: Vec<String>,
    pub history: Vec<StateTransition>,
}

// ═══════════════════════════════════════════════════════════════════════════
// BUILD
// ═══════════════════════════════════════════════════════════════════════════

/// Build `workspace` through `mux`, firing `hooks` along the way.
///
/// # Errors
///
/// - `Error::Conflict` if the session exists under [`ConflictPolicy::Abort`];
///   no mutating call has been made in that case
/// - `Error::Build` naming the phase and node of the first failing step
/// - `Error::Hook` if a callback fails at a point not marked best-effort
pub fn build(
    workspace: &ResolvedWorkspace,
    mux: &dyn Multiplexer,
    hooks: &HookRegistry,
    options: &BuildOptions,
) -> Result<BuildResult> {
    let mut builder = Builder {
        workspace,
        mux,
        hooks,
        options,
        record: BuildRecord::new(),
    };

    match builder.run() {
        Ok((session, appended)) => {
            let mut record = builder.record;
            record.advance(BuildState::Completed, "build complete")?;
            tracing::info!(
                session = %session.name,
                windows = record.windows.len(),
                commands = record.commands_sent,
                warnings = record.warnings.len(),
                "workspace built"
            );
            let windows = std::mem::take(&mut record.windows);
            let warnings = std::mem::take(&mut record.warnings);
            let commands_sent = record.commands_sent;
            Ok(BuildResult {
                session,
                windows,
                appended,
                commands_sent,
                warnings,
                history: record.into_history(),
            })
        }
        Err(e) => {
            let state = builder.record.state();
            builder.record.abort(&e);
            tracing::error!(session = %workspace.session_name, %state, error = %e, "build aborted");
            Err(e)
        }
    }
}

struct Builder<'a> {
    workspace: &'a ResolvedWorkspace,
    mux: &'a dyn Multiplexer,
    hooks: &'a HookRegistry,
    options: &'a BuildOptions,
    record: BuildRecord,
}

impl Builder<'_> {
    fn run(&mut self) -> Result<(SessionHandle, bool)> {
        let workspace = self.workspace;
        self.record.advance(
            BuildState::SessionPhase,
            format!("session {}", workspace.session_name),
        )?;
        let (session, appended) = self.open_session()?;

        self.fire(HookPoint::BeforeWorkspaceBuild, &session, None, None)?;
        if let Some(script) = workspace.before_script.as_deref().filter(|_| !appended) {
            run_before_script(script, &workspace.start_directory)?;
        }

        for window in &workspace.windows {
            self.build_window(&session, window, appended)?;
        }

        self.record.advance(BuildState::FocusPhase, "apply focus")?;
        self.apply_focus()?;
        self.fire(HookPoint::OnWorkspaceBuildComplete, &session, None, None)?;
        Ok((session, appended))
    }

    /// Returns the session handle and whether it already existed.
    fn open_session(&self) -> Result<(SessionHandle, bool)> {
        let workspace = self.workspace;
        let name = workspace.session_name.as_str();
        let fail = |e: MuxError| Error::build(BuildPhase::Session, NodePath::root(), e.to_string());

        if self.mux.has_session(name).map_err(fail)? {
            match self.options.on_conflict {
                ConflictPolicy::Abort => {
                    return Err(Error::Conflict {
                        session: name.to_string(),
                    })
                }
                ConflictPolicy::Append => {
                    tracing::info!(session = name, "appending to existing session");
                    return Ok((self.mux.find_session(name).map_err(fail)?, true));
                }
                ConflictPolicy::KillAndRecreate => {
                    tracing::warn!(session = name, "killing existing session");
                    self.mux.kill_session(name).map_err(fail)?;
                }
            }
        }

        let first_window = workspace
            .windows
            .first()
            .and_then(|window| window.window_name.as_deref());
        let session = self
            .mux
            .create_session(name, &workspace.start_directory, first_window)
            .map_err(fail)?;
        tracing::info!(
            session = name,
            start_directory = %workspace.start_directory.display(),
            "session created"
        );

        let field = |key: &str, e: MuxError| {
            Error::build(BuildPhase::Session, NodePath::root().key(key), e.to_string())
        };
        for (key, value) in &workspace.options {
            self.mux
                .set_option(OptionTarget::Session(&session), key, &option_value(value))
                .map_err(|e| field("options", e))?;
        }
        for (key, value) in &workspace.global_options {
            self.mux
                .set_option(OptionTarget::Global, key, &option_value(value))
                .map_err(|e| field("global_options", e))?;
        }
        for (key, value) in &workspace.environment {
            self.mux
                .set_environment(&session, key, value)
                .map_err(|e| field("environment", e))?;
        }
        Ok((session, false))
    }

    fn build_window(
        &mut self,
        session: &SessionHandle,
        window: &ResolvedWindow,
        appended: bool,
    ) -> Result<()> {
        let workspace = self.workspace;
        let path = window.path();
        let fail = |e: MuxError| Error::build(BuildPhase::Window, path.clone(), e.to_string());
        self.record
            .advance(BuildState::WindowPhase, format!("create {path}"))?;

        // Directory the window's first pane was started in.
        let (handle, initial_dir) = if window.index == 0 && !appended {
            (
                session.initial_window.clone(),
                workspace.start_directory.as_path(),
            )
        } else {
            let handle = self
                .mux
                .create_window(session, window.window_name.as_deref(), &window.start_directory)
                .map_err(fail)?;
            (handle, window.start_directory.as_path())
        };

        for (key, value) in &window.options {
            self.mux
                .set_option(OptionTarget::Window(&handle), key, &option_value(value))
                .map_err(fail)?;
        }
        if let Some(layout) = &window.layout {
            self.mux.select_layout(&handle, layout).map_err(fail)?;
        }
        tracing::info!(window = %path, name = ?window.window_name, "window created");
        self.fire(HookPoint::OnWindowCreate, session, Some((&handle, window)), None)?;

        if window.panes.is_empty() && window.start_directory.as_path() != initial_dir {
            self.mux
                .change_directory(&handle.initial_pane, &window.start_directory)
                .map_err(fail)?;
        }
        let mut panes = Vec::with_capacity(window.panes.len());
        for pane in &window.panes {
            panes.push(self.build_pane(session, &handle, window, pane, initial_dir)?);
        }

        self.record
            .advance(BuildState::WindowPhase, format!("finish {path}"))?;
        for (key, value) in &window.options_after {
            self.mux
                .set_option(OptionTarget::Window(&handle), key, &option_value(value))
                .map_err(fail)?;
        }
        self.fire(HookPoint::AfterWindowFinished, session, Some((&handle, window)), None)?;

        self.record.windows.push(BuiltWindow {
            index: window.index,
            handle,
            panes,
        });
        Ok(())
    }

    fn build_pane(
        &mut self,
        session: &SessionHandle,
        window_handle: &WindowHandle,
        window: &ResolvedWindow,
        pane: &ResolvedPane,
        initial_dir: &Path,
    ) -> Result<PaneHandle> {
        let path = pane.path();
        let fail = |e: MuxError| Error::build(BuildPhase::Pane, path.clone(), e.to_string());
        self.record
            .advance(BuildState::PanePhase, path.to_string())?;

        let handle = if pane.index == 0 {
            let handle = window_handle.initial_pane.clone();
            if pane.start_directory.as_path() != initial_dir {
                self.mux
                    .change_directory(&handle, &pane.start_directory)
                    .map_err(fail)?;
            }
            handle
        } else {
            let handle = self
                .mux
                .split_pane(window_handle, &pane.start_directory)
                .map_err(fail)?;
            if let Some(layout) = &window.layout {
                self.mux.select_layout(window_handle, layout).map_err(fail)?;
            }
            handle
        };

        self.fire(
            HookPoint::BeforeScript,
            session,
            Some((window_handle, window)),
            Some((&handle, pane)),
        )?;

        if let Some(delay) = pane.sleep_before {
            tracing::debug!(pane = %path, ?delay, "sleeping before commands");
            std::thread::sleep(delay);
        }
        for command in pane.dispatch_sequence() {
            tracing::debug!(pane = %path, %command, enter = pane.enter, "sending command");
            self.mux
                .send_command(&handle, command, pane.enter)
                .map_err(fail)?;
            self.record.commands_sent += 1;
        }
        if let Some(delay) = pane.sleep_after {
            tracing::debug!(pane = %path, ?delay, "sleeping after commands");
            std::thread::sleep(delay);
        }
        Ok(handle)
    }

    /// Select each window's focused pane, then the first focused window.
    fn apply_focus(&self) -> Result<()> {
        let workspace = self.workspace;
        for (window, built) in workspace.windows.iter().zip(&self.record.windows) {
            let Some(pane) = window.focused_pane() else {
                continue;
            };
            if let Some(handle) = built.panes.get(pane.index) {
                self.mux
                    .select_pane(handle)
                    .map_err(|e| Error::build(BuildPhase::Focus, pane.path(), e.to_string()))?;
            }
        }
        if let Some(window) = workspace.focused_window() {
            if let Some(built) = self.record.windows.get(window.index) {
                self.mux
                    .select_window(&built.handle)
                    .map_err(|e| Error::build(BuildPhase::Focus, window.path(), e.to_string()))?;
            }
        }
        Ok(())
    }

    fn fire(
        &mut self,
        point: HookPoint,
        session: &SessionHandle,
        window: Option<(&WindowHandle, &ResolvedWindow)>,
        pane: Option<(&PaneHandle, &ResolvedPane)>,
    ) -> Result<()> {
        let ctx = HookContext {
            point,
            workspace: self.workspace,
            session,
            window,
            pane,
            mux: self.mux,
        };
        let warnings = self
            .hooks
            .invoke(&ctx, self.options.best_effort.contains(&point))?;
        self.record.warnings.extend(warnings);
        Ok(())
    }
}
