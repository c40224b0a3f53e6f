//! Lifecycle hooks fired by the session builder
//!
//! Callbacks are registered per [`HookPoint`] and run synchronously in
//! registration order. Points fire in this order during a build:
//!
//! - `before_workspace_build`: once, after the session exists
//! - `on_window_create`: per window, before its panes are populated
//! - `before_script`: per pane, before its commands are sent
//! - `after_window_finished`: per window, after all of its panes
//! - `on_workspace_build_complete`: once, after focus is applied
//!
//! A failing callback aborts the build with `Error::Hook` unless the point
//! is marked best-effort, in which case the failure becomes a warning.

mod plugin;
mod shell;
mod version;

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use plugin::{Compatibility, Plugin, VersionRange, Versions};
pub use shell::ShellHooks;
pub use version::Version;

use crate::{
    mux::{Multiplexer, PaneHandle, SessionHandle, WindowHandle},
    workspace::{NodePath, ResolvedPane, ResolvedWindow, ResolvedWorkspace},
    Error, Result,
};

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Build lifecycle points, in firing order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    BeforeWorkspaceBuild,
    OnWindowCreate,
    BeforeScript,
    AfterWindowFinished,
    OnWorkspaceBuildComplete,
}

impl HookPoint {
    pub const ALL: [Self; 5] = [
        Self::BeforeWorkspaceBuild,
        Self::OnWindowCreate,
        Self::BeforeScript,
        Self::AfterWindowFinished,
        Self::OnWorkspaceBuildComplete,
    ];

    /// Get the event name for this hook point
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::BeforeWorkspaceBuild => "before_workspace_build",
            Self::OnWindowCreate => "on_window_create",
            Self::BeforeScript => "before_script",
            Self::AfterWindowFinished => "after_window_finished",
            Self::OnWorkspaceBuildComplete => "on_workspace_build_complete",
        }
    }
}

/// Error type callbacks may return.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// A registered lifecycle callback.
pub type HookFn = Box<dyn Fn(&HookContext<'_>) -> std::result::Result<(), HookError>>;

/// Read-only view handed to a callback.
///
/// Side effects go through `mux`; the resolved tree cannot be changed.
pub struct HookContext<'a> {
    pub point: HookPoint,
    pub workspace: &'a ResolvedWorkspace,
    pub session: &'a SessionHandle,
    pub window: Option<(&'a WindowHandle, &'a ResolvedWindow)>,
    pub pane: Option<(&'a PaneHandle, &'a ResolvedPane)>,
    pub mux: &'a dyn Multiplexer,
}

impl HookContext<'_> {
    /// Path of the node the hook fires for.
    pub fn path(&self) -> NodePath {
        match (&self.window, &self.pane) {
            (_, Some((_, pane))) => pane.path(),
            (Some((_, window)), None) => window.path(),
            (None, None) => NodePath::root(),
        }
    }

    /// Resolved directory of the node the hook fires for.
    pub fn start_directory(&self) -> &Path {
        match (&self.window, &self.pane) {
            (_, Some((_, pane))) => &pane.start_directory,
            (Some((_, window)), None) => &window.start_directory,
            (None, None) => &self.workspace.start_directory,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════

struct Registered {
    plugin: String,
    callback: HookFn,
}

/// Ordered callbacks keyed by lifecycle point.
#[derive(Default)]
pub struct HookRegistry {
    hooks: BTreeMap<HookPoint, Vec<Registered>>,
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: BTreeMap<_, _> = self
            .hooks
            .iter()
            .map(|(point, hooks)| (point.event_name(), hooks.len()))
            .collect();
        f.debug_struct("HookRegistry").field("hooks", &counts).finish()
    }
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an anonymous callback.
    pub fn register<F>(&mut self, point: HookPoint, callback: F)
    where
        F: Fn(&HookContext<'_>) -> std::result::Result<(), HookError> + 'static,
    {
        self.register_named("anonymous", point, Box::new(callback));
    }

    /// Register a callback on behalf of `plugin`.
    pub fn register_named(&mut self, plugin: impl Into<String>, point: HookPoint, callback: HookFn) {
        self.hooks.entry(point).or_default().push(Registered {
            plugin: plugin.into(),
            callback,
        });
    }

    /// Check a plugin's compatibility and register all of its callbacks.
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatiblePlugin` if `versions` falls outside the
    /// plugin's declared ranges; nothing is registered in that case.
    pub fn register_plugin(&mut self, plugin: &dyn Plugin, versions: &Versions) -> Result<()> {
        plugin
            .compatibility()
            .check(versions)
            .map_err(|reason| Error::IncompatiblePlugin {
                plugin: plugin.name().to_string(),
                reason,
            })?;
        let hooks = plugin.hooks();
        tracing::debug!(plugin = plugin.name(), hooks = hooks.len(), "registered plugin");
        for (point, callback) in hooks {
            self.register_named(plugin.name(), point, callback);
        }
        Ok(())
    }

    /// Number of callbacks registered for `point`.
    pub fn len(&self, point: HookPoint) -> usize {
        self.hooks.get(&point).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.values().all(Vec::is_empty)
    }

    /// Run every callback for `ctx.point` in registration order.
    ///
    /// Returns the warnings produced by failing callbacks when
    /// `best_effort` is set.
    ///
    /// # Errors
    ///
    /// Returns `Error::Hook` for the first failing callback unless
    /// `best_effort` is set.
    pub fn invoke(&self, ctx: &HookContext<'_>, best_effort: bool) -> Result<Vec<String>> {
        let mut warnings = Vec::new();
        for hook in self.hooks.get(&ctx.point).into_iter().flatten() {
            tracing::debug!(point = %ctx.point, plugin = %hook.plugin, node = %ctx.path(), "invoking hook");
            if let Err(e) = (hook.callback)(ctx) {
                let err = Error::hook(ctx.point, hook.plugin.clone(), ctx.path(), e.to_string());
                if !best_effort {
                    return Err(err);
                }
                tracing::warn!(error = %err, "best-effort hook failed");
                warnings.push(err.to_string());
            }
        }
        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, path::PathBuf, rc::Rc};

    use super::*;
    use crate::mux::MemoryMux;

    fn workspace() -> ResolvedWorkspace {
        ResolvedWorkspace {
            session_name: "dev".to_string(),
            start_directory: PathBuf::from("/work"),
            global_before_command: Vec::new(),
            before_script: None,
            options: BTreeMap::new(),
            global_options: BTreeMap::new(),
            environment: BTreeMap::new(),
            windows: Vec::new(),
        }
    }

    fn with_context<T>(f: impl FnOnce(&HookContext<'_>) -> T) -> Result<T> {
        let mux = MemoryMux::new();
        let session = mux.create_session("dev", Path::new("/work"), None)?;
        let workspace = workspace();
        let ctx = HookContext {
            point: HookPoint::BeforeWorkspaceBuild,
            workspace: &workspace,
            session: &session,
            window: None,
            pane: None,
            mux: &mux,
        };
        Ok(f(&ctx))
    }

    #[test]
    fn test_hook_point_names_round_trip() {
        for point in HookPoint::ALL {
            assert_eq!(point.to_string(), point.event_name());
            assert_eq!(point.event_name().parse::<HookPoint>().ok(), Some(point));
        }
    }

    #[test]
    fn test_callbacks_run_in_registration_order() -> Result<()> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HookRegistry::new();
        for label in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            registry.register(HookPoint::BeforeWorkspaceBuild, move |_| {
                seen.borrow_mut().push(label);
                Ok(())
            });
        }
        registry.register(HookPoint::OnWindowCreate, |_| Err("not fired".into()));

        with_context(|ctx| registry.invoke(ctx, false))??;
        assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
        Ok(())
    }

    #[test]
    fn test_failure_is_fatal_by_default() -> Result<()> {
        let mut registry = HookRegistry::new();
        registry.register_named(
            "notifier",
            HookPoint::BeforeWorkspaceBuild,
            Box::new(|_: &HookContext<'_>| Err("webhook unreachable".into())),
        );
        let result = with_context(|ctx| registry.invoke(ctx, false))?;
        match result {
            Err(Error::Hook { plugin, message, .. }) => {
                assert_eq!(plugin, "notifier");
                assert_eq!(message, "webhook unreachable");
            }
            other => panic!("expected hook error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_best_effort_failure_becomes_warning() -> Result<()> {
        let ran_after = Rc::new(RefCell::new(false));
        let mut registry = HookRegistry::new();
        registry.register(HookPoint::BeforeWorkspaceBuild, |_| Err("boom".into()));
        let flag = Rc::clone(&ran_after);
        registry.register(HookPoint::BeforeWorkspaceBuild, move |_| {
            *flag.borrow_mut() = true;
            Ok(())
        });

        let warnings = with_context(|ctx| registry.invoke(ctx, true))??;
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("boom"));
        assert!(*ran_after.borrow());
        Ok(())
    }

    #[test]
    fn test_context_path_and_directory_default_to_session() -> Result<()> {
        let (path, dir) = with_context(|ctx| (ctx.path(), ctx.start_directory().to_path_buf()))?;
        assert!(path.is_root());
        assert_eq!(dir, PathBuf::from("/work"));
        Ok(())
    }

    #[test]
    fn test_callbacks_can_drive_the_multiplexer() -> Result<()> {
        let mut registry = HookRegistry::new();
        registry.register(HookPoint::BeforeWorkspaceBuild, |ctx| {
            ctx.mux
                .rename_window(&ctx.session.initial_window, "renamed")
                .map_err(Into::into)
        });
        let mux = MemoryMux::new();
        let session = mux.create_session("dev", Path::new("/work"), None)?;
        let workspace = workspace();
        let ctx = HookContext {
            point: HookPoint::BeforeWorkspaceBuild,
            workspace: &workspace,
            session: &session,
            window: None,
            pane: None,
            mux: &mux,
        };
        registry.invoke(&ctx, false)?;
        assert_eq!(mux.snapshot("dev")?.windows[0].name, "renamed");
        Ok(())
    }
}
