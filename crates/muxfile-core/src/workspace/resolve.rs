//! Trickle-down resolution
//!
//! Propagates `start_directory` and before-commands from the session down to
//! every pane, so the builder never has to consult ancestors:
//!
//! - A pane's directory is its own, else its window's, else the session's,
//!   else the caller's working directory. Relative values join onto the
//!   resolved ancestor; absolute values replace it. A relative session
//!   directory joins the context's base directory.
//! - A pane's before-commands are session ++ window ++ pane, in that order.
//!
//! Resolution only reads the environment captured in [`ResolveContext`];
//! it never touches the filesystem.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Component, Path, PathBuf},
    time::Duration,
};

use super::{
    path::NodePath,
    types::{Options, PaneConfig, WindowConfig, WorkspaceConfig},
};
use crate::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// CONTEXT
// ═══════════════════════════════════════════════════════════════════════════

/// Process facts that resolution depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
    cwd: PathBuf,
    /// Anchor for a relative session directory, when it differs from `cwd`.
    base: Option<PathBuf>,
    home: Option<PathBuf>,
    env: HashMap<String, String>,
}

impl ResolveContext {
    /// A context with the given working directory, no home and no variables.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            base: None,
            home: None,
            env: HashMap::new(),
        }
    }

    /// Capture the current process's working directory, home and environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the working directory cannot be determined.
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::io_error(format!("Failed to read working directory: {e}")))?;
        Ok(Self {
            cwd,
            base: None,
            home: directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()),
            env: std::env::vars().collect(),
        })
    }

    /// Join a relative session directory onto `base` instead of the
    /// working directory. A session without a directory still gets `cwd`.
    #[must_use]
    pub fn with_base(self, base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn base(&self) -> &Path {
        self.base.as_deref().unwrap_or(&self.cwd)
    }

    /// Expand `~`, `~/…` and `$VAR` / `${VAR}` in a raw path value.
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolution` for `~user` forms, for `~` without a
    /// known home directory, and for unset variables.
    pub fn expand_path(&self, raw: &str, path: &NodePath) -> Result<PathBuf> {
        let with_home = self.expand_tilde(raw, path)?;
        let expanded = shellexpand::env_with_context(&with_home, |name| self.lookup(name))
            .map_err(|e| Error::resolution(path.clone(), format!("cannot expand '{raw}': {e}")))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }

    fn expand_tilde(&self, raw: &str, path: &NodePath) -> Result<String> {
        let Some(rest) = raw.strip_prefix('~') else {
            return Ok(raw.to_string());
        };
        if !rest.is_empty() && !rest.starts_with('/') {
            return Err(Error::resolution(
                path.clone(),
                format!("cannot expand '{raw}': only ~ and ~/ are supported"),
            ));
        }
        let home = self.home.as_ref().ok_or_else(|| {
            Error::resolution(
                path.clone(),
                format!("cannot expand '{raw}': home directory is unknown"),
            )
        })?;
        Ok(format!("{}{rest}", home.display()))
    }

    fn lookup(&self, name: &str) -> std::result::Result<Option<&str>, String> {
        self.env
            .get(name)
            .map(|value| Some(value.as_str()))
            .ok_or_else(|| "variable is not set".to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RESOLVED TREE
// ═══════════════════════════════════════════════════════════════════════════

/// A workspace with every inherited value made explicit.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWorkspace {
    pub session_name: String,
    pub start_directory: PathBuf,
    pub global_before_command: Vec<String>,
    pub before_script: Option<PathBuf>,
    pub options: Options,
    pub global_options: Options,
    pub environment: BTreeMap<String, String>,
    pub windows: Vec<ResolvedWindow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWindow {
    pub index: usize,
    pub window_name: Option<String>,
    pub start_directory: PathBuf,
    /// Session ++ window before-commands.
    pub shell_command_before: Vec<String>,
    pub layout: Option<String>,
    pub focus: bool,
    pub options: Options,
    pub options_after: Options,
    pub panes: Vec<ResolvedPane>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPane {
    pub window_index: usize,
    pub index: usize,
    pub start_directory: PathBuf,
    /// Session ++ window ++ pane before-commands.
    pub shell_command_before: Vec<String>,
    pub shell_command: Vec<String>,
    pub focus: bool,
    pub enter: bool,
    pub sleep_before: Option<Duration>,
    pub sleep_after: Option<Duration>,
}

impl ResolvedWorkspace {
    /// The first window declaring focus.
    pub fn focused_window(&self) -> Option<&ResolvedWindow> {
        self.windows.iter().find(|window| window.focus)
    }
}

impl ResolvedWindow {
    pub fn path(&self) -> NodePath {
        NodePath::window(self.index)
    }

    /// The first pane declaring focus.
    pub fn focused_pane(&self) -> Option<&ResolvedPane> {
        self.panes.iter().find(|pane| pane.focus)
    }
}

impl ResolvedPane {
    pub fn path(&self) -> NodePath {
        NodePath::pane(self.window_index, self.index)
    }

    /// Commands to send, in order: before-commands then the pane's own.
    pub fn dispatch_sequence(&self) -> impl Iterator<Item = &str> {
        self.shell_command_before
            .iter()
            .chain(&self.shell_command)
            .map(String::as_str)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════

/// Resolve inheritance for every node of a canonical workspace.
///
/// # Errors
///
/// Returns `Error::Resolution` naming the first node whose directory or
/// script path cannot be expanded.
pub fn resolve(config: &WorkspaceConfig, ctx: &ResolveContext) -> Result<ResolvedWorkspace> {
    let root = NodePath::root();
    let start_directory = match config.start_directory.as_deref() {
        None => ctx.cwd().to_path_buf(),
        declared => resolve_directory(declared, ctx.base(), ctx, &root)?,
    };

    let before_script = config
        .before_script
        .as_deref()
        .map(|script| {
            let expanded = ctx.expand_path(script, &root.key("before_script"))?;
            Ok::<_, Error>(join_normalized(&start_directory, &expanded))
        })
        .transpose()?;

    let windows = config
        .windows
        .iter()
        .enumerate()
        .map(|(index, window)| {
            resolve_window(
                window,
                index,
                &start_directory,
                &config.global_before_command,
                ctx,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResolvedWorkspace {
        session_name: config.session_name.clone(),
        start_directory,
        global_before_command: config.global_before_command.clone(),
        before_script,
        options: config.options.clone(),
        global_options: config.global_options.clone(),
        environment: config.environment.clone(),
        windows,
    })
}

fn resolve_window(
    window: &WindowConfig,
    index: usize,
    parent_dir: &Path,
    parent_before: &[String],
    ctx: &ResolveContext,
) -> Result<ResolvedWindow> {
    let path = NodePath::window(index);
    let start_directory =
        resolve_directory(window.start_directory.as_deref(), parent_dir, ctx, &path)?;
    let shell_command_before = chain(parent_before, &window.shell_command_before);

    let panes = window
        .panes
        .iter()
        .enumerate()
        .map(|(pane_index, pane)| {
            resolve_pane(
                pane,
                index,
                pane_index,
                &start_directory,
                &shell_command_before,
                ctx,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResolvedWindow {
        index,
        window_name: window.window_name.clone(),
        start_directory,
        shell_command_before,
        layout: window.layout.clone(),
        focus: window.focus,
        options: window.options.clone(),
        options_after: window.options_after.clone(),
        panes,
    })
}

fn resolve_pane(
    pane: &PaneConfig,
    window_index: usize,
    index: usize,
    parent_dir: &Path,
    parent_before: &[String],
    ctx: &ResolveContext,
) -> Result<ResolvedPane> {
    let path = NodePath::pane(window_index, index);
    Ok(ResolvedPane {
        window_index,
        index,
        start_directory: resolve_directory(
            pane.start_directory.as_deref(),
            parent_dir,
            ctx,
            &path,
        )?,
        shell_command_before: chain(parent_before, &pane.shell_command_before),
        shell_command: pane.shell_command.clone(),
        focus: pane.focus,
        enter: pane.enter,
        sleep_before: duration(pane.sleep_before, &path.key("sleep_before"))?,
        sleep_after: duration(pane.sleep_after, &path.key("sleep_after"))?,
    })
}

fn resolve_directory(
    declared: Option<&str>,
    ancestor: &Path,
    ctx: &ResolveContext,
    path: &NodePath,
) -> Result<PathBuf> {
    match declared {
        None => Ok(ancestor.to_path_buf()),
        Some(raw) => {
            let expanded = ctx.expand_path(raw, &path.key("start_directory"))?;
            Ok(join_normalized(ancestor, &expanded))
        }
    }
}

/// Absolute paths are taken as-is; relative ones are joined onto `base`
/// and normalized lexically (no symlink resolution).
fn join_normalized(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let mut normalized = PathBuf::new();
    for component in base.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn chain(parent: &[String], own: &[String]) -> Vec<String> {
    parent.iter().chain(own).cloned().collect()
}

fn duration(secs: Option<f64>, path: &NodePath) -> Result<Option<Duration>> {
    secs.map(|secs| {
        Duration::try_from_secs_f64(secs)
            .map_err(|e| Error::resolution(path.clone(), format!("invalid duration {secs}: {e}")))
    })
    .transpose()
}
