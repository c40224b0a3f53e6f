//! In-memory multiplexer
//!
//! Keeps a model of sessions, windows and panes, records every call in
//! order and can be told to fail the n-th call of an operation. Used by
//! tests and by `load --dry-run`.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use super::{
    MuxError, Multiplexer, OptionTarget, PaneHandle, PaneSnapshot, SessionHandle,
    SessionSnapshot, WindowHandle, WindowSnapshot,
};
use crate::hooks::Version;

const DEFAULT_SHELL: &str = "bash";

/// One recorded multiplexer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxCall {
    HasSession {
        name: String,
    },
    CreateSession {
        name: String,
        start_directory: PathBuf,
        window_name: Option<String>,
    },
    FindSession {
        name: String,
    },
    KillSession {
        name: String,
    },
    CreateWindow {
        session: String,
        name: Option<String>,
        start_directory: PathBuf,
    },
    RenameWindow {
        window: String,
        name: String,
    },
    SplitPane {
        window: String,
        start_directory: PathBuf,
    },
    ChangeDirectory {
        pane: String,
        start_directory: PathBuf,
    },
    SendCommand {
        pane: String,
        text: String,
        enter: bool,
    },
    SetOption {
        /// `global`, a session id or a window id.
        target: String,
        key: String,
        value: String,
    },
    SetEnvironment {
        session: String,
        key: String,
        value: String,
    },
    SelectLayout {
        window: String,
        layout: String,
    },
    SelectWindow {
        window: String,
    },
    SelectPane {
        pane: String,
    },
    Snapshot {
        name: String,
    },
    Version,
}

impl MuxCall {
    /// Operation name, as used by [`MemoryMux::fail_at`].
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::HasSession { .. } => "has_session",
            Self::CreateSession { .. } => "create_session",
            Self::FindSession { .. } => "find_session",
            Self::KillSession { .. } => "kill_session",
            Self::CreateWindow { .. } => "create_window",
            Self::RenameWindow { .. } => "rename_window",
            Self::SplitPane { .. } => "split_pane",
            Self::ChangeDirectory { .. } => "change_directory",
            Self::SendCommand { .. } => "send_command",
            Self::SetOption { .. } => "set_option",
            Self::SetEnvironment { .. } => "set_environment",
            Self::SelectLayout { .. } => "select_layout",
            Self::SelectWindow { .. } => "select_window",
            Self::SelectPane { .. } => "select_pane",
            Self::Snapshot { .. } => "snapshot",
            Self::Version => "version",
        }
    }

    /// Whether the call changes multiplexer state.
    pub const fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::HasSession { .. }
                | Self::FindSession { .. }
                | Self::Snapshot { .. }
                | Self::Version
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MODEL
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct Pane {
    id: String,
    current_path: PathBuf,
    current_command: String,
}

#[derive(Debug, Clone)]
struct Window {
    id: String,
    name: String,
    layout: String,
    active_pane: usize,
    options: BTreeMap<String, String>,
    panes: Vec<Pane>,
}

#[derive(Debug, Clone)]
struct Session {
    name: String,
    id: String,
    active_window: usize,
    options: BTreeMap<String, String>,
    environment: BTreeMap<String, String>,
    windows: Vec<Window>,
}

impl Session {
    fn handle(&self) -> Result<SessionHandle, MuxError> {
        let window = self
            .windows
            .get(self.active_window)
            .ok_or_else(|| MuxError::NotFound(format!("window in session '{}'", self.name)))?;
        Ok(SessionHandle {
            name: self.name.clone(),
            id: self.id.clone(),
            initial_window: window.handle()?,
        })
    }
}

impl Window {
    fn handle(&self) -> Result<WindowHandle, MuxError> {
        let pane = self
            .panes
            .get(self.active_pane)
            .ok_or_else(|| MuxError::NotFound(format!("pane in window {}", self.id)))?;
        Ok(WindowHandle {
            id: self.id.clone(),
            initial_pane: PaneHandle {
                id: pane.id.clone(),
            },
        })
    }
}

#[derive(Debug, Default)]
struct State {
    next_id: usize,
    sessions: Vec<Session>,
    global_options: BTreeMap<String, String>,
    calls: Vec<MuxCall>,
    counts: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, usize>,
}

impl State {
    fn next_id(&mut self, sigil: char) -> String {
        self.next_id += 1;
        format!("{sigil}{}", self.next_id)
    }

    fn new_pane(&mut self, path: &Path) -> Pane {
        Pane {
            id: self.next_id('%'),
            current_path: path.to_path_buf(),
            current_command: DEFAULT_SHELL.to_string(),
        }
    }

    fn new_window(&mut self, name: Option<&str>, path: &Path) -> Window {
        let id = self.next_id('@');
        let pane = self.new_pane(path);
        Window {
            id,
            name: name.unwrap_or(DEFAULT_SHELL).to_string(),
            layout: String::new(),
            active_pane: 0,
            options: BTreeMap::new(),
            panes: vec![pane],
        }
    }

    fn session_by_name(&self, name: &str) -> Result<&Session, MuxError> {
        self.sessions
            .iter()
            .find(|session| session.name == name)
            .ok_or_else(|| MuxError::NotFound(format!("session '{name}'")))
    }

    fn session_mut(&mut self, id: &str) -> Result<&mut Session, MuxError> {
        self.sessions
            .iter_mut()
            .find(|session| session.id == id)
            .ok_or_else(|| MuxError::NotFound(format!("session {id}")))
    }

    fn window_mut(&mut self, id: &str) -> Result<&mut Window, MuxError> {
        self.sessions
            .iter_mut()
            .flat_map(|session| session.windows.iter_mut())
            .find(|window| window.id == id)
            .ok_or_else(|| MuxError::NotFound(format!("window {id}")))
    }

    fn pane_mut(&mut self, id: &str) -> Result<&mut Pane, MuxError> {
        self.sessions
            .iter_mut()
            .flat_map(|session| session.windows.iter_mut())
            .flat_map(|window| window.panes.iter_mut())
            .find(|pane| pane.id == id)
            .ok_or_else(|| MuxError::NotFound(format!("pane {id}")))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MEMORY MUX
// ═══════════════════════════════════════════════════════════════════════════

/// A multiplexer that lives entirely in memory.
#[derive(Debug)]
pub struct MemoryMux {
    version: Version,
    state: RefCell<State>,
}

impl Default for MemoryMux {
    fn default() -> Self {
        Self {
            version: Version::new(3, 4),
            state: RefCell::new(State::default()),
        }
    }
}

impl MemoryMux {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `version` from [`Multiplexer::version`].
    #[must_use]
    pub fn with_version(self, version: Version) -> Self {
        Self { version, ..self }
    }

    /// Seed a pre-existing session (one window, one pane in `/`) without
    /// recording a call.
    #[must_use]
    pub fn with_session(self, name: &str) -> Self {
        self.with_snapshot(&SessionSnapshot {
            name: name.to_string(),
            windows: vec![WindowSnapshot {
                name: DEFAULT_SHELL.to_string(),
                active: true,
                panes: vec![PaneSnapshot {
                    current_path: "/".to_string(),
                    current_command: DEFAULT_SHELL.to_string(),
                    active: true,
                }],
                ..WindowSnapshot::default()
            }],
        })
    }

    /// Seed a pre-existing session shaped like `snapshot`.
    #[must_use]
    pub fn with_snapshot(self, snapshot: &SessionSnapshot) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let id = state.next_id('$');
            let windows = snapshot
                .windows
                .iter()
                .map(|window| {
                    let id = state.next_id('@');
                    let panes = window
                        .panes
                        .iter()
                        .map(|pane| Pane {
                            id: state.next_id('%'),
                            current_path: PathBuf::from(&pane.current_path),
                            current_command: pane.current_command.clone(),
                        })
                        .collect();
                    Window {
                        id,
                        name: window.name.clone(),
                        layout: window.layout.clone(),
                        active_pane: window.panes.iter().position(|p| p.active).unwrap_or(0),
                        options: BTreeMap::new(),
                        panes,
                    }
                })
                .collect();
            state.sessions.push(Session {
                name: snapshot.name.clone(),
                id,
                active_window: snapshot.windows.iter().position(|w| w.active).unwrap_or(0),
                options: BTreeMap::new(),
                environment: BTreeMap::new(),
                windows,
            });
        }
        self
    }

    /// Fail the `occurrence`-th (1-based) call of `operation` with
    /// `MuxError::CommandFailed`.
    #[must_use]
    pub fn fail_at(self, operation: &'static str, occurrence: usize) -> Self {
        self.state.borrow_mut().failures.insert(operation, occurrence);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<MuxCall> {
        self.state.borrow().calls.clone()
    }

    /// Only the calls that changed state.
    pub fn mutations(&self) -> Vec<MuxCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.is_mutation())
            .cloned()
            .collect()
    }

    /// Names of the sessions that currently exist.
    pub fn session_names(&self) -> Vec<String> {
        self.state
            .borrow()
            .sessions
            .iter()
            .map(|session| session.name.clone())
            .collect()
    }

    /// Environment set on a session.
    pub fn environment(&self, session: &str) -> Option<BTreeMap<String, String>> {
        self.state
            .borrow()
            .session_by_name(session)
            .ok()
            .map(|session| session.environment.clone())
    }

    /// Options set on a session.
    pub fn session_options(&self, session: &str) -> Option<BTreeMap<String, String>> {
        self.state
            .borrow()
            .session_by_name(session)
            .ok()
            .map(|session| session.options.clone())
    }

    /// Options set on the `index`-th window of a session.
    pub fn window_options(&self, session: &str, index: usize) -> Option<BTreeMap<String, String>> {
        self.state
            .borrow()
            .session_by_name(session)
            .ok()
            .and_then(|session| session.windows.get(index))
            .map(|window| window.options.clone())
    }

    pub fn global_options(&self) -> BTreeMap<String, String> {
        self.state.borrow().global_options.clone()
    }

    fn record<T>(
        &self,
        call: MuxCall,
        apply: impl FnOnce(&mut State) -> Result<T, MuxError>,
    ) -> Result<T, MuxError> {
        let mut state = self.state.borrow_mut();
        let operation = call.operation();
        state.calls.push(call);
        let count = state.counts.entry(operation).or_insert(0);
        *count += 1;
        let count = *count;
        if state.failures.get(operation) == Some(&count) {
            return Err(MuxError::CommandFailed {
                command: operation.to_string(),
                stderr: "injected failure".to_string(),
            });
        }
        apply(&mut *state)
    }
}

impl Multiplexer for MemoryMux {
    fn has_session(&self, name: &str) -> Result<bool, MuxError> {
        self.record(
            MuxCall::HasSession {
                name: name.to_string(),
            },
            |state| Ok(state.session_by_name(name).is_ok()),
        )
    }

    fn create_session(
        &self,
        name: &str,
        start_directory: &Path,
        window_name: Option<&str>,
    ) -> Result<SessionHandle, MuxError> {
        let call = MuxCall::CreateSession {
            name: name.to_string(),
            start_directory: start_directory.to_path_buf(),
            window_name: window_name.map(str::to_string),
        };
        self.record(call, |state| {
            if state.session_by_name(name).is_ok() {
                return Err(MuxError::CommandFailed {
                    command: "new-session".to_string(),
                    stderr: format!("duplicate session: {name}"),
                });
            }
            let id = state.next_id('$');
            let window = state.new_window(window_name, start_directory);
            let session = Session {
                name: name.to_string(),
                id,
                active_window: 0,
                options: BTreeMap::new(),
                environment: BTreeMap::new(),
                windows: vec![window],
            };
            let handle = session.handle()?;
            state.sessions.push(session);
            Ok(handle)
        })
    }

    fn find_session(&self, name: &str) -> Result<SessionHandle, MuxError> {
        self.record(
            MuxCall::FindSession {
                name: name.to_string(),
            },
            |state| state.session_by_name(name)?.handle(),
        )
    }

    fn kill_session(&self, name: &str) -> Result<(), MuxError> {
        self.record(
            MuxCall::KillSession {
                name: name.to_string(),
            },
            |state| {
                let before = state.sessions.len();
                state.sessions.retain(|session| session.name != name);
                if state.sessions.len() == before {
                    Err(MuxError::NotFound(format!("session '{name}'")))
                } else {
                    Ok(())
                }
            },
        )
    }

    fn create_window(
        &self,
        session: &SessionHandle,
        name: Option<&str>,
        start_directory: &Path,
    ) -> Result<WindowHandle, MuxError> {
        let call = MuxCall::CreateWindow {
            session: session.id.clone(),
            name: name.map(str::to_string),
            start_directory: start_directory.to_path_buf(),
        };
        self.record(call, |state| {
            let window = state.new_window(name, start_directory);
            let handle = window.handle()?;
            state.session_mut(&session.id)?.windows.push(window);
            Ok(handle)
        })
    }

    fn rename_window(&self, window: &WindowHandle, name: &str) -> Result<(), MuxError> {
        let call = MuxCall::RenameWindow {
            window: window.id.clone(),
            name: name.to_string(),
        };
        self.record(call, |state| {
            state.window_mut(&window.id)?.name = name.to_string();
            Ok(())
        })
    }

    fn split_pane(
        &self,
        window: &WindowHandle,
        start_directory: &Path,
    ) -> Result<PaneHandle, MuxError> {
        let call = MuxCall::SplitPane {
            window: window.id.clone(),
            start_directory: start_directory.to_path_buf(),
        };
        self.record(call, |state| {
            let pane = state.new_pane(start_directory);
            let handle = PaneHandle {
                id: pane.id.clone(),
            };
            state.window_mut(&window.id)?.panes.push(pane);
            Ok(handle)
        })
    }

    fn change_directory(
        &self,
        pane: &PaneHandle,
        start_directory: &Path,
    ) -> Result<(), MuxError> {
        let call = MuxCall::ChangeDirectory {
            pane: pane.id.clone(),
            start_directory: start_directory.to_path_buf(),
        };
        self.record(call, |state| {
            state.pane_mut(&pane.id)?.current_path = start_directory.to_path_buf();
            Ok(())
        })
    }

    fn send_command(&self, pane: &PaneHandle, text: &str, enter: bool) -> Result<(), MuxError> {
        let call = MuxCall::SendCommand {
            pane: pane.id.clone(),
            text: text.to_string(),
            enter,
        };
        self.record(call, |state| {
            let target = state.pane_mut(&pane.id)?;
            if let Some(program) = text.split_whitespace().next().filter(|_| enter) {
                target.current_command = program.to_string();
            }
            Ok(())
        })
    }

    fn set_option(
        &self,
        target: OptionTarget<'_>,
        key: &str,
        value: &str,
    ) -> Result<(), MuxError> {
        let target_id = match target {
            OptionTarget::Global => "global".to_string(),
            OptionTarget::Session(session) => session.id.clone(),
            OptionTarget::Window(window) => window.id.clone(),
        };
        let call = MuxCall::SetOption {
            target: target_id,
            key: key.to_string(),
            value: value.to_string(),
        };
        self.record(call, |state| {
            let options = match target {
                OptionTarget::Global => &mut state.global_options,
                OptionTarget::Session(session) => &mut state.session_mut(&session.id)?.options,
                OptionTarget::Window(window) => &mut state.window_mut(&window.id)?.options,
            };
            options.insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn set_environment(
        &self,
        session: &SessionHandle,
        key: &str,
        value: &str,
    ) -> Result<(), MuxError> {
        let call = MuxCall::SetEnvironment {
            session: session.id.clone(),
            key: key.to_string(),
            value: value.to_string(),
        };
        self.record(call, |state| {
            state
                .session_mut(&session.id)?
                .environment
                .insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn select_layout(&self, window: &WindowHandle, layout: &str) -> Result<(), MuxError> {
        let call = MuxCall::SelectLayout {
            window: window.id.clone(),
            layout: layout.to_string(),
        };
        self.record(call, |state| {
            state.window_mut(&window.id)?.layout = layout.to_string();
            Ok(())
        })
    }

    fn select_window(&self, window: &WindowHandle) -> Result<(), MuxError> {
        let call = MuxCall::SelectWindow {
            window: window.id.clone(),
        };
        self.record(call, |state| {
            let (session, index) = state
                .sessions
                .iter_mut()
                .find_map(|session| {
                    let index = session.windows.iter().position(|w| w.id == window.id)?;
                    Some((session, index))
                })
                .ok_or_else(|| MuxError::NotFound(format!("window {}", window.id)))?;
            session.active_window = index;
            Ok(())
        })
    }

    fn select_pane(&self, pane: &PaneHandle) -> Result<(), MuxError> {
        let call = MuxCall::SelectPane {
            pane: pane.id.clone(),
        };
        self.record(call, |state| {
            let (window, index) = state
                .sessions
                .iter_mut()
                .flat_map(|session| session.windows.iter_mut())
                .find_map(|window| {
                    let index = window.panes.iter().position(|p| p.id == pane.id)?;
                    Some((window, index))
                })
                .ok_or_else(|| MuxError::NotFound(format!("pane {}", pane.id)))?;
            window.active_pane = index;
            Ok(())
        })
    }

    fn snapshot(&self, name: &str) -> Result<SessionSnapshot, MuxError> {
        self.record(
            MuxCall::Snapshot {
                name: name.to_string(),
            },
            |state| {
                let session = state.session_by_name(name)?;
                let windows = session
                    .windows
                    .iter()
                    .enumerate()
                    .map(|(index, window)| WindowSnapshot {
                        name: window.name.clone(),
                        layout: window.layout.clone(),
                        active: index == session.active_window,
                        panes: window
                            .panes
                            .iter()
                            .enumerate()
                            .map(|(pane_index, pane)| PaneSnapshot {
                                current_path: pane.current_path.display().to_string(),
                                current_command: pane.current_command.clone(),
                                active: pane_index == window.active_pane,
                            })
                            .collect(),
                    })
                    .collect();
                Ok(SessionSnapshot {
                    name: session.name.clone(),
                    windows,
                })
            },
        )
    }

    fn version(&self) -> Result<Version, MuxError> {
        let version = self.version.clone();
        self.record(MuxCall::Version, |_| Ok(version))
    }
}
