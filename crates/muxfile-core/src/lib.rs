//! # muxfile core
//!
//! Declarative tmux workspaces: normalize a workspace document, resolve
//! directory and before-command inheritance, and drive a multiplexer through
//! the construction of a session. The reverse direction freezes a live
//! session back into a workspace document.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Pipeline
//!
//! ```text
//! document ─ expand ─▶ WorkspaceConfig ─ resolve ─▶ ResolvedWorkspace ─ build ─▶ session
//! session ─ snapshot ─▶ SessionSnapshot ─ freeze ─▶ WorkspaceConfig ─ inline ─▶ document
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod builder;
pub mod config;
mod error;
pub mod freeze;
pub mod hooks;
pub mod mux;
pub mod workspace;

pub use builder::{build, BuildOptions, BuildPhase, BuildResult, BuildState, ConflictPolicy};
pub use error::Error;
pub use freeze::{freeze, freeze_session};
pub use hooks::{HookContext, HookPoint, HookRegistry, Plugin, ShellHooks, Version};
pub use mux::{MemoryMux, Multiplexer, MuxError, TmuxServer};
pub use workspace::{
    expand, inline, resolve, NodePath, ResolveContext, ResolvedWorkspace, WorkspaceConfig,
};

/// Result type used across muxfile.
pub type Result<T> = std::result::Result<T, Error>;

/// Version of this crate, used for plugin compatibility checks.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
