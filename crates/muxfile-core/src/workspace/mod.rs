//! Workspace documents (Functional Core, Imperative Shell)
//!
//! - **Core (pure)**: [`expand`], [`inline`] and [`resolve`] transform trees
//!   with no I/O
//! - **Shell**: [`document`] reads, renders and locates workspace files

pub mod document;
mod expand;
mod inline;
mod path;
mod resolve;
mod types;

pub(crate) use expand::option_text;
pub use document::{
    list_workspaces, locate_workspace, parse_document, read_document, render_document,
    WorkspaceFormat,
};
pub use expand::expand;
pub use inline::inline;
pub use path::NodePath;
pub use resolve::{resolve, ResolveContext, ResolvedPane, ResolvedWindow, ResolvedWorkspace};
pub use types::{Options, PaneConfig, WindowConfig, WorkspaceConfig};
