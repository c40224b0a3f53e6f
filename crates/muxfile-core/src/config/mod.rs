//! Application configuration
//!
//! Settings that shape how workspaces are found and built. Workspace
//! documents themselves are handled by [`crate::workspace`].
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: `<config dir>/muxfile/config.toml`
//! 3. Environment variables: `MUXFILE_*`
//! 4. CLI flags (command-specific)
//!
//! # Example Config
//!
//! ```toml
//! workspace_dir = "~/.muxfile"
//! on_conflict = "append"
//! best_effort_hooks = ["on_workspace_build_complete"]
//! freeze_format = "yaml"
//!
//! [tmux]
//! socket_name = "work"
//!
//! [hooks]
//! before_workspace_build = ["direnv allow"]
//! on_workspace_build_complete = ["notify-send 'workspace ready'"]
//! ```
//!
//! # Module Structure
//!
//! - `types`: Configuration structure definitions
//! - `defaults`: Default value implementations
//! - `load`: Loading from files and environment
//! - `merge`: Configuration merging logic
//! - `validate`: Validation and path expansion

mod defaults;
mod load;
mod merge;
mod types;
mod validate;

#[cfg(test)]
mod tests_loading;
#[cfg(test)]
mod tests_validation;

pub use load::{global_config_path, load_config, load_toml_file};
pub use types::{Config, HooksConfig, TmuxConfig};
