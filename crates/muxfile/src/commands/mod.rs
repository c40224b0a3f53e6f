//! Command implementations

pub mod convert;
pub mod freeze;
pub mod load;
pub mod ls;

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use muxfile_core::config::{load_config, Config, TmuxConfig};

/// `-L` / `-S` given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SocketOverride {
    #[default]
    None,
    Name(String),
    Path(String),
}

impl SocketOverride {
    pub fn from_args(name: Option<String>, path: Option<String>) -> Self {
        match (name, path) {
            (Some(name), _) => Self::Name(name),
            (None, Some(path)) => Self::Path(path),
            (None, None) => Self::None,
        }
    }

    /// Replace the configured socket; a flag always wins over the file.
    pub fn apply(&self, config: Config) -> Config {
        let tmux = match self {
            Self::None => return config,
            Self::Name(name) => TmuxConfig {
                socket_name: Some(name.clone()),
                socket_path: None,
                ..config.tmux
            },
            Self::Path(path) => TmuxConfig {
                socket_name: None,
                socket_path: Some(path.clone()),
                ..config.tmux
            },
        };
        Config { tmux, ..config }
    }
}

/// Application config with command-line socket flags applied.
pub fn settings(socket: &SocketOverride) -> Result<Config> {
    let config = socket.apply(load_config()?);
    config.validate()?;
    Ok(config)
}

/// Print `text`, or write it to `output`.
pub fn write_output(text: &str, output: Option<&Path>, force: bool) -> Result<()> {
    let Some(path) = output else {
        print!("{text}");
        return Ok(());
    };
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote workspace");
    Ok(())
}
