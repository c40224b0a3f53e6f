//! Configuration loading from files and environment (Immutable functional pattern)
//!
//! This module handles loading configuration from:
//! 1. Built-in defaults
//! 2. Global config: `<config dir>/muxfile/config.toml`
//! 3. Environment variables: `MUXFILE_*`
//!
//! All operations return new instances rather than mutating in place.

use std::path::{Path, PathBuf};

use super::types::Config;
use crate::{hooks::HookPoint, Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from all sources with hierarchy (immutable functional pattern)
///
/// # Errors
///
/// Returns error if:
/// - Config file is malformed TOML
/// - An environment override has an invalid value
/// - Config values fail validation
pub fn load_config() -> Result<Config> {
    let config = Config::default();

    let config = match global_config_path() {
        Some(path) if path.exists() => config.merge(load_toml_file(&path)?),
        _ => config,
    };

    let config = config.apply_env_vars()?;
    config.validate()?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "muxfile")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Load a TOML file into a partial Config
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read
/// - Path is a directory instead of a file
/// - TOML is malformed
pub fn load_toml_file(path: &Path) -> Result<Config> {
    if path.is_dir() {
        return Err(Error::io_error(format!(
            "Config path is a directory, not a file: {}\n\
             \n\
             The config file path should point to a TOML file, not a directory.",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            Error::io_error(format!(
                "Permission denied reading config file {}: {e}\n\
                 \n\
                 Check file permissions: ls -l {}",
                path.display(),
                path.display()
            ))
        } else {
            Error::io_error(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        }
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::parse_error(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES (Immutable pattern)
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Apply `MUXFILE_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if environment variable values are invalid
    pub fn apply_env_vars(self) -> Result<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `MUXFILE_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for unparseable values.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup("MUXFILE_WORKSPACE_DIR") {
            self.workspace_dir = value;
        }

        if let Some(value) = lookup("MUXFILE_ON_CONFLICT") {
            self.on_conflict = value.parse().map_err(|e| {
                Error::invalid_config(format!("Invalid MUXFILE_ON_CONFLICT value '{value}': {e}"))
            })?;
        }

        if let Some(value) = lookup("MUXFILE_BEST_EFFORT_HOOKS") {
            self.best_effort_hooks = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| {
                    name.parse::<HookPoint>().map_err(|e| {
                        Error::invalid_config(format!(
                            "Invalid hook point '{name}' in MUXFILE_BEST_EFFORT_HOOKS: {e}"
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
        }

        if let Some(value) = lookup("MUXFILE_FREEZE_FORMAT") {
            self.freeze_format = value.parse().map_err(|e| {
                Error::invalid_config(format!(
                    "Invalid MUXFILE_FREEZE_FORMAT value '{value}': {e}"
                ))
            })?;
        }

        if let Some(value) = lookup("MUXFILE_TMUX_BINARY") {
            self.tmux.binary = value;
        }

        if let Some(value) = lookup("MUXFILE_TMUX_SOCKET_NAME") {
            self.tmux.socket_name = Some(value);
        }

        if let Some(value) = lookup("MUXFILE_TMUX_SOCKET_PATH") {
            self.tmux.socket_path = Some(value);
        }

        Ok(self)
    }
}
