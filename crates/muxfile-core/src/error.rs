//! Error types for muxfile with categorization:
//!
//! - **Document errors**: schema and resolution problems, reported before any
//!   multiplexer call (exit code 1)
//! - **System errors**: IO, multiplexer and hook failures (exit code 2)
//! - **Not found**: missing workspace files or sessions (exit code 3)
//! - **State errors**: session conflicts and aborted builds (exit code 4)

use thiserror::Error;

use crate::{builder::BuildPhase, hooks::HookPoint, mux::MuxError, workspace::NodePath};

/// Top-level error type that can represent any error in muxfile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed or self-contradictory workspace document
    #[error("Schema error at {path}: {message}")]
    Schema { path: NodePath, message: String },

    /// A directory or script path could not be resolved
    #[error("Cannot resolve {path}: {message}")]
    Resolution { path: NodePath, message: String },

    /// Session name collision under the `abort` policy
    #[error("Session '{session}' already exists (on_conflict = abort)")]
    Conflict { session: String },

    /// A multiplexer operation failed mid-build; nothing is rolled back
    #[error("Build failed during {phase} at {path}: {message}")]
    Build {
        phase: BuildPhase,
        path: NodePath,
        message: String,
    },

    /// A lifecycle callback failed at a fatal hook point
    #[error("Hook '{point}' from plugin '{plugin}' failed at {path}: {message}")]
    Hook {
        point: HookPoint,
        plugin: String,
        path: NodePath,
        message: String,
    },

    /// Plugin rejected at registration time
    #[error("Plugin '{plugin}' is incompatible: {reason}")]
    IncompatiblePlugin { plugin: String, reason: String },

    /// Multiplexer failure outside of a build (freeze, queries)
    #[error("Multiplexer error: {0}")]
    Multiplexer(#[from] MuxError),

    /// Invalid application configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Parse error when reading a document or config file
    #[error("Parse error: {0}")]
    Parse(String),

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}

// Convenience constructors
impl Error {
    /// Create a schema error for the node at `path`.
    pub fn schema(path: NodePath, msg: impl Into<String>) -> Self {
        Self::Schema {
            path,
            message: msg.into(),
        }
    }

    /// Create a resolution error for the node at `path`.
    pub fn resolution(path: NodePath, msg: impl Into<String>) -> Self {
        Self::Resolution {
            path,
            message: msg.into(),
        }
    }

    /// Create a build error for a failed multiplexer step.
    pub fn build(phase: BuildPhase, path: NodePath, msg: impl Into<String>) -> Self {
        Self::Build {
            phase,
            path,
            message: msg.into(),
        }
    }

    /// Create a hook error.
    pub fn hook(
        point: HookPoint,
        plugin: impl Into<String>,
        path: NodePath,
        msg: impl Into<String>,
    ) -> Self {
        Self::Hook {
            point,
            plugin: plugin.into(),
            path,
            message: msg.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an IO error.
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Short machine-readable name of the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Schema { .. } => "schema",
            Self::Resolution { .. } => "resolution",
            Self::Conflict { .. } => "conflict",
            Self::Build { .. } => "build",
            Self::Hook { .. } => "hook",
            Self::IncompatiblePlugin { .. } => "incompatible_plugin",
            Self::Multiplexer(_) => "multiplexer",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Parse(_) => "parse",
            Self::Io(_) => "io",
            Self::NotFound(_) => "not_found",
        }
    }

    /// Offending node of the workspace tree, when the error has one.
    pub const fn path(&self) -> Option<&NodePath> {
        match self {
            Self::Schema { path, .. }
            | Self::Resolution { path, .. }
            | Self::Build { path, .. }
            | Self::Hook { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit code scheme:
    /// - 1: User error (schema, resolution, bad configuration, incompatible plugin)
    /// - 2: System error (IO, multiplexer, hooks)
    /// - 3: Not found
    /// - 4: Invalid state (session conflict, aborted build)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Schema { .. }
            | Self::Resolution { .. }
            | Self::IncompatiblePlugin { .. }
            | Self::InvalidConfig(_)
            | Self::Parse(_) => 1,
            Self::Multiplexer(_) | Self::Io(_) | Self::Hook { .. } => 2,
            Self::NotFound(_) => 3,
            Self::Conflict { .. } | Self::Build { .. } => 4,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::parse_error(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::parse_error(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::parse_error(format!("Failed to parse TOML: {err}"))
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::parse_error(format!("Failed to render TOML: {err}"))
    }
}
