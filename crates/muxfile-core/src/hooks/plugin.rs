//! Plugin contract and version compatibility.

use super::{HookFn, HookPoint, Version};

/// A bundle of lifecycle callbacks with optional version requirements.
pub trait Plugin {
    fn name(&self) -> &str;

    /// Versions of muxfile and of the multiplexer this plugin supports.
    fn compatibility(&self) -> Compatibility {
        Compatibility::default()
    }

    /// Callbacks to register, in the order they should run.
    fn hooks(&self) -> Vec<(HookPoint, HookFn)>;
}

/// Versions a plugin is checked against at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Versions {
    pub muxfile: Version,
    pub multiplexer: Version,
}

/// Inclusive bounds plus explicitly excluded versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionRange {
    pub min: Option<Version>,
    pub max: Option<Version>,
    pub excluded: Vec<Version>,
}

impl VersionRange {
    #[must_use]
    pub const fn at_least(min: Version) -> Self {
        Self {
            min: Some(min),
            max: None,
            excluded: Vec::new(),
        }
    }

    #[must_use]
    pub fn at_most(self, max: Version) -> Self {
        Self {
            max: Some(max),
            ..self
        }
    }

    #[must_use]
    pub fn excluding(mut self, version: Version) -> Self {
        self.excluded.push(version);
        self
    }

    /// Explain why `version` is outside the range, if it is.
    pub fn violation(&self, what: &str, version: Version) -> Option<String> {
        if let Some(min) = self.min.filter(|min| version < *min) {
            return Some(format!("requires {what} >= {min}, found {version}"));
        }
        if let Some(max) = self.max.filter(|max| version > *max) {
            return Some(format!("requires {what} <= {max}, found {version}"));
        }
        self.excluded
            .contains(&version)
            .then(|| format!("does not support {what} {version}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compatibility {
    pub muxfile: VersionRange,
    pub multiplexer: VersionRange,
}

impl Compatibility {
    /// # Errors
    ///
    /// Returns a human-readable reason when either version is unsupported.
    pub fn check(&self, versions: &Versions) -> Result<(), String> {
        self.muxfile
            .violation("muxfile", versions.muxfile)
            .or_else(|| self.multiplexer.violation("tmux", versions.multiplexer))
            .map_or(Ok(()), Err)
    }
}
