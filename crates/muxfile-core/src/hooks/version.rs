//! Loose version numbers as printed by tmux and by crates.
//!
//! Accepts `3`, `3.3`, `3.3a`, `next-3.4` and `1.2.3`. Letter suffixes
//! and prefixes are ignored for ordering.

use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            patch: 0,
        }
    }

    pub const fn with_patch(self, patch: u32) -> Self {
        Self { patch, ..self }
    }

    /// # Errors
    ///
    /// Returns `Error::Parse` if `text` holds no `N[.N[.N]]` sequence.
    pub fn parse(text: &str) -> Result<Self> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        let pattern = PATTERN
            .get_or_init(|| Regex::new(r"(\d+)(?:\.(\d+))?(?:\.(\d+))?").ok())
            .as_ref()
            .ok_or_else(|| Error::parse_error("version pattern failed to compile"))?;

        let captures = pattern
            .captures(text)
            .ok_or_else(|| Error::parse_error(format!("not a version: '{text}'")))?;
        let part = |index: usize| -> Result<u32> {
            captures
                .get(index)
                .map_or(Ok(0), |m| m.as_str().parse())
                .map_err(|e| Error::parse_error(format!("version component in '{text}': {e}")))
        };
        Ok(Self {
            major: part(1)?,
            minor: part(2)?,
            patch: part(3)?,
        })
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() -> Result<()> {
        assert_eq!(Version::parse("3")?, Version::new(3, 0));
        assert_eq!(Version::parse("3.3a")?, Version::new(3, 3));
        assert_eq!(Version::parse("next-3.4")?, Version::new(3, 4));
        assert_eq!(Version::parse("0.1.7")?, Version::new(0, 1).with_patch(7));
        Ok(())
    }

    #[test]
    fn test_parse_rejects_text_without_digits() {
        assert!(Version::parse("master").is_err());
        assert!(Version::parse("").is_err());
    }

    #[test]
    fn test_ordering() -> Result<()> {
        assert!(Version::parse("3.2")? < Version::parse("3.10")?);
        assert!(Version::parse("2.9a")? < Version::parse("3.0")?);
        assert!(Version::new(1, 0) < Version::new(1, 0).with_patch(1));
        Ok(())
    }
}
