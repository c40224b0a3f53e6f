//! Workspace document I/O - Imperative Shell
//!
//! Reading, rendering and locating workspace files. Parsing goes through
//! `serde_json::Value` so every format reaches [`expand`](super::expand)
//! with the same shape.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::{Error, Result};

/// File name probed when a directory is given as the workspace target.
pub const DIRECTORY_WORKSPACE_STEM: &str = ".muxfile";

/// On-disk encoding of a workspace document.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceFormat {
    #[default]
    #[strum(to_string = "yaml", serialize = "yml")]
    #[serde(alias = "yml")]
    Yaml,
    #[strum(to_string = "json")]
    Json,
    #[strum(to_string = "toml")]
    Toml,
}

impl WorkspaceFormat {
    /// Extensions probed when locating a workspace, in priority order.
    pub const EXTENSIONS: [&'static str; 4] = ["yaml", "yml", "json", "toml"];

    /// Format implied by a file extension.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` for a missing or unsupported extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .ok_or_else(|| {
                Error::parse_error(format!(
                    "Unsupported workspace file extension: {}\n\
                     \n\
                     Supported extensions: .yaml, .yml, .json, .toml",
                    path.display()
                ))
            })
    }

    /// Canonical extension for files written in this format.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PARSE / RENDER
// ═══════════════════════════════════════════════════════════════════════════

/// Parse document text into a raw tree.
///
/// # Errors
///
/// Returns `Error::Parse` if the text is not valid in `format`.
pub fn parse_document(text: &str, format: WorkspaceFormat) -> Result<Value> {
    match format {
        WorkspaceFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        WorkspaceFormat::Json => Ok(serde_json::from_str(text)?),
        WorkspaceFormat::Toml => Ok(toml::from_str(text)?),
    }
}

/// Render a raw tree as document text.
///
/// # Errors
///
/// Returns `Error::Parse` if the tree cannot be represented in `format`
/// (TOML has no null and needs a table at the top).
pub fn render_document(value: &Value, format: WorkspaceFormat) -> Result<String> {
    match format {
        WorkspaceFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        WorkspaceFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(value)?)),
        WorkspaceFormat::Toml => Ok(toml::to_string_pretty(value)?),
    }
}

/// Read and parse a workspace file, inferring the format from its extension.
///
/// # Errors
///
/// Returns error if:
/// - The path is a directory or cannot be read
/// - The extension is unsupported
/// - The content is malformed
pub fn read_document(path: &Path) -> Result<(Value, WorkspaceFormat)> {
    if path.is_dir() {
        return Err(Error::io_error(format!(
            "Workspace path is a directory, not a file: {}",
            path.display()
        )));
    }
    let format = WorkspaceFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::not_found(format!("Workspace file not found: {}", path.display()))
        } else {
            Error::io_error(format!(
                "Failed to read workspace file {}: {e}",
                path.display()
            ))
        }
    })?;
    let value = parse_document(&content, format).map_err(|e| match e {
        Error::Parse(msg) => Error::parse_error(format!("{}: {msg}", path.display())),
        other => other,
    })?;
    tracing::debug!(path = %path.display(), %format, "read workspace document");
    Ok((value, format))
}

// ═══════════════════════════════════════════════════════════════════════════
// LOCATE / LIST
// ═══════════════════════════════════════════════════════════════════════════

/// Find the workspace file a user meant by `target`.
///
/// Tried in order:
/// 1. `target` as a file path (relative to `cwd`)
/// 2. `target` as a directory holding `.muxfile.{yaml,yml,json,toml}`
/// 3. `<workspace_dir>/<target>.{yaml,yml,json,toml}`
///
/// # Errors
///
/// Returns `Error::NotFound` listing the places that were searched.
pub fn locate_workspace(target: &str, cwd: &Path, workspace_dir: &Path) -> Result<PathBuf> {
    let direct = cwd.join(target);
    if direct.is_file() {
        return Ok(direct);
    }
    if direct.is_dir() {
        if let Some(found) = probe(&direct, DIRECTORY_WORKSPACE_STEM) {
            return Ok(found);
        }
    }
    if let Some(found) = probe(workspace_dir, target) {
        return Ok(found);
    }
    Err(Error::not_found(format!(
        "No workspace named '{target}'\n\
         \n\
         Searched:\n  {}\n  {}/{DIRECTORY_WORKSPACE_STEM}.{{yaml,yml,json,toml}}\n  {}/{target}.{{yaml,yml,json,toml}}",
        direct.display(),
        direct.display(),
        workspace_dir.display()
    )))
}

fn probe(dir: &Path, stem: &str) -> Option<PathBuf> {
    WorkspaceFormat::EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// Workspace files directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list.
///
/// # Errors
///
/// Returns `Error::Io` if the directory exists but cannot be read.
pub fn list_workspaces(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut found = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .map(|entry| {
            entry.map_err(|e| {
                Error::io_error(format!("Failed to list {}: {e}", dir.display()))
            })
        })
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => {
                WorkspaceFormat::from_path(entry.path())
                    .ok()
                    .map(|_| Ok(entry.into_path()))
            }
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
        .collect::<Result<Vec<_>>>()?;
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_format_from_extension() -> Result<()> {
        assert_eq!(WorkspaceFormat::from_path(Path::new("a.yml"))?, WorkspaceFormat::Yaml);
        assert_eq!(WorkspaceFormat::from_path(Path::new("a.YAML"))?, WorkspaceFormat::Yaml);
        assert_eq!(WorkspaceFormat::from_path(Path::new("a.json"))?, WorkspaceFormat::Json);
        assert_eq!(WorkspaceFormat::from_path(Path::new("a.toml"))?, WorkspaceFormat::Toml);
        assert!(WorkspaceFormat::from_path(Path::new("a.txt")).is_err());
        assert!(WorkspaceFormat::from_path(Path::new("noext")).is_err());
        Ok(())
    }

    #[test]
    fn test_format_display_is_canonical() {
        assert_eq!(WorkspaceFormat::Yaml.to_string(), "yaml");
        assert_eq!("yml".parse::<WorkspaceFormat>().ok(), Some(WorkspaceFormat::Yaml));
    }

    #[test]
    fn test_yaml_and_json_parse_to_same_tree() -> Result<()> {
        let yaml = "session_name: dev\nwindows:\n  - editor\n";
        let json = r#"{"session_name": "dev", "windows": ["editor"]}"#;
        assert_eq!(
            parse_document(yaml, WorkspaceFormat::Yaml)?,
            parse_document(json, WorkspaceFormat::Json)?
        );
        Ok(())
    }

    #[test]
    fn test_toml_round_trip() -> Result<()> {
        let value = serde_json::json!({ "session_name": "dev", "windows": ["a", "b"] });
        let text = render_document(&value, WorkspaceFormat::Toml)?;
        assert_eq!(parse_document(&text, WorkspaceFormat::Toml)?, value);
        Ok(())
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let result = parse_document("session_name: [unclosed", WorkspaceFormat::Yaml);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_read_document_missing_file_is_not_found() -> Result<()> {
        let temp = TempDir::new()?;
        let result = read_document(&temp.path().join("missing.yaml"));
        assert!(matches!(result, Err(Error::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_locate_prefers_direct_path() -> Result<()> {
        let temp = TempDir::new()?;
        let file = temp.path().join("dev.json");
        std::fs::write(&file, "{}")?;
        assert_eq!(locate_workspace("dev.json", temp.path(), Path::new("/nowhere"))?, file);
        Ok(())
    }

    #[test]
    fn test_locate_directory_workspace() -> Result<()> {
        let temp = TempDir::new()?;
        let project = temp.path().join("api");
        std::fs::create_dir(&project)?;
        std::fs::write(project.join(".muxfile.yml"), "session_name: api")?;
        assert_eq!(
            locate_workspace("api", temp.path(), Path::new("/nowhere"))?,
            project.join(".muxfile.yml")
        );
        Ok(())
    }

    #[test]
    fn test_locate_by_name_in_workspace_dir() -> Result<()> {
        let cwd = TempDir::new()?;
        let store = TempDir::new()?;
        std::fs::write(store.path().join("dev.toml"), "session_name = 'dev'")?;
        assert_eq!(
            locate_workspace("dev", cwd.path(), store.path())?,
            store.path().join("dev.toml")
        );
        Ok(())
    }

    #[test]
    fn test_locate_missing_is_not_found() -> Result<()> {
        let temp = TempDir::new()?;
        let result = locate_workspace("ghost", temp.path(), temp.path());
        assert!(matches!(result, Err(Error::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_list_workspaces_filters_and_sorts() -> Result<()> {
        let temp = TempDir::new()?;
        std::fs::write(temp.path().join("b.yaml"), "")?;
        std::fs::write(temp.path().join("a.json"), "")?;
        std::fs::write(temp.path().join("notes.txt"), "")?;
        std::fs::create_dir(temp.path().join("nested.yaml"))?;
        let names: Vec<_> = list_workspaces(temp.path())?
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        assert_eq!(names, vec!["a.json", "b.yaml"]);
        Ok(())
    }

    #[test]
    fn test_list_missing_dir_is_empty() -> Result<()> {
        let temp = TempDir::new()?;
        assert!(list_workspaces(&temp.path().join("none"))?.is_empty());
        Ok(())
    }
}
