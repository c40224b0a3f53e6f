//! Session-level `before_script`.

use std::{path::Path, process::Command};

use super::BuildPhase;
use crate::{workspace::NodePath, Error, Result};

/// Run `script` directly (no shell) in `cwd` and wait for it.
///
/// # Errors
///
/// Returns `Error::Build` in the `before_script` phase if the script cannot
/// be started or exits non-zero.
pub fn run_before_script(script: &Path, cwd: &Path) -> Result<()> {
    let path = NodePath::root().key("before_script");
    tracing::info!(script = %script.display(), cwd = %cwd.display(), "running before_script");

    let output = Command::new(script)
        .current_dir(cwd)
        .output()
        .map_err(|e| {
            Error::build(
                BuildPhase::BeforeScript,
                path.clone(),
                format!("failed to run {}: {e}", script.display()),
            )
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        tracing::debug!(output = %stdout.trim_end(), "before_script output");
    }

    if output.status.success() {
        return Ok(());
    }
    let code = output
        .status
        .code()
        .map_or_else(|| "a signal".to_string(), |code| code.to_string());
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(Error::build(
        BuildPhase::BeforeScript,
        path,
        format!("{} exited with {code}: {}", script.display(), stderr.trim()),
    ))
}

#[cfg(test)]
mod tests {
    use std::{fs, os::unix::fs::PermissionsExt};

    use tempfile::TempDir;

    use super::*;

    fn script(dir: &Path, body: &str) -> Result<std::path::PathBuf> {
        let path = dir.join("bootstrap.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    #[test]
    fn test_script_runs_in_session_directory() -> Result<()> {
        let temp = TempDir::new()?;
        let path = script(temp.path(), "touch ran")?;
        run_before_script(&path, temp.path())?;
        assert!(temp.path().join("ran").exists());
        Ok(())
    }

    #[test]
    fn test_non_zero_exit_is_build_error() -> Result<()> {
        let temp = TempDir::new()?;
        let path = script(temp.path(), "echo missing deps >&2; exit 2")?;
        match run_before_script(&path, temp.path()) {
            Err(Error::Build { phase, path, message }) => {
                assert_eq!(phase, BuildPhase::BeforeScript);
                assert_eq!(path.to_string(), "before_script");
                assert!(message.contains("exited with 2"));
                assert!(message.contains("missing deps"));
            }
            other => panic!("expected build error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_missing_script_is_build_error() -> Result<()> {
        let temp = TempDir::new()?;
        let result = run_before_script(&temp.path().join("absent.sh"), temp.path());
        assert!(matches!(
            result,
            Err(Error::Build {
                phase: BuildPhase::BeforeScript,
                ..
            })
        ));
        Ok(())
    }
}
