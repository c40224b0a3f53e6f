//! CLI integration tests
//!
//! Every command runs with `XDG_CONFIG_HOME` and `MUXFILE_WORKSPACE_DIR`
//! pointed into a temp directory so a developer's own config is never read.

use std::{fs, path::Path, process::Command};

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const DEMO_YAML: &str = "\
session_name: demo
start_directory: /tmp
windows:
  - window_name: editor
    panes:
      - vim
      - shell_command: [git status]
        focus: true
  - logs
";

fn muxfile(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_muxfile"));
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("MUXFILE_WORKSPACE_DIR", home.join("workspaces"))
        .env_remove("MUXFILE_ON_CONFLICT")
        .env_remove("MUXFILE_FREEZE_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

fn write_workspace(home: &Path, name: &str, text: &str) -> anyhow::Result<std::path::PathBuf> {
    let dir = home.join("workspaces");
    fs::create_dir_all(&dir)?;
    let path = dir.join(name);
    fs::write(&path, text)?;
    Ok(path)
}

// ═══════════════════════════════════════════════════════════════════════════
// CONVERT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_convert_yaml_to_json() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = write_workspace(temp.path(), "demo.yaml", DEMO_YAML)?;

    muxfile(temp.path())
        .args(["convert", "--format", "json"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"session_name\": \"demo\""))
        .stdout(predicate::str::contains("\"logs\""));
    Ok(())
}

#[test]
fn test_convert_canonical_writes_file() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = write_workspace(temp.path(), "demo.yaml", DEMO_YAML)?;
    let output = temp.path().join("out/demo.toml");

    muxfile(temp.path())
        .args(["convert", "--format", "toml", "--canonical"])
        .arg(&path)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let text = fs::read_to_string(&output)?;
    assert!(text.contains("session_name = \"demo\""));
    assert!(text.contains("window_name = \"logs\""));

    // A second run refuses to overwrite without --force.
    muxfile(temp.path())
        .args(["convert", "--format", "toml"])
        .arg(&path)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    Ok(())
}

#[test]
fn test_convert_reports_schema_errors() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = write_workspace(temp.path(), "broken.yaml", "session_name: x\nwindows: 3\n")?;

    muxfile(temp.path())
        .args(["convert", "--format", "json"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("windows"));
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// LOAD
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_load_dry_run_prints_plan() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    write_workspace(temp.path(), "demo.yaml", DEMO_YAML)?;

    muxfile(temp.path())
        .args(["load", "demo", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("new-session -s demo -n editor -c /tmp"))
        .stdout(predicate::str::contains("send-keys -t %3 \"vim\" Enter"))
        .stdout(predicate::str::contains("new-window -t $1 -n logs -c /tmp"))
        .stdout(predicate::str::contains("select-pane"));
    Ok(())
}

#[test]
fn test_load_missing_workspace_exits_not_found() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    muxfile(temp.path())
        .current_dir(temp.path())
        .args(["load", "nowhere", "--dry-run"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No workspace named 'nowhere'"));
    Ok(())
}

#[test]
fn test_load_rejects_unknown_policy() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    muxfile(temp.path())
        .args(["load", "demo", "--on-conflict", "merge"])
        .assert()
        .failure();
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// LS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_ls_lists_workspace_names() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    write_workspace(temp.path(), "demo.yaml", DEMO_YAML)?;
    write_workspace(temp.path(), "api.json", "{}")?;
    write_workspace(temp.path(), "notes.txt", "not a workspace")?;

    muxfile(temp.path())
        .arg("ls")
        .assert()
        .success()
        .stdout("api\ndemo\n");
    Ok(())
}

#[test]
fn test_ls_json() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    write_workspace(temp.path(), "demo.yml", DEMO_YAML)?;

    let output = muxfile(temp.path()).args(["ls", "--json"]).output()?;
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(parsed["workspaces"][0]["name"], "demo");
    assert_eq!(parsed["workspaces"][0]["format"], "yaml");
    Ok(())
}

#[test]
fn test_no_arguments_prints_help() {
    Command::new(env!("CARGO_BIN_EXE_muxfile"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
