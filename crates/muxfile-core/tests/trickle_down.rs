//! Directory and before-command inheritance, from document to resolved tree

use std::path::PathBuf;

use muxfile_core::{expand, resolve, Error, NodePath, ResolveContext, Result};
use serde_json::json;

fn ctx() -> ResolveContext {
    ResolveContext::new("/home/dev/project").with_home("/home/dev")
}

#[test]
fn test_relative_window_directory_joins_session() -> Result<()> {
    let config = expand(&json!({
        "session_name": "logs",
        "start_directory": "/var",
        "windows": [
            {"window_name": "syslog", "start_directory": "log", "panes": ["tail -f syslog"]},
            {"window_name": "up", "start_directory": "../etc", "panes": [null]},
        ],
    }))?;
    let resolved = resolve(&config, &ctx())?;

    assert_eq!(resolved.windows[0].start_directory, PathBuf::from("/var/log"));
    assert_eq!(
        resolved.windows[0].panes[0].start_directory,
        PathBuf::from("/var/log")
    );
    assert_eq!(resolved.windows[1].start_directory, PathBuf::from("/etc"));
    Ok(())
}

#[test]
fn test_home_directory_ignores_ancestors() -> Result<()> {
    let config = expand(&json!({
        "session_name": "dots",
        "start_directory": "/srv",
        "windows": [{"panes": [{"start_directory": "~/dotfiles"}, {"start_directory": "~"}]}],
    }))?;
    let resolved = resolve(&config, &ctx())?;

    let panes = &resolved.windows[0].panes;
    assert_eq!(panes[0].start_directory, PathBuf::from("/home/dev/dotfiles"));
    assert_eq!(panes[1].start_directory, PathBuf::from("/home/dev"));
    Ok(())
}

#[test]
fn test_relative_session_directory_uses_working_directory() -> Result<()> {
    let config = expand(&json!({
        "session_name": "api",
        "start_directory": "./services/api",
        "windows": ["editor"],
    }))?;
    let resolved = resolve(&config, &ctx())?;

    assert_eq!(
        resolved.start_directory,
        PathBuf::from("/home/dev/project/services/api")
    );
    assert_eq!(resolved.windows[0].start_directory, resolved.start_directory);
    Ok(())
}

#[test]
fn test_environment_variables_expand() -> Result<()> {
    let config = expand(&json!({
        "session_name": "env",
        "windows": [{"start_directory": "${CODE}/muxfile", "panes": ["make"]}],
    }))?;
    let resolved = resolve(&config, &ctx().with_var("CODE", "/opt/code"))?;

    assert_eq!(
        resolved.windows[0].panes[0].start_directory,
        PathBuf::from("/opt/code/muxfile")
    );
    Ok(())
}

#[test]
fn test_unset_variable_names_the_node() -> Result<()> {
    let config = expand(&json!({
        "session_name": "env",
        "windows": [{"start_directory": "$NOT_SET_ANYWHERE/src"}],
    }))?;
    let err = resolve(&config, &ctx()).err();

    assert!(
        matches!(
            &err,
            Some(Error::Resolution { path, .. })
                if *path == NodePath::window(0).key("start_directory")
                    && path.to_string() == "windows[0].start_directory"
        ),
        "expected a resolution error, got {err:?}"
    );
    Ok(())
}

#[test]
fn test_before_commands_concatenate_in_order() -> Result<()> {
    let config = expand(&json!({
        "session_name": "py",
        "shell_command_before": "source .venv/bin/activate",
        "windows": [{
            "shell_command_before": ["export DEBUG=1"],
            "panes": [
                {"shell_command_before": "cd tests", "shell_command": "pytest -x"},
                "python",
            ],
        }],
    }))?;
    let resolved = resolve(&config, &ctx())?;
    let window = &resolved.windows[0];

    assert_eq!(
        window.shell_command_before,
        vec!["source .venv/bin/activate", "export DEBUG=1"]
    );
    let first: Vec<_> = window.panes[0].dispatch_sequence().collect();
    assert_eq!(
        first,
        vec![
            "source .venv/bin/activate",
            "export DEBUG=1",
            "cd tests",
            "pytest -x"
        ]
    );
    let second: Vec<_> = window.panes[1].dispatch_sequence().collect();
    assert_eq!(
        second,
        vec!["source .venv/bin/activate", "export DEBUG=1", "python"]
    );
    Ok(())
}

#[test]
fn test_bare_pane_list_becomes_shell_command() -> Result<()> {
    let config = expand(&json!({
        "session_name": "top",
        "windows": [{"panes": ["top"]}],
    }))?;

    assert_eq!(config.windows[0].panes[0].shell_command, vec!["top"]);
    let resolved = resolve(&config, &ctx())?;
    assert_eq!(
        resolved.windows[0].panes[0].start_directory,
        PathBuf::from("/home/dev/project")
    );
    Ok(())
}

#[test]
fn test_before_script_is_relative_to_session_directory() -> Result<()> {
    let config = expand(&json!({
        "session_name": "boot",
        "start_directory": "/srv/app",
        "before_script": "./scripts/bootstrap.sh",
        "windows": ["main"],
    }))?;
    let resolved = resolve(&config, &ctx())?;

    assert_eq!(
        resolved.before_script,
        Some(PathBuf::from("/srv/app/scripts/bootstrap.sh"))
    );
    Ok(())
}

#[test]
fn test_absolute_directories_resolve_unchanged() -> Result<()> {
    let config = expand(&json!({
        "session_name": "fixed",
        "start_directory": "/srv/app",
        "windows": [
            {
                "start_directory": "/var/log",
                "panes": [
                    {"start_directory": "/var/log/nginx", "shell_command": "tail -f access.log"},
                    {"start_directory": "/tmp"},
                ],
            },
            {
                "start_directory": "/opt",
                "panes": [{"start_directory": "/etc"}],
            },
        ],
    }))?;
    let unrelated = ResolveContext::new("/somewhere/else")
        .with_home("/home/nobody")
        .with_base("/also/unrelated");
    let resolved = resolve(&config, &unrelated)?;

    assert_eq!(resolved.start_directory, PathBuf::from("/srv/app"));
    for (window, declared) in resolved.windows.iter().zip(&config.windows) {
        assert_eq!(
            Some(window.start_directory.as_path()),
            declared.start_directory.as_deref().map(std::path::Path::new)
        );
        for (pane, declared) in window.panes.iter().zip(&declared.panes) {
            assert_eq!(
                Some(pane.start_directory.as_path()),
                declared.start_directory.as_deref().map(std::path::Path::new)
            );
        }
    }
    assert_eq!(resolved.windows[0].panes.len(), 2);
    assert_eq!(resolved.windows[1].panes.len(), 1);
    Ok(())
}
