//! Loading-focused tests for configuration
//!
//! File parsing, environment overrides and the full load hierarchy.

#[cfg(test)]
mod loading_tests {
    use std::collections::HashMap;

    use serial_test::serial;
    use tempfile::TempDir;

    use crate::{
        builder::ConflictPolicy,
        config::{load_config, load_toml_file, Config},
        hooks::HookPoint,
        workspace::WorkspaceFormat,
        Error, Result,
    };

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_partial_toml_fills_defaults() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
on_conflict = "kill_and_recreate"
best_effort_hooks = ["before_script"]

[tmux]
socket_name = "work"

[hooks]
on_window_create = ["echo created"]
"#,
        )?;

        let config = load_toml_file(&path)?;
        assert_eq!(config.on_conflict, ConflictPolicy::KillAndRecreate);
        assert_eq!(config.best_effort_hooks, vec![HookPoint::BeforeScript]);
        assert_eq!(config.tmux.socket_name.as_deref(), Some("work"));
        assert_eq!(config.tmux.binary, "tmux");
        assert_eq!(config.hooks.on_window_create, vec!["echo created"]);
        assert_eq!(config.workspace_dir, Config::default().workspace_dir);
        Ok(())
    }

    #[test]
    fn test_malformed_toml_returns_parse_error() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("bad.toml");
        std::fs::write(&path, "workspace_dir = \n invalid toml [[[")?;

        let result = load_toml_file(&path);
        assert!(matches!(result, Err(Error::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_unknown_hook_point_is_parse_error() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "best_effort_hooks = [\"post_merge\"]")?;
        assert!(matches!(load_toml_file(&path), Err(Error::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_directory_path_is_io_error() -> Result<()> {
        let temp = TempDir::new()?;
        assert!(matches!(load_toml_file(temp.path()), Err(Error::Io(_))));
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let config = Config::default().apply_env_from(env(&[
            ("MUXFILE_WORKSPACE_DIR", "/srv/ws"),
            ("MUXFILE_ON_CONFLICT", "append"),
            ("MUXFILE_BEST_EFFORT_HOOKS", "before_script, on_window_create"),
            ("MUXFILE_FREEZE_FORMAT", "json"),
            ("MUXFILE_TMUX_SOCKET_PATH", "/tmp/tmux.sock"),
        ]))?;
        assert_eq!(config.workspace_dir, "/srv/ws");
        assert_eq!(config.on_conflict, ConflictPolicy::Append);
        assert_eq!(
            config.best_effort_hooks,
            vec![HookPoint::BeforeScript, HookPoint::OnWindowCreate]
        );
        assert_eq!(config.freeze_format, WorkspaceFormat::Json);
        assert_eq!(config.tmux.socket_path.as_deref(), Some("/tmp/tmux.sock"));
        Ok(())
    }

    #[test]
    fn test_invalid_env_value_is_invalid_config() {
        let result = Config::default().apply_env_from(env(&[("MUXFILE_ON_CONFLICT", "merge")]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));

        let result =
            Config::default().apply_env_from(env(&[("MUXFILE_BEST_EFFORT_HOOKS", "nope")]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    #[serial]
    fn test_load_config_reads_process_env() -> Result<()> {
        std::env::set_var("MUXFILE_FREEZE_FORMAT", "toml");
        let result = load_config();
        std::env::remove_var("MUXFILE_FREEZE_FORMAT");
        assert_eq!(result?.freeze_format, WorkspaceFormat::Toml);
        Ok(())
    }
}
