//! Validation-focused tests for configuration

#[cfg(test)]
mod validation_tests {
    use std::path::PathBuf;

    use crate::{
        config::{Config, HooksConfig, TmuxConfig},
        hooks::HookPoint,
        Error, Result, ResolveContext,
    };

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_empty_workspace_dir_rejected() {
        let config = Config {
            workspace_dir: "  ".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_both_sockets_rejected() {
        let config = Config {
            tmux: TmuxConfig {
                socket_name: Some("a".to_string()),
                socket_path: Some("/tmp/b".to_string()),
                ..TmuxConfig::default()
            },
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_blank_socket_name_rejected() {
        let config = Config {
            tmux: TmuxConfig {
                socket_name: Some(String::new()),
                ..TmuxConfig::default()
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_hook_command_rejected() {
        let config = Config {
            hooks: HooksConfig {
                after_window_finished: vec!["echo ok".to_string(), " ".to_string()],
                ..HooksConfig::default()
            },
            ..Config::default()
        };
        match config.validate() {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("after_window_finished")),
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn test_workspace_dir_expands_home() -> Result<()> {
        let ctx = ResolveContext::new("/cwd").with_home("/home/dev");
        assert_eq!(
            Config::default().workspace_dir_path(&ctx)?,
            PathBuf::from("/home/dev/.muxfile")
        );
        let relative = Config {
            workspace_dir: "workspaces".to_string(),
            ..Config::default()
        };
        assert_eq!(relative.workspace_dir_path(&ctx)?, PathBuf::from("/cwd/workspaces"));
        Ok(())
    }

    #[test]
    fn test_build_options_follow_config() {
        let config = Config {
            best_effort_hooks: vec![HookPoint::OnWorkspaceBuildComplete],
            ..Config::default()
        };
        let options = config.build_options();
        assert!(options.best_effort.contains(&HookPoint::OnWorkspaceBuildComplete));
        assert!(!options.best_effort.contains(&HookPoint::BeforeScript));
    }

    #[test]
    fn test_hooks_config_commands_by_point() {
        let hooks = HooksConfig {
            before_script: vec!["x".to_string()],
            ..HooksConfig::default()
        };
        assert_eq!(hooks.commands(HookPoint::BeforeScript), ["x".to_string()]);
        assert!(hooks.commands(HookPoint::OnWindowCreate).is_empty());
        assert!(!hooks.is_empty());
        assert!(HooksConfig::default().is_empty());
    }
}
