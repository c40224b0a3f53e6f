//! Shorthand expansion - Functional Core with zero I/O
//!
//! Turns a raw workspace document (any JSON-shaped tree, usually parsed from
//! YAML) into the canonical [`WorkspaceConfig`]. Shapes the schema cannot
//! interpret are reported as `Error::Schema` with the offending node path.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::{
    path::NodePath,
    types::{Options, PaneConfig, WindowConfig, WorkspaceConfig},
};
use crate::{Error, Result};

const SESSION_KEYS: &[&str] = &[
    "session_name",
    "start_directory",
    "shell_command_before",
    "global_before_command",
    "before_script",
    "options",
    "global_options",
    "environment",
    "windows",
];

const WINDOW_KEYS: &[&str] = &[
    "window_name",
    "start_directory",
    "shell_command_before",
    "layout",
    "focus",
    "options",
    "options_after",
    "panes",
];

const PANE_KEYS: &[&str] = &[
    "start_directory",
    "shell_command_before",
    "shell_command",
    "focus",
    "enter",
    "sleep_before",
    "sleep_after",
];

/// Bare pane values that stand for a pane with no command.
pub(crate) const EMPTY_PANE_KEYWORDS: &[&str] = &["blank", "pane"];

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Expand a raw workspace document into canonical form.
///
/// # Errors
///
/// Returns `Error::Schema` if:
/// - The document is not a mapping
/// - `session_name` or `windows` is missing
/// - A window, pane, command, option or flag has the wrong shape
/// - Both `shell_command_before` and `global_before_command` are given
pub fn expand(raw: &Value) -> Result<WorkspaceConfig> {
    let root = NodePath::root();
    let map = as_mapping(raw, &root, "workspace document")?;

    let session_name = optional_string(map.get("session_name"), &root.key("session_name"))?
        .ok_or_else(|| Error::schema(root.key("session_name"), "session_name is required"))?;

    let global_before_command = match (
        map.get("shell_command_before"),
        map.get("global_before_command"),
    ) {
        (Some(_), Some(_)) => {
            return Err(Error::schema(
                root,
                "give either shell_command_before or global_before_command, not both",
            ))
        }
        (Some(value), None) => commands(Some(value), &root.key("shell_command_before"))?,
        (None, value) => commands(value, &root.key("global_before_command"))?,
    };

    let windows_path = root.key("windows");
    let mut windows = match map.get("windows") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| expand_window(item, index))
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::schema(
                windows_path,
                format!("windows must be a list, found {}", kind(other)),
            ))
        }
        None => return Err(Error::schema(windows_path, "windows is required")),
    };
    keep_first_focused_window(&mut windows);

    Ok(WorkspaceConfig {
        session_name,
        start_directory: optional_string(
            map.get("start_directory"),
            &root.key("start_directory"),
        )?,
        global_before_command,
        before_script: optional_string(map.get("before_script"), &root.key("before_script"))?,
        options: options(map.get("options"), &root.key("options"))?,
        global_options: options(map.get("global_options"), &root.key("global_options"))?,
        environment: environment(map.get("environment"), &root.key("environment"))?,
        windows,
        extra: unknown_keys(map, SESSION_KEYS),
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// WINDOWS AND PANES
// ═══════════════════════════════════════════════════════════════════════════

fn expand_window(value: &Value, index: usize) -> Result<WindowConfig> {
    let path = NodePath::window(index);
    let map = match value {
        Value::String(_) | Value::Number(_) => {
            return Ok(WindowConfig {
                window_name: optional_string(Some(value), &path)?,
                ..WindowConfig::default()
            })
        }
        Value::Object(map) => map,
        other => {
            return Err(Error::schema(
                path,
                format!("window must be a name or a mapping, found {}", kind(other)),
            ))
        }
    };

    let panes_path = path.key("panes");
    let mut panes = match map.get("panes") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(pane_index, item)| expand_pane(item, index, pane_index))
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::schema(
                panes_path,
                format!("panes must be a list, found {}", kind(other)),
            ))
        }
    };
    keep_first_focused_pane(&mut panes, index);

    Ok(WindowConfig {
        window_name: optional_string(map.get("window_name"), &path.key("window_name"))?,
        start_directory: optional_string(
            map.get("start_directory"),
            &path.key("start_directory"),
        )?,
        shell_command_before: commands(
            map.get("shell_command_before"),
            &path.key("shell_command_before"),
        )?,
        layout: optional_string(map.get("layout"), &path.key("layout"))?,
        focus: flag(map.get("focus"), &path.key("focus"), false)?,
        options: options(map.get("options"), &path.key("options"))?,
        options_after: options(map.get("options_after"), &path.key("options_after"))?,
        panes,
        extra: unknown_keys(map, WINDOW_KEYS),
    })
}

fn expand_pane(value: &Value, window: usize, index: usize) -> Result<PaneConfig> {
    let path = NodePath::pane(window, index);
    match value {
        Value::Null => Ok(PaneConfig::default()),
        Value::String(command) => {
            if command.trim().is_empty() || EMPTY_PANE_KEYWORDS.contains(&command.as_str()) {
                Ok(PaneConfig::default())
            } else {
                Ok(PaneConfig::with_commands([command.as_str()]))
            }
        }
        Value::Array(_) => Ok(PaneConfig {
            shell_command: commands(Some(value), &path.key("shell_command"))?,
            ..PaneConfig::default()
        }),
        Value::Object(map) => Ok(PaneConfig {
            start_directory: optional_string(
                map.get("start_directory"),
                &path.key("start_directory"),
            )?,
            shell_command_before: commands(
                map.get("shell_command_before"),
                &path.key("shell_command_before"),
            )?,
            shell_command: commands(map.get("shell_command"), &path.key("shell_command"))?,
            focus: flag(map.get("focus"), &path.key("focus"), false)?,
            enter: flag(map.get("enter"), &path.key("enter"), true)?,
            sleep_before: seconds(map.get("sleep_before"), &path.key("sleep_before"))?,
            sleep_after: seconds(map.get("sleep_after"), &path.key("sleep_after"))?,
            extra: unknown_keys(map, PANE_KEYS),
        }),
        other @ (Value::Bool(_) | Value::Number(_)) => Err(Error::schema(
            path,
            format!(
                "pane must be a command, a list of commands or a mapping, found {}",
                kind(other)
            ),
        )),
    }
}

fn keep_first_focused_window(windows: &mut [WindowConfig]) {
    let mut seen = false;
    for (index, window) in windows.iter_mut().enumerate() {
        if window.focus && std::mem::replace(&mut seen, true) {
            tracing::warn!(
                node = %NodePath::window(index),
                "more than one window declares focus; keeping the first"
            );
            window.focus = false;
        }
    }
}

fn keep_first_focused_pane(panes: &mut [PaneConfig], window: usize) {
    let mut seen = false;
    for (index, pane) in panes.iter_mut().enumerate() {
        if pane.focus && std::mem::replace(&mut seen, true) {
            tracing::warn!(
                node = %NodePath::pane(window, index),
                "more than one pane declares focus; keeping the first"
            );
            pane.focus = false;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FIELD HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Normalize a command field: absent or blank scalar → `[]`, scalar → `[x]`,
/// list elements kept verbatim.
fn commands(value: Option<&Value>, path: &NodePath) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(command)) if command.trim().is_empty() => Ok(Vec::new()),
        Some(Value::String(command)) => Ok(vec![command.clone()]),
        Some(Value::Number(number)) => Ok(vec![number.to_string()]),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(command) => Ok(command.clone()),
                Value::Number(number) => Ok(number.to_string()),
                other => Err(Error::schema(
                    path.index(index),
                    format!("command must be a string, found {}", kind(other)),
                )),
            })
            .collect(),
        Some(other) => Err(Error::schema(
            path.clone(),
            format!("expected a command or a list of commands, found {}", kind(other)),
        )),
    }
}

fn optional_string(value: Option<&Value>, path: &NodePath) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(Error::schema(
            path.clone(),
            format!("expected a string, found {}", kind(other)),
        )),
    }
}

fn flag(value: Option<&Value>, path: &NodePath, default: bool) -> Result<bool> {
    match value {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::String(text)) if text.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(text)) if text.eq_ignore_ascii_case("false") => Ok(false),
        Some(other) => Err(Error::schema(
            path.clone(),
            format!("expected true or false, found {other}"),
        )),
    }
}

fn seconds(value: Option<&Value>, path: &NodePath) -> Result<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => match number.as_f64() {
            Some(secs) if secs.is_finite() && secs >= 0.0 => Ok(Some(secs)),
            _ => Err(Error::schema(
                path.clone(),
                format!("expected a non-negative number of seconds, found {number}"),
            )),
        },
        Some(other) => Err(Error::schema(
            path.clone(),
            format!("expected a number of seconds, found {}", kind(other)),
        )),
    }
}

fn options(value: Option<&Value>, path: &NodePath) -> Result<Options> {
    match value {
        None | Some(Value::Null) => Ok(Options::new()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, option)| match option {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                    Ok((key.clone(), option.clone()))
                }
                other => Err(Error::schema(
                    path.key(key),
                    format!("option values must be scalars, found {}", kind(other)),
                )),
            })
            .collect(),
        Some(other) => Err(Error::schema(
            path.clone(),
            format!("expected a mapping of options, found {}", kind(other)),
        )),
    }
}

fn environment(value: Option<&Value>, path: &NodePath) -> Result<BTreeMap<String, String>> {
    options(value, path).map(|vars| {
        vars.into_iter()
            .map(|(key, value)| match value {
                Value::String(text) => (key, text),
                other => (key, other.to_string()),
            })
            .collect()
    })
}

fn unknown_keys(map: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn as_mapping<'a>(
    value: &'a Value,
    path: &NodePath,
    what: &str,
) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        Error::schema(
            path.clone(),
            format!("{what} must be a mapping, found {}", kind(value)),
        )
    })
}

/// Text form of an option value as handed to the multiplexer.
pub(crate) fn option_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(true) => "on".to_string(),
        Value::Bool(false) => "off".to_string(),
        other => other.to_string(),
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn session(windows: Value) -> Value {
        json!({ "session_name": "dev", "windows": windows })
    }

    #[test]
    fn test_bare_string_pane_becomes_command() -> Result<()> {
        let config = expand(&session(json!([{ "window_name": "w", "panes": ["top"] }])))?;
        assert_eq!(config.windows[0].panes[0].shell_command, vec!["top"]);
        Ok(())
    }

    #[test]
    fn test_bare_string_window_becomes_name() -> Result<()> {
        let config = expand(&session(json!(["editor"])))?;
        assert_eq!(config.windows[0].window_name.as_deref(), Some("editor"));
        assert!(config.windows[0].panes.is_empty());
        Ok(())
    }

    #[test]
    fn test_scalar_commands_become_sequences() -> Result<()> {
        let config = expand(&json!({
            "session_name": "dev",
            "shell_command_before": "source .env",
            "windows": [{
                "shell_command_before": "cd src",
                "panes": [{ "shell_command": "cargo watch", "shell_command_before": "nvm use" }]
            }]
        }))?;
        assert_eq!(config.global_before_command, vec!["source .env"]);
        assert_eq!(config.windows[0].shell_command_before, vec!["cd src"]);
        let pane = &config.windows[0].panes[0];
        assert_eq!(pane.shell_command, vec!["cargo watch"]);
        assert_eq!(pane.shell_command_before, vec!["nvm use"]);
        Ok(())
    }

    #[test]
    fn test_blank_scalars_normalize_to_empty() -> Result<()> {
        let config = expand(&session(json!([{
            "panes": [
                { "shell_command": "   " },
                "",
                null,
                "blank",
                "pane",
                {}
            ]
        }])))?;
        for pane in &config.windows[0].panes {
            assert!(pane.shell_command.is_empty());
        }
        assert_eq!(config.windows[0].panes.len(), 6);
        Ok(())
    }

    #[test]
    fn test_explicit_empty_list_element_is_preserved() -> Result<()> {
        let config = expand(&session(json!([{ "panes": [{ "shell_command": [""] }] }])))?;
        assert_eq!(config.windows[0].panes[0].shell_command, vec![String::new()]);
        Ok(())
    }

    #[test]
    fn test_list_pane_is_command_list() -> Result<()> {
        let config = expand(&session(json!([{ "panes": [["cd api", "make run"]] }])))?;
        assert_eq!(
            config.windows[0].panes[0].shell_command,
            vec!["cd api", "make run"]
        );
        Ok(())
    }

    #[test]
    fn test_first_focused_pane_wins() -> Result<()> {
        let config = expand(&session(json!([{
            "panes": [
                { "shell_command": "a" },
                { "shell_command": "b", "focus": true },
                { "shell_command": "c", "focus": true }
            ]
        }])))?;
        let focused: Vec<bool> = config.windows[0].panes.iter().map(|p| p.focus).collect();
        assert_eq!(focused, vec![false, true, false]);
        Ok(())
    }

    #[test]
    fn test_first_focused_window_wins() -> Result<()> {
        let config = expand(&session(json!([
            { "window_name": "a", "focus": "true" },
            { "window_name": "b", "focus": true }
        ])))?;
        assert!(config.windows[0].focus);
        assert!(!config.windows[1].focus);
        Ok(())
    }

    #[test]
    fn test_unknown_keys_pass_through() -> Result<()> {
        let config = expand(&json!({
            "session_name": "dev",
            "project": { "owner": "me" },
            "windows": [{ "window_name": "w", "color": "red", "panes": [{ "shell_command": "x", "note": 1 }] }]
        }))?;
        assert_eq!(config.extra["project"]["owner"], "me");
        assert_eq!(config.windows[0].extra["color"], "red");
        assert_eq!(config.windows[0].panes[0].extra["note"], 1);
        Ok(())
    }

    #[test]
    fn test_missing_session_name_is_schema_error() {
        let result = expand(&json!({ "windows": [] }));
        assert!(matches!(result, Err(Error::Schema { .. })));
    }

    #[test]
    fn test_missing_windows_is_schema_error() {
        let result = expand(&json!({ "session_name": "dev" }));
        assert!(matches!(result, Err(Error::Schema { .. })));
    }

    #[test]
    fn test_non_mapping_document_is_schema_error() {
        let result = expand(&json!(["not", "a", "workspace"]));
        assert!(matches!(result, Err(Error::Schema { .. })));
    }

    #[test]
    fn test_number_pane_is_schema_error() {
        let result = expand(&session(json!([{ "panes": [42] }])));
        assert!(matches!(
            result,
            Err(Error::Schema { ref path, .. }) if path.to_string() == "windows[0].panes[0]"
        ));
    }

    #[test]
    fn test_bool_pane_reports_path() {
        let result = expand(&session(json!([{ "panes": ["ok", true] }])));
        match result {
            Err(Error::Schema { path, .. }) => {
                assert_eq!(path.to_string(), "windows[0].panes[1]");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_option_value_is_schema_error() {
        let result = expand(&session(json!([{ "options": { "x": { "y": 1 } } }])));
        match result {
            Err(Error::Schema { path, .. }) => assert_eq!(path.to_string(), "windows[0].options.x"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_conflicting_before_aliases_is_schema_error() {
        let result = expand(&json!({
            "session_name": "dev",
            "shell_command_before": "a",
            "global_before_command": "b",
            "windows": []
        }));
        assert!(matches!(result, Err(Error::Schema { .. })));
    }

    #[test]
    fn test_global_before_command_alias() -> Result<()> {
        let config = expand(&json!({
            "session_name": "dev",
            "global_before_command": ["a", "b"],
            "windows": []
        }))?;
        assert_eq!(config.global_before_command, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn test_negative_sleep_is_schema_error() {
        let result = expand(&session(json!([{ "panes": [{ "sleep_before": -1 }] }])));
        assert!(matches!(result, Err(Error::Schema { .. })));
    }

    #[test]
    fn test_enter_and_environment() -> Result<()> {
        let config = expand(&json!({
            "session_name": "dev",
            "environment": { "PORT": 8080, "DEBUG": true },
            "windows": [{ "panes": [{ "shell_command": "make", "enter": false }] }]
        }))?;
        assert_eq!(config.environment["PORT"], "8080");
        assert_eq!(config.environment["DEBUG"], "true");
        assert!(!config.windows[0].panes[0].enter);
        Ok(())
    }
}
