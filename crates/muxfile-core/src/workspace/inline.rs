//! Shorthand collapsing, the inverse of [`expand`](super::expand).
//!
//! `inline` is total: any canonical tree renders to a document, and
//! `expand(inline(tree)) == tree` for every tree `expand` can produce.

use serde_json::{Map, Value};

use super::{
    expand::EMPTY_PANE_KEYWORDS,
    types::{Options, PaneConfig, WindowConfig, WorkspaceConfig},
};

/// Collapse a canonical tree into its most compact document form.
#[must_use]
pub fn inline(config: &WorkspaceConfig) -> Value {
    let mut map = Map::new();
    map.insert(
        "session_name".to_string(),
        Value::String(config.session_name.clone()),
    );
    insert_string(&mut map, "start_directory", config.start_directory.as_ref());
    insert_commands(&mut map, "shell_command_before", &config.global_before_command);
    insert_string(&mut map, "before_script", config.before_script.as_ref());
    insert_options(&mut map, "options", &config.options);
    insert_options(&mut map, "global_options", &config.global_options);
    if !config.environment.is_empty() {
        let vars = config
            .environment
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        map.insert("environment".to_string(), Value::Object(vars));
    }
    map.insert(
        "windows".to_string(),
        Value::Array(config.windows.iter().map(inline_window).collect()),
    );
    merge_extra(&mut map, &config.extra);
    Value::Object(map)
}

fn inline_window(window: &WindowConfig) -> Value {
    let mut map = Map::new();
    insert_string(&mut map, "window_name", window.window_name.as_ref());
    insert_string(&mut map, "start_directory", window.start_directory.as_ref());
    insert_commands(&mut map, "shell_command_before", &window.shell_command_before);
    insert_string(&mut map, "layout", window.layout.as_ref());
    if window.focus {
        map.insert("focus".to_string(), Value::Bool(true));
    }
    insert_options(&mut map, "options", &window.options);
    insert_options(&mut map, "options_after", &window.options_after);
    if !window.panes.is_empty() {
        map.insert(
            "panes".to_string(),
            Value::Array(window.panes.iter().map(inline_pane).collect()),
        );
    }
    merge_extra(&mut map, &window.extra);

    match (map.len(), map.get("window_name")) {
        (1, Some(Value::String(name))) if !name.trim().is_empty() => Value::String(name.clone()),
        _ => Value::Object(map),
    }
}

fn inline_pane(pane: &PaneConfig) -> Value {
    let mut map = Map::new();
    insert_string(&mut map, "start_directory", pane.start_directory.as_ref());
    insert_commands(&mut map, "shell_command_before", &pane.shell_command_before);
    insert_commands(&mut map, "shell_command", &pane.shell_command);
    if pane.focus {
        map.insert("focus".to_string(), Value::Bool(true));
    }
    if !pane.enter {
        map.insert("enter".to_string(), Value::Bool(false));
    }
    if let Some(secs) = pane.sleep_before {
        map.insert("sleep_before".to_string(), Value::from(secs));
    }
    if let Some(secs) = pane.sleep_after {
        map.insert("sleep_after".to_string(), Value::from(secs));
    }
    merge_extra(&mut map, &pane.extra);

    if map.is_empty() {
        return Value::String("pane".to_string());
    }
    match (map.len(), map.get("shell_command")) {
        (1, Some(Value::String(command))) if !EMPTY_PANE_KEYWORDS.contains(&command.as_str()) => {
            Value::String(command.clone())
        }
        _ => Value::Object(map),
    }
}

/// A single non-blank command collapses to a scalar. A lone blank command
/// stays a list, since a blank scalar means "no command".
fn insert_commands(map: &mut Map<String, Value>, key: &str, commands: &[String]) {
    let value = match commands {
        [] => return,
        [single] if !single.trim().is_empty() => Value::String(single.clone()),
        many => Value::Array(many.iter().cloned().map(Value::String).collect()),
    };
    map.insert(key.to_string(), value);
}

fn insert_string(map: &mut Map<String, Value>, key: &str, value: Option<&String>) {
    if let Some(text) = value {
        map.insert(key.to_string(), Value::String(text.clone()));
    }
}

fn insert_options(map: &mut Map<String, Value>, key: &str, options: &Options) {
    if !options.is_empty() {
        let entries = options
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        map.insert(key.to_string(), Value::Object(entries));
    }
}

/// Extras never shadow schema keys.
fn merge_extra(map: &mut Map<String, Value>, extra: &Map<String, Value>) {
    for (key, value) in extra {
        if !map.contains_key(key) {
            map.insert(key.clone(), value.clone());
        }
    }
}
