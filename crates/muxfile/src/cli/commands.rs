//! CLI command definitions using `clap`

use clap::{Arg, ArgAction, Command as ClapCommand};

const FORMATS: [&str; 4] = ["yaml", "yml", "json", "toml"];
const CONFLICT_POLICIES: [&str; 3] = ["abort", "kill_and_recreate", "append"];

pub fn after_help_text(examples: &[&str]) -> String {
    let mut text = String::from("EXAMPLES:\n");
    for example in examples {
        text.push_str("  ");
        text.push_str(example);
        text.push('\n');
    }
    text
}

pub fn cmd_load() -> ClapCommand {
    ClapCommand::new("load")
        .about("Build a tmux session from a workspace file")
        .long_about(
            "Finds the workspace by path, by directory (.muxfile.yaml inside it) or by name \
             in the workspace directory, then creates the session it describes.",
        )
        .after_help(after_help_text(&[
            "muxfile load dev                      Load ~/.muxfile/dev.yaml",
            "muxfile load ./project                Load ./project/.muxfile.yaml",
            "muxfile load dev --on-conflict append Add windows to a running session",
            "muxfile load dev --dry-run            Print the tmux calls without running them",
        ]))
        .arg(
            Arg::new("workspace")
                .required(true)
                .help("Workspace file, directory or name"),
        )
        .arg(
            Arg::new("on-conflict")
                .long("on-conflict")
                .value_name("POLICY")
                .value_parser(CONFLICT_POLICIES)
                .help("What to do if the session already exists"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Build against an in-memory multiplexer and print the plan"),
        )
        .arg(
            Arg::new("socket-name")
                .short('L')
                .value_name("SOCKET")
                .conflicts_with("socket-path")
                .help("tmux socket name"),
        )
        .arg(
            Arg::new("socket-path")
                .short('S')
                .value_name("PATH")
                .help("tmux socket path"),
        )
}

pub fn cmd_freeze() -> ClapCommand {
    ClapCommand::new("freeze")
        .about("Write a running session out as a workspace file")
        .after_help(after_help_text(&[
            "muxfile freeze dev                    Print the session as YAML",
            "muxfile freeze dev -o dev.json        Write JSON (format from extension)",
            "muxfile freeze dev --format toml      Print TOML",
        ]))
        .arg(
            Arg::new("session")
                .required(true)
                .help("Name of the running session"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .value_parser(FORMATS)
                .help("Output format (default: from -o extension, else config)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("FILE")
                .help("Write to FILE instead of stdout"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Overwrite FILE if it exists"),
        )
        .arg(
            Arg::new("socket-name")
                .short('L')
                .value_name("SOCKET")
                .conflicts_with("socket-path")
                .help("tmux socket name"),
        )
        .arg(
            Arg::new("socket-path")
                .short('S')
                .value_name("PATH")
                .help("tmux socket path"),
        )
}

pub fn cmd_convert() -> ClapCommand {
    ClapCommand::new("convert")
        .about("Convert a workspace file between YAML, JSON and TOML")
        .after_help(after_help_text(&[
            "muxfile convert dev.yaml --format json         Print as JSON",
            "muxfile convert dev.yaml --format toml -o dev.toml",
            "muxfile convert dev.yaml --format yaml --canonical",
        ]))
        .arg(
            Arg::new("file")
                .required(true)
                .help("Workspace file to convert"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .required(true)
                .value_parser(FORMATS)
                .help("Target format"),
        )
        .arg(
            Arg::new("canonical")
                .long("canonical")
                .action(ArgAction::SetTrue)
                .help("Write the fully expanded form instead of the compact one"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("FILE")
                .help("Write to FILE instead of stdout"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Overwrite FILE if it exists"),
        )
}

pub fn cmd_ls() -> ClapCommand {
    ClapCommand::new("ls")
        .about("List workspaces in the workspace directory")
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Output as JSON"),
        )
}

pub fn build_cli() -> ClapCommand {
    ClapCommand::new("muxfile")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Declarative tmux sessions from YAML, JSON or TOML workspace files")
        .disable_help_subcommand(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log every multiplexer call"),
        )
        .subcommand(cmd_load())
        .subcommand(cmd_freeze())
        .subcommand(cmd_convert())
        .subcommand(cmd_ls())
}
