//! CLI command handlers that bridge between `clap` and internal logic

use anyhow::{Context, Result};
use clap::ArgMatches;
use muxfile_core::{workspace::WorkspaceFormat, ConflictPolicy};

use crate::{
    cli::{build_cli, setup},
    commands::{convert, freeze, load, ls, SocketOverride},
};

/// Format an error for user display (no stack traces)
pub fn format_error(err: &anyhow::Error) -> String {
    let msg = err.to_string();
    if let Some(source) = err.source() {
        let source_msg = source.to_string();
        if !msg.contains(&source_msg) && !source_msg.is_empty() {
            return format!("{msg}\nCause: {source_msg}");
        }
    }
    msg
}

fn format_arg(sub_m: &ArgMatches) -> Result<Option<WorkspaceFormat>> {
    sub_m
        .get_one::<String>("format")
        .map(|format| format.parse::<WorkspaceFormat>())
        .transpose()
        .context("Invalid --format")
}

fn string_arg(sub_m: &ArgMatches, id: &str) -> Option<String> {
    sub_m.get_one::<String>(id).cloned()
}

fn required_arg(sub_m: &ArgMatches, id: &str) -> Result<String> {
    string_arg(sub_m, id).ok_or_else(|| anyhow::anyhow!("<{id}> is required"))
}

pub fn handle_load(sub_m: &ArgMatches) -> Result<()> {
    let on_conflict = sub_m
        .get_one::<String>("on-conflict")
        .map(|policy| policy.parse::<ConflictPolicy>())
        .transpose()
        .context("Invalid --on-conflict")?;
    load::run(&load::LoadOptions {
        target: required_arg(sub_m, "workspace")?,
        on_conflict,
        dry_run: sub_m.get_flag("dry-run"),
        socket: SocketOverride::from_args(
            string_arg(sub_m, "socket-name"),
            string_arg(sub_m, "socket-path"),
        ),
    })
}

pub fn handle_freeze(sub_m: &ArgMatches) -> Result<()> {
    freeze::run(&freeze::FreezeOptions {
        session: required_arg(sub_m, "session")?,
        format: format_arg(sub_m)?,
        output: string_arg(sub_m, "output").map(Into::into),
        force: sub_m.get_flag("force"),
        socket: SocketOverride::from_args(
            string_arg(sub_m, "socket-name"),
            string_arg(sub_m, "socket-path"),
        ),
    })
}

pub fn handle_convert(sub_m: &ArgMatches) -> Result<()> {
    let format = format_arg(sub_m)?.ok_or_else(|| anyhow::anyhow!("--format is required"))?;
    convert::run(&convert::ConvertOptions {
        file: required_arg(sub_m, "file")?.into(),
        format,
        canonical: sub_m.get_flag("canonical"),
        output: string_arg(sub_m, "output").map(Into::into),
        force: sub_m.get_flag("force"),
    })
}

pub fn handle_ls(sub_m: &ArgMatches) -> Result<()> {
    ls::run(&ls::LsOptions {
        json: sub_m.get_flag("json"),
    })
}

/// Parse arguments, set up logging and run the selected command.
///
/// # Errors
///
/// Returns the command's error; `main` maps it to an exit code.
pub fn run_cli() -> Result<()> {
    let matches = build_cli().get_matches();
    setup::init_tracing(matches.get_flag("verbose"))?;

    match matches.subcommand() {
        Some(("load", sub_m)) => handle_load(sub_m),
        Some(("freeze", sub_m)) => handle_freeze(sub_m),
        Some(("convert", sub_m)) => handle_convert(sub_m),
        Some(("ls", sub_m)) => handle_ls(sub_m),
        Some((name, _)) => Err(anyhow::anyhow!("Unknown command: {name}")),
        None => Err(anyhow::anyhow!("No command given")),
    }
}
