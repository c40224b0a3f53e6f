//! Load a workspace into a tmux session

use std::path::Path;

use anyhow::{Context, Result};
use muxfile_core::{
    build,
    config::Config,
    hooks::{Version, Versions},
    mux::MuxCall,
    workspace::{locate_workspace, read_document},
    BuildOptions, BuildResult, ConflictPolicy, Error, HookRegistry, MemoryMux, Multiplexer,
    ResolveContext, ResolvedWorkspace, ShellHooks,
};

use super::{settings, SocketOverride};

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// File, directory or name of the workspace.
    pub target: String,
    /// Overrides `on_conflict` from the config.
    pub on_conflict: Option<ConflictPolicy>,
    pub dry_run: bool,
    pub socket: SocketOverride,
}

/// Run the load command
///
/// 1. Locate and read the workspace document
/// 2. Normalize and resolve it (a relative session directory joins the
///    file's directory; an undeclared one is the working directory)
/// 3. Register shell hooks from the config
/// 4. Build the session
pub fn run(options: &LoadOptions) -> Result<()> {
    let config = settings(&options.socket)?;
    let ctx = ResolveContext::from_env()?;
    let workspace_dir = config.workspace_dir_path(&ctx)?;
    let path = locate_workspace(&options.target, ctx.cwd(), &workspace_dir)?;
    tracing::info!(workspace = %path.display(), "loading workspace");

    let workspace = read_workspace(&path, ctx)?;
    let build_options = BuildOptions {
        on_conflict: options.on_conflict.unwrap_or(config.on_conflict),
        ..config.build_options()
    };

    if options.dry_run {
        return dry_run(&workspace, &build_options);
    }

    let server = config.tmux_server().detect().map_err(Error::from)?;
    let hooks = shell_hooks(&config, &server)?;
    let result = build(&workspace, &server, &hooks, &build_options)?;
    report(&result);
    Ok(())
}

fn read_workspace(path: &Path, ctx: ResolveContext) -> Result<ResolvedWorkspace> {
    let (raw, _) = read_document(path)?;
    let canonical = muxfile_core::expand(&raw)
        .with_context(|| format!("Invalid workspace {}", path.display()))?;
    let base = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| ctx.cwd().to_path_buf(), Path::to_path_buf);
    Ok(muxfile_core::resolve(&canonical, &ctx.with_base(base))?)
}

fn shell_hooks(config: &Config, mux: &dyn Multiplexer) -> Result<HookRegistry> {
    let mut hooks = HookRegistry::new();
    if config.hooks.is_empty() {
        return Ok(hooks);
    }
    let versions = Versions {
        muxfile: Version::parse(muxfile_core::VERSION)?,
        multiplexer: mux.version().map_err(Error::from)?,
    };
    hooks.register_plugin(&ShellHooks::new(config.hooks.clone()), &versions)?;
    Ok(hooks)
}

/// Build against the in-memory multiplexer and print each mutating call.
///
/// Shell hooks are not registered: they would run for real.
fn dry_run(workspace: &ResolvedWorkspace, options: &BuildOptions) -> Result<()> {
    let mux = MemoryMux::new();
    build(workspace, &mux, &HookRegistry::new(), options)?;
    for call in mux.mutations() {
        println!("{}", describe(&call));
    }
    Ok(())
}

/// One line of the dry-run plan, in tmux terms.
fn describe(call: &MuxCall) -> String {
    match call {
        MuxCall::CreateSession {
            name,
            start_directory,
            window_name,
        } => match window_name {
            Some(window) => format!(
                "new-session -s {name} -n {window} -c {}",
                start_directory.display()
            ),
            None => format!("new-session -s {name} -c {}", start_directory.display()),
        },
        MuxCall::KillSession { name } => format!("kill-session -t {name}"),
        MuxCall::CreateWindow {
            session,
            name,
            start_directory,
        } => match name {
            Some(window) => format!(
                "new-window -t {session} -n {window} -c {}",
                start_directory.display()
            ),
            None => format!("new-window -t {session} -c {}", start_directory.display()),
        },
        MuxCall::RenameWindow { window, name } => format!("rename-window -t {window} {name}"),
        MuxCall::SplitPane {
            window,
            start_directory,
        } => format!("split-window -t {window} -c {}", start_directory.display()),
        MuxCall::ChangeDirectory {
            pane,
            start_directory,
        } => format!("respawn-pane -k -t {pane} -c {}", start_directory.display()),
        MuxCall::SendCommand { pane, text, enter } => {
            let enter = if *enter { " Enter" } else { "" };
            format!("send-keys -t {pane} {text:?}{enter}")
        }
        MuxCall::SetOption { target, key, value } if target == "global" => {
            format!("set-option -g {key} {value}")
        }
        MuxCall::SetOption { target, key, value } => {
            format!("set-option -t {target} {key} {value}")
        }
        MuxCall::SetEnvironment {
            session,
            key,
            value,
        } => format!("set-environment -t {session} {key} {value}"),
        MuxCall::SelectLayout { window, layout } => format!("select-layout -t {window} {layout}"),
        MuxCall::SelectWindow { window } => format!("select-window -t {window}"),
        MuxCall::SelectPane { pane } => format!("select-pane -t {pane}"),
        other => other.operation().to_string(),
    }
}

fn report(result: &BuildResult) {
    for warning in &result.warnings {
        tracing::warn!("{warning}");
    }
    let verb = if result.appended { "Updated" } else { "Created" };
    println!(
        "{verb} session '{}' ({} windows, {} commands sent)",
        result.session.name,
        result.windows.len(),
        result.commands_sent
    );
    println!("Attach with: tmux attach -t '={}'", result.session.name);
}
