//! muxfile CLI - declarative tmux sessions
//!
//! Binary name: `muxfile`

use std::process;

mod cli;
mod commands;

use cli::handlers::{format_error, run_cli};

fn main() {
    if let Err(err) = run_cli() {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {}", format_error(&err));
        }

        let code = err
            .downcast_ref::<muxfile_core::Error>()
            .map_or(1, muxfile_core::Error::exit_code);

        #[allow(clippy::exit)]
        process::exit(code);
    }
}
