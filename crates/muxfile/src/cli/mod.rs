//! CLI definition, setup and dispatch

pub mod commands;
pub mod handlers;
pub mod setup;

pub use commands::build_cli;
