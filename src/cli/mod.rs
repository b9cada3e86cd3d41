// src/cli/mod.rs
use crate::cli::args::{Cli, Commands};
use crate::cli::error::CliResult;
use crate::config::Settings;
use crate::exitcode;

pub mod args;
pub mod bookmark_commands;
pub mod display;
pub mod error;
pub mod import_commands;
pub mod terminal_view;

/// Runs the selected command and returns the process exit code
pub fn execute_command(cli: Cli, settings: &Settings) -> CliResult<i32> {
    if cli.generate_config {
        println!("{}", crate::config::generate_default_config());
        return Ok(exitcode::SUCCESS);
    }
    match cli.command {
        Some(Commands::Import { .. }) => bookmark_commands::import(cli, settings),
        Some(Commands::Preview { .. }) => bookmark_commands::preview(cli, settings),
        Some(Commands::CreateDb { .. }) => bookmark_commands::create_db(cli),
        Some(Commands::ShowConfig) => bookmark_commands::show_config(settings),
        None => Ok(exitcode::SUCCESS),
    }
}
