//! reelguard command-line entry point.
//!
//! Inspects and resets the player state persisted by the video registry.
//! The binary always starts, even without a config file, so it can be used
//! to diagnose a broken state file.
//!
//! Pass `--log-file` anywhere on the command line to also write a
//! daily-rotated log into the reelguard log directory.

use std::{env, error::Error, process};

use reelguard::{
    cli::{CliService, formatting::format_error},
    config::Config,
    service_manager::Services,
    tracing_config,
};
use tracing::warn;

const LOG_FILE_FLAG: &str = "--log-file";

fn main() -> Result<(), Box<dyn Error>> {
    let (log_to_file, args) = take_log_file_flag(env::args().skip(1).collect());
    if log_to_file {
        tracing_config::init_with_file()?;
    } else {
        tracing_config::init_cli_mode()?;
    }

    run_cli_command(&args)
}

/// Strips every `--log-file` flag from `args` and reports whether one was set.
fn take_log_file_flag(mut args: Vec<String>) -> (bool, Vec<String>) {
    let before = args.len();
    args.retain(|arg| arg != LOG_FILE_FLAG);
    (args.len() != before, args)
}

/// Executes CLI commands through the CliService.
///
/// Parses command line arguments as `<category> <command> [args...]` and
/// routes them to the matching command handler. No arguments prints help.
///
/// # Errors
/// Returns error if the state location cannot be determined.
fn run_cli_command(args: &[String]) -> Result<(), Box<dyn Error>> {
    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Invalid config file, falling back to defaults");
        Config::default()
    });
    let store = Services::state_store(&config)?;
    let cli_service = CliService::new(store);

    let category = args.first().map(String::as_str).unwrap_or("help");
    let command = args.get(1).map(String::as_str).unwrap_or("");
    let command_args = args.get(2..).unwrap_or(&[]);

    match cli_service.execute_command(category, command, command_args) {
        Ok(output) => {
            if !output.trim().is_empty() {
                println!("{output}");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            process::exit(1);
        }
    }
}
