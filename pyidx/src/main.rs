// External crates
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing::debug;

// Internal imports
use pyidx::Config;

// Local modules
mod cli;
mod commands;

use cli::Args;
use commands::execute_command;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let config = Config::discover(args.config.as_deref()).context("failed to load configuration")?;

    let mut log = config.log.clone();
    if args.verbose {
        log.level = Some("debug".to_string());
    }
    if let Some(format) = args.log_format {
        log.format = format;
    }
    let _log_guard = pyidx_logging::init_subscriber(&log);

    debug!(command = ?args.command, "Starting pyidx");
    execute_command(args.command, config)
}
