//! snapsite - freeze the routes of a running web application into a static site.

mod cli;
mod config;
mod core;
mod expand;
mod logger;
mod output;
mod route;
mod snapshot;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};

use crate::cli::{Cli, Commands};
use crate::config::SnapConfig;
use crate::core::Cancellation;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);
    logger::set_quiet(cli.quiet);

    // Setup global Ctrl+C handler (before any blocking operations)
    let cancel = Cancellation::new();
    crate::core::setup_shutdown_handler(cancel.clone())?;

    let config = SnapConfig::load(&cli)?;

    let code = match &cli.command {
        Commands::Generate { .. } => cli::generate::generate(&config, &cancel)?.exit_code(),
        Commands::Routes { json } => cli::routes::list_routes(&config, *json)?,
        Commands::Preview { .. } => {
            cli::preview::run_preview(&config, &cancel)?;
            0
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
