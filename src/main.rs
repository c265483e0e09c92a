//! Vellum - a live playground: edit a Lua script, preview the document it
//! generates.

mod actor;
mod bridge;
mod cli;
mod config;
mod core;
mod display;
mod embed;
mod logger;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PlaygroundConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = PlaygroundConfig::load(&cli)?;

    match &cli.command {
        Commands::Init { name } => cli::init::new_project(&config, name.is_some()),
        Commands::Run { .. } => cli::run::run_once(&config),
        Commands::Watch { .. } => cli::watch::watch_project(&config),
        Commands::Serve { .. } => cli::serve::serve_project(&config),
    }
}
