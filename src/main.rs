//! syncpad - one shared text document, kept in sync between a file on disk
//! and every connected reader.

mod actor;
mod cli;
mod config;
mod core;
mod document;
mod embed;
mod logger;
mod reload;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{SyncConfig, init_config};
use document::Persistence;
use std::io::Write;

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

    let config = init_config(SyncConfig::load(&cli)?);

    match &cli.command {
        Commands::Serve { .. } => cli::serve::serve(),
        Commands::Cat { .. } => print_document(&config),
    }
}

/// Print the document as the server would load it.
fn print_document(config: &SyncConfig) -> Result<()> {
    let persistence = Persistence::new(config.document_path(), config.watch.persist_timeout());
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(persistence.load().as_bytes())?;
    stdout.flush()?;
    Ok(())
}
