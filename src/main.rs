//! speedgraph - Speed test history charts
//!
//! Command line entry point.

use anyhow::{Context, Result};
use clap::Parser;
use speedgraph::app;
use speedgraph::config::{Cli, Config};
use speedgraph::summary;
use std::io;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::from_cli(&cli).context("invalid arguments")?;
    let outcome = app::run(&config)?;

    if config.summary && !outcome.summaries.is_empty() {
        if config.json {
            println!("{}", summary::to_json(&outcome.summaries)?);
        } else {
            for line in summary::format_lines(&outcome.summaries) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
