//! Cropdash CLI - Terminal front end for the crop advisory dashboards
//!
//! Drives the orchestration layer against the HTTP backend or the in-memory
//! fixture backend.

mod backend;
mod cli;
mod commands;
mod config_loader;
mod errors;
mod output;
mod output_types;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Runtime::new()?;

    if let Err(error) = runtime.block_on(commands::execute(cli)) {
        errors::from_anyhow(error).display();
        std::process::exit(1);
    }

    Ok(())
}
