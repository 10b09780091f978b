//! Command implementations

mod artifacts;
mod config;
mod dashboard;
mod predict;
mod search;
mod simulate;

use crate::backend::{create_client, Client};
use crate::cli::{Cli, Commands};
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use anyhow::Result;
use cropdash_core::config::LayeredConfig;
use cropdash_orchestration::SuggestionSearch;
use std::time::Duration;

/// Everything a command needs: where to print, effective config, the backend
pub struct CommandContext {
    pub output: OutputWriter,
    pub config: LayeredConfig,
    pub client: Client,
}

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let config = load_config_with_overrides(&cli)?;
    let output = OutputWriter::new(cli.json);

    match cli.command {
        // Works even when the backend settings are unusable
        Commands::Config => config::execute(&config, &output),
        command => {
            let client = create_client(cli.client, &config)?;
            let ctx = CommandContext {
                output,
                config,
                client,
            };
            dispatch(command, &ctx).await
        }
    }
}

async fn dispatch(command: Commands, ctx: &CommandContext) -> Result<()> {
    match command {
        Commands::Search(args) => search::execute(args, ctx).await,
        Commands::Predict(args) => predict::execute(args, ctx).await,
        Commands::Dashboard(args) => dashboard::execute(args, ctx).await,
        Commands::Simulate(args) => simulate::execute(args, ctx).await,
        Commands::Artifacts => artifacts::execute(ctx).await,
        Commands::Config => config::execute(&ctx.config, &ctx.output),
    }
}

/// Feed `text` into the search one character at a time, like a user typing
pub async fn type_query(search: &SuggestionSearch<Client>, text: &str, keystroke: Duration) {
    let mut typed = String::new();
    for ch in text.chars() {
        typed.push(ch);
        search.on_query_changed(typed.clone());
        tokio::time::sleep(keystroke).await;
    }
}
