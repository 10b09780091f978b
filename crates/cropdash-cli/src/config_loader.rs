//! Configuration loading for CLI commands

use crate::cli::Cli;
use anyhow::{Context, Result};
use cropdash_core::config::{validate_base_url, CliConfigOverrides, LayeredConfig};
use std::path::Path;

/// Defaults, then the optional file, then the environment
pub fn load_config(file: Option<&Path>) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = file {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }
    Ok(config.load_from_env())
}

/// Full layered configuration including the global flags
pub fn load_config_with_overrides(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    config.update_from_cli(overrides_from(cli)?);
    Ok(config)
}

fn overrides_from(cli: &Cli) -> Result<CliConfigOverrides> {
    let base_url = cli.base_url.as_deref().map(validate_base_url).transpose()?;
    Ok(CliConfigOverrides {
        base_url,
        language: cli.language,
        ..Default::default()
    })
}
