//! CLI command implementations.

pub mod balance;
pub mod config;
pub mod cost;
pub mod parse;
pub mod usage;
pub mod watch;

use anyhow::Result;
use quotabar_store::Config;

use crate::Cli;

/// Loads the configuration named by `--config`, or the default one.
pub async fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path).await?,
        None => Config::load().await?,
    };
    Ok(config)
}
