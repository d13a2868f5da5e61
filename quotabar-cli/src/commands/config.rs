//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use quotabar_store::{default_cache_path, default_config_dir, Config};
use std::path::{Path, PathBuf};
use tracing::info;

use super::load_config;
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration and cache paths.
    Path,

    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await?,
        ConfigAction::Path => show_paths(cli)?,
        ConfigAction::Init { force } => init_config(&config_path(cli), *force).await?,
    }
    Ok(ExitCode::Success)
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(Config::default_path)
}

async fn show_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli).await?;

    match cli.format {
        OutputFormat::Text => {
            let general = &config.general;
            let scrape = &config.scrape;

            println!("QuotaBar Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Refresh interval:   {}s", general.refresh_interval_secs);
            println!("Notifications:      {}", general.notifications);
            println!(
                "Thresholds:         warning {}%, critical {}%",
                general.warning_threshold, general.critical_threshold
            );
            println!("Log level:          {}", general.log_level);
            println!();
            println!("Usage page:         {}", scrape.usage_url);
            match &scrape.render_command {
                Some(command) => println!("Render command:     {}", command.join(" ")),
                None => println!("Render command:     (not set)"),
            }
            println!("Render timeout:     {}s", scrape.render_timeout_secs);
            println!();
            println!("Admin API:          {}", config.billing.api_base_url);
            println!("Admin key variable: {}", config.billing.api_key_env);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&config)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_file = config_path(cli);
    let cache_file = default_cache_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", config_file.display());
            println!("Usage cache: {}", cache_file.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "configDir": config_dir.display().to_string(),
                "configFile": config_file.display().to_string(),
                "usageCache": cache_file.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(path: &Path, force: bool) -> Result<()> {
    if !force && tokio::fs::try_exists(path).await? {
        anyhow::bail!(
            "{} already exists; use --force to overwrite",
            path.display()
        );
    }

    Config::default().save_to(path).await?;
    info!(path = %path.display(), "Default configuration written");
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
