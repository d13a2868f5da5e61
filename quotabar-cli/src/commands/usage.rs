//! Usage command - render the usage page and display its bars.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use quotabar_core::ExtractionResult;
use quotabar_fetch::{CommandRenderer, SingleFlight};
use quotabar_providers::UsagePageFetcher;
use quotabar_store::{default_cache_path, Alert, CachedUsage, Config};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::load_config;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the usage command.
#[derive(Args, Default)]
pub struct UsageArgs {
    /// Show the last cached result instead of rendering the page.
    #[arg(long)]
    pub cached: bool,

    /// Usage page URL (overrides the configured one).
    #[arg(long)]
    pub url: Option<String>,
}

/// Runs the usage command.
pub async fn run(args: &UsageArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli).await?;

    if args.cached {
        let cached = CachedUsage::load(&default_cache_path())
            .await?
            .context("No cached usage yet; run `quotabar usage` first")?;
        debug!(age_secs = cached.age(Utc::now()).num_seconds(), "Using cached usage");
        print_usage(&cached.result, Some(cached.fetched_at), true, &[], &config, cli)?;
        return Ok(exit_code_for(&cached.result));
    }

    let url = args.url.as_deref().unwrap_or(&config.scrape.usage_url);
    let fetcher = build_fetcher(&config, url)?;

    let Some(result) = fetcher.fetch().await? else {
        if !cli.quiet {
            println!("Another fetch is in progress, try again shortly");
        }
        return Ok(ExitCode::Success);
    };

    let fetched_at = save_to_cache(&result).await;
    print_usage(&result, Some(fetched_at), false, &[], &config, cli)?;
    Ok(exit_code_for(&result))
}

/// Builds a fetcher backed by the configured render command.
pub fn build_fetcher(config: &Config, url: &str) -> Result<UsagePageFetcher> {
    let command = config.scrape.render_command.as_deref().context(
        "No render command configured; set scrape.render_command (see `quotabar config path`) \
         or use `quotabar parse` on saved page text",
    )?;

    let renderer = CommandRenderer::from_command_line(command, config.render_timeout())?;
    if !renderer.is_available() {
        warn!(program = %command[0], "Render command not found in PATH");
    }

    let flight = SingleFlight::new(renderer).with_timeout(config.render_timeout());
    info!(url, "Fetching usage page");
    Ok(UsagePageFetcher::new(Arc::new(flight), url))
}

/// Caches an authenticated result and returns its fetch time.
///
/// Cache failures are logged, not fatal.
pub async fn save_to_cache(result: &ExtractionResult) -> DateTime<Utc> {
    let cached = CachedUsage::new(result.clone());
    if result.is_authenticated {
        if let Err(e) = cached.save(&default_cache_path()).await {
            warn!(error = %e, "Failed to cache usage");
        }
    }
    cached.fetched_at
}

/// Prints a result in the selected output format.
pub fn print_usage(
    result: &ExtractionResult,
    fetched_at: Option<DateTime<Utc>>,
    cached: bool,
    alerts: &[Alert],
    config: &Config,
    cli: &Cli,
) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color).with_thresholds(
                config.general.warning_threshold,
                config.general.critical_threshold,
            );
            println!("{}", formatter.format_usage(result, fetched_at));
            for alert in alerts {
                println!("{}", formatter.format_alert(alert));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_usage(result, fetched_at, cached, alerts)?);
        }
    }
    Ok(())
}

/// Exit code for a result: a login page is reported distinctly.
pub fn exit_code_for(result: &ExtractionResult) -> ExitCode {
    if result.is_authenticated {
        ExitCode::Success
    } else {
        ExitCode::Unauthenticated
    }
}
