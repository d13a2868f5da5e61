//! Watch command - periodic usage refresh with threshold alerts.

use anyhow::Result;
use clap::Args;
use quotabar_store::config::MIN_REFRESH_INTERVAL_SECS;
use quotabar_store::AlertTracker;
use std::io::{stdout, Write};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use super::load_config;
use super::usage::{build_fetcher, print_usage, save_to_cache};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds (defaults to the configured interval).
    #[arg(long, short)]
    pub interval: Option<u64>,
}

/// Runs the watch command until interrupted.
pub async fn run(args: &WatchArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli).await?;
    let refresh_interval = args
        .interval
        .unwrap_or(config.general.refresh_interval_secs)
        .max(MIN_REFRESH_INTERVAL_SECS);

    let fetcher = build_fetcher(&config, &config.scrape.usage_url)?;
    let mut alerts = AlertTracker::from_config(&config.general);

    info!(interval = refresh_interval, "Starting watch mode");

    let mut ticker = interval(Duration::from_secs(refresh_interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Watch mode interrupted");
                return Ok(ExitCode::Success);
            }
        }

        let text = cli.format == OutputFormat::Text;
        if text {
            // Clear screen
            print!("\x1b[2J\x1b[H");
            stdout().flush()?;

            let now = chrono::Local::now();
            println!(
                "QuotaBar Watch Mode - {} (refresh: {}s)",
                now.format("%H:%M:%S"),
                refresh_interval
            );
            println!("{}", "─".repeat(50));
            println!();
        }

        match fetcher.fetch().await {
            Ok(Some(result)) => {
                let fired = if config.general.notifications {
                    alerts.check_all(&result)
                } else {
                    Vec::new()
                };
                let fetched_at = save_to_cache(&result).await;
                print_usage(&result, Some(fetched_at), false, &fired, &config, cli)?;
            }
            Ok(None) => {
                if text {
                    println!("Another fetch is in progress, waiting for the next refresh");
                }
            }
            Err(e) => {
                warn!(error = %e, transient = e.is_transient(), "Usage refresh failed");
                if text {
                    println!("Refresh failed: {e}");
                }
            }
        }

        if text {
            println!();
            println!("Press Ctrl+C to exit");
        }
    }
}
