// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! QuotaBar CLI - Claude plan usage and billing from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Render the usage page and show the bars
//! quotabar
//!
//! # Last cached result, no rendering
//! quotabar usage --cached
//!
//! # Extract from a saved page dump
//! quotabar parse usage.txt
//!
//! # JSON output
//! quotabar --format json --pretty
//!
//! # Cost report for the last week, by workspace
//! quotabar cost --days 7 --by workspace
//!
//! # Watch mode
//! quotabar watch --interval 60
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use quotabar_fetch::FetchError;
use quotabar_store::Config;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{balance, config, cost, parse, usage, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// QuotaBar CLI - Claude plan usage monitoring.
#[derive(Parser)]
#[command(name = "quotabar")]
#[command(about = "Claude plan usage and billing monitor")]
#[command(long_about = r#"
QuotaBar reads the Claude usage page and the Admin API.

The usage page is rendered by an external command configured as
scrape.render_command (see `quotabar config path`). Saved page text can
be read directly with `quotabar parse`.

Examples:
  quotabar                       # Current usage bars
  quotabar usage --cached        # Last cached result
  quotabar parse page.txt        # Extract from a saved page
  quotabar --format json         # JSON output
  quotabar cost --days 7         # Admin API cost report
"#)]
#[command(version)]
#[command(author = "QuotaBar Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'usage' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file to use instead of the default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch current usage (default if no command specified).
    #[command(visible_alias = "u")]
    Usage(usage::UsageArgs),

    /// Extract usage from saved page text.
    #[command(visible_alias = "p")]
    Parse(parse::ParseArgs),

    /// Show the Admin API cost report.
    #[command(visible_alias = "c")]
    Cost(cost::CostArgs),

    /// Show the prepaid credit balance.
    #[command(visible_alias = "b")]
    Balance,

    /// Refresh usage periodically and report threshold crossings.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// The usage page asked for a login.
    Unauthenticated = 2,
    /// Page acquisition timed out.
    Timeout = 4,
}

impl ExitCode {
    /// Exit code for a failed command.
    fn for_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<FetchError>() {
            Some(FetchError::Timeout(_)) => Self::Timeout,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Filter directive: `--verbose` wins, then the configured level.
fn log_directive(verbose: bool, configured: Option<&str>) -> String {
    if verbose {
        "quotabar=debug,info".to_string()
    } else {
        format!("quotabar={}", configured.unwrap_or("warn").to_lowercase())
    }
}

/// Configured log level, if the config file loads.
///
/// Load errors are left for the command itself to report.
async fn configured_log_level(cli: &Cli) -> Option<String> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    Config::load_from(&path)
        .await
        .ok()
        .map(|config| config.general.log_level)
}

fn setup_logging(verbose: bool, quiet: bool, configured: Option<&str>) {
    if quiet {
        return;
    }

    let filter = EnvFilter::try_new(log_directive(verbose, configured))
        .unwrap_or_else(|_| EnvFilter::new("quotabar=warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose || cli.quiet {
        None
    } else {
        configured_log_level(&cli).await
    };
    setup_logging(cli.verbose, cli.quiet, log_level.as_deref());

    let result = match &cli.command {
        Some(Commands::Usage(args)) => usage::run(args, &cli).await,
        Some(Commands::Parse(args)) => parse::run(args, &cli).await,
        Some(Commands::Cost(args)) => cost::run(args, &cli).await,
        Some(Commands::Balance) => balance::run(&cli).await,
        Some(Commands::Watch(args)) => watch::run(args, &cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        None => usage::run(&usage::UsageArgs::default(), &cli).await,
    };

    match result {
        Ok(ExitCode::Success) => Ok(()),
        Ok(code) => std::process::exit(code as i32),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e}");
            }
            std::process::exit(ExitCode::for_error(&e) as i32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "quotabar", "cost", "--days", "7", "--by", "workspace", "-f", "json", "--pretty",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.pretty);
        match cli.command {
            Some(Commands::Cost(args)) => {
                assert_eq!(args.days, 7);
                assert_eq!(args.by, cost::GroupArg::Workspace);
            }
            _ => panic!("expected cost command"),
        }
    }

    #[test]
    fn test_parse_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["quotabar", "parse"]).unwrap();
        match cli.command {
            Some(Commands::Parse(args)) => assert_eq!(args.input, "-"),
            _ => panic!("expected parse command"),
        }
    }

    #[test]
    fn test_log_directive() {
        assert_eq!(log_directive(false, None), "quotabar=warn");
        assert_eq!(log_directive(false, Some("DEBUG")), "quotabar=debug");
        assert_eq!(log_directive(true, Some("error")), "quotabar=debug,info");

        for level in quotabar_store::config::LOG_LEVELS {
            assert!(EnvFilter::try_new(log_directive(false, Some(*level))).is_ok());
        }
    }

    #[tokio::test]
    async fn test_configured_log_level_reaches_directive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, r#"{"general": {"log_level": "debug"}}"#)
            .await
            .unwrap();

        let cli = Cli::try_parse_from(["quotabar", "--config", path.to_str().unwrap()]).unwrap();
        let level = configured_log_level(&cli).await;
        assert_eq!(level.as_deref(), Some("debug"));
        assert_eq!(log_directive(cli.verbose, level.as_deref()), "quotabar=debug");
    }

    #[tokio::test]
    async fn test_unloadable_config_keeps_default_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let cli = Cli::try_parse_from(["quotabar", "--config", path.to_str().unwrap()]).unwrap();
        let level = configured_log_level(&cli).await;
        assert_eq!(level, None);
        assert_eq!(log_directive(false, level.as_deref()), "quotabar=warn");
    }

    #[test]
    fn test_timeout_exit_code() {
        let timeout = anyhow::Error::from(FetchError::Timeout(Duration::from_secs(30)));
        assert_eq!(ExitCode::for_error(&timeout) as i32, 4);

        let other = anyhow::anyhow!("boom");
        assert_eq!(ExitCode::for_error(&other) as i32, 1);
    }
}
