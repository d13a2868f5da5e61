//! Cost command - Admin API cost and token report.

use anyhow::Result;
use clap::{Args, ValueEnum};
use quotabar_core::{
    sum_cost_by_model, sum_cost_by_workspace, sum_tokens_by_model, sum_tokens_by_workspace,
};
use quotabar_providers::billing::last_days;
use quotabar_providers::{BillingClient, GroupBy};
use quotabar_store::Config;
use tracing::info;

use super::load_config;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Grouping for the cost report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum GroupArg {
    /// One line per model.
    #[default]
    Model,
    /// One line per workspace.
    Workspace,
}

impl GroupArg {
    fn group_by(self) -> GroupBy {
        match self {
            Self::Model => GroupBy::Model,
            Self::Workspace => GroupBy::Workspace,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Workspace => "workspace",
        }
    }
}

/// Arguments for the cost command.
#[derive(Args)]
pub struct CostArgs {
    /// Number of days to report, ending now.
    #[arg(long, short, default_value = "30")]
    pub days: u32,

    /// Group costs by model or workspace.
    #[arg(long, default_value = "model")]
    pub by: GroupArg,
}

/// Creates a billing client from the configured key variable and base URL.
pub fn billing_client(config: &Config) -> Result<BillingClient> {
    let client = BillingClient::from_env(&config.billing.api_key_env)?
        .with_base_url(&config.billing.api_base_url)?;
    Ok(client)
}

/// Runs the cost command.
pub async fn run(args: &CostArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli).await?;
    let client = billing_client(&config)?;

    let (start, end) = last_days(args.days);
    let group_by = args.by.group_by();
    info!(days = args.days, group_by = args.by.label(), "Fetching cost report");

    let (costs, usage) = futures::try_join!(
        client.fetch_cost_report(start, end, group_by),
        client.fetch_usage_report(start, end, group_by),
    )?;

    let (cost_totals, token_totals) = match args.by {
        GroupArg::Model => (sum_cost_by_model(&costs), sum_tokens_by_model(&usage)),
        GroupArg::Workspace => (sum_cost_by_workspace(&costs), sum_tokens_by_workspace(&usage)),
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_cost(args.days, args.by.label(), &cost_totals, &token_totals)
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!(
                "{}",
                formatter.format_cost(args.days, args.by.label(), &cost_totals, &token_totals)?
            );
        }
    }

    Ok(ExitCode::Success)
}
