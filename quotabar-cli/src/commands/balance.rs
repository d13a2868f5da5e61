//! Balance command - prepaid credit balance.

use anyhow::Result;

use super::cost::billing_client;
use super::load_config;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Runs the balance command.
pub async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli).await?;
    let balance = billing_client(&config)?.fetch_credit_balance().await?;

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_balance(&balance));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format_balance(&balance)?);
        }
    }

    Ok(ExitCode::Success)
}
