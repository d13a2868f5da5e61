//! Parse command - run extraction on saved page text.

use anyhow::{Context, Result};
use clap::Args;
use quotabar_fetch::{FileRenderer, PageRenderer, RenderedPage};
use quotabar_providers::extract_usage;
use quotabar_store::config::DEFAULT_USAGE_URL;
use tokio::io::AsyncReadExt;
use tracing::debug;

use super::load_config;
use super::usage::{exit_code_for, print_usage};
use crate::{Cli, ExitCode};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// File holding the page text, or "-" for stdin.
    #[arg(default_value = "-")]
    pub input: String,

    /// URL the page was rendered from (login redirects are detected here).
    #[arg(long, default_value = DEFAULT_USAGE_URL)]
    pub url: String,
}

/// Runs the parse command.
pub async fn run(args: &ParseArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli).await?;
    let page = read_page(args).await?;

    debug!(len = page.text.len(), current_url = %page.current_url, "Parsing saved page");
    let result = extract_usage(&page.text, &page.current_url);

    print_usage(&result, None, false, &[], &config, cli)?;
    Ok(exit_code_for(&result))
}

async fn read_page(args: &ParseArgs) -> Result<RenderedPage> {
    if args.input == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read page text from stdin")?;
        return Ok(RenderedPage::new(text, args.url.as_str()));
    }

    let page = FileRenderer::new(&args.input)
        .render(&args.url)
        .await
        .with_context(|| format!("Failed to read {}", args.input))?;
    Ok(page)
}
