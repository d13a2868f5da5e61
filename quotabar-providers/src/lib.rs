// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # QuotaBar Providers
//!
//! Data sources for the QuotaBar application.
//!
//! - [`scrape`] - Extraction engine for the rendered usage page, plus the
//!   fetcher that feeds it single-flight page text
//! - [`billing`] - Admin API client for cost reports, token usage reports
//!   and the credit balance
//!
//! ## Usage
//!
//! ```ignore
//! use quotabar_providers::extract_usage;
//!
//! let result = extract_usage(&page.text, &page.current_url);
//! for bar in &result.bars {
//!     println!("{}: {}%", bar.label, bar.percentage);
//! }
//! ```

pub mod billing;
pub mod scrape;

// Extraction
pub use scrape::{extract_usage, UsagePageFetcher};

// Billing
pub use billing::{BillingClient, BillingError, GroupBy};
