// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `QuotaBar` Core
//!
//! Core types and models for the `QuotaBar` application.
//!
//! This crate provides the foundational data types used across all other
//! `QuotaBar` crates:
//!
//! - Usage models produced by the page extraction engine
//! - Billing records returned by the cost and usage report API
//! - Pure aggregation helpers over billing records
//! - Error types
//!
//! ## Key Types
//!
//! ### Usage Types
//! - [`UsageEntry`] - Raw candidate entry found in page text
//! - [`UsageBar`] - Normalized usage bar (label, percentage, reset context)
//! - [`ExtractionResult`] - Everything extracted from one page read
//! - [`ExtractionStrategy`] - Which parsing stage produced the bars
//!
//! ### Billing Types
//! - [`CostReportPage`] / [`CostBucket`] / [`CostResult`] - Cost report records
//! - [`UsageReportPage`] / [`UsageBucket`] / [`UsageResult`] - Token usage records
//! - [`CreditBalance`] - Prepaid credit balance

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Usage types
    ExtractionResult,
    ExtractionStrategy,
    UsageBar,
    UsageEntry,
    BAR_LIMIT,
    // Billing types
    CacheCreation,
    CostBucket,
    CostReportPage,
    CostResult,
    CreditBalance,
    UsageBucket,
    UsageReportPage,
    UsageResult,
    // Aggregation
    sum_cost_by_model,
    sum_cost_by_workspace,
    sum_tokens_by_model,
    sum_tokens_by_workspace,
    total_cost,
};
