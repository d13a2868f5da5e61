//! Domain models for QuotaBar.
//!
//! ## Submodules
//!
//! - [`usage`] - Usage types (UsageEntry, UsageBar, ExtractionResult)
//! - [`billing`] - Billing report records and aggregation helpers

mod billing;
mod usage;

pub use billing::{
    sum_cost_by_model, sum_cost_by_workspace, sum_tokens_by_model, sum_tokens_by_workspace,
    total_cost, CacheCreation, CostBucket, CostReportPage, CostResult, CreditBalance,
    UsageBucket, UsageReportPage, UsageResult,
};
pub use usage::{ExtractionResult, ExtractionStrategy, UsageBar, UsageEntry, BAR_LIMIT};
