//! Billing report types.
//!
//! This module contains the records returned by the billing REST API:
//! - [`CostReportPage`] / [`CostBucket`] / [`CostResult`] - Cost reports
//! - [`UsageReportPage`] / [`UsageBucket`] / [`UsageResult`] - Token usage reports
//! - [`CreditBalance`] - Prepaid credit balance
//!
//! Plus pure aggregation helpers over time-bucketed records. Every helper
//! accepts an empty slice and returns an empty map (or zero).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Group key for results that carry no model.
const UNKNOWN_MODEL: &str = "unknown";

/// Group key for results that carry no workspace (the default workspace).
const DEFAULT_WORKSPACE: &str = "default";

// ============================================================================
// Cost Report
// ============================================================================

/// One page of the cost report endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostReportPage {
    /// Time buckets in this page.
    #[serde(default)]
    pub data: Vec<CostBucket>,
    /// Whether another page follows.
    #[serde(default)]
    pub has_more: bool,
    /// Opaque token for the next page.
    #[serde(default)]
    pub next_page: Option<String>,
}

/// A time bucket of cost results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBucket {
    /// Bucket start (inclusive).
    pub starting_at: DateTime<Utc>,
    /// Bucket end (exclusive).
    pub ending_at: DateTime<Utc>,
    /// Cost lines in this bucket.
    #[serde(default)]
    pub results: Vec<CostResult>,
}

/// A single cost line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostResult {
    /// Amount as a decimal string, in cents.
    pub amount: String,
    /// Currency code (e.g. "USD").
    #[serde(default)]
    pub currency: Option<String>,
    /// Model name, when grouped by description.
    #[serde(default)]
    pub model: Option<String>,
    /// Workspace ID. `None` is the default workspace.
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// Free-form description of the line.
    #[serde(default)]
    pub description: Option<String>,
    /// Cost type (tokens, web_search, code_execution).
    #[serde(default)]
    pub cost_type: Option<String>,
    /// Token type (uncached_input_tokens, output_tokens, ...).
    #[serde(default)]
    pub token_type: Option<String>,
    /// Service tier (standard, batch, priority).
    #[serde(default)]
    pub service_tier: Option<String>,
}

impl CostResult {
    /// Parses the amount string. Malformed amounts count as zero.
    pub fn amount_value(&self) -> f64 {
        self.amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    /// Returns the amount in dollars.
    pub fn amount_usd(&self) -> f64 {
        self.amount_value() / 100.0
    }
}

// ============================================================================
// Usage Report
// ============================================================================

/// One page of the messages usage report endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageReportPage {
    /// Time buckets in this page.
    #[serde(default)]
    pub data: Vec<UsageBucket>,
    /// Whether another page follows.
    #[serde(default)]
    pub has_more: bool,
    /// Opaque token for the next page.
    #[serde(default)]
    pub next_page: Option<String>,
}

/// A time bucket of token usage results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageBucket {
    /// Bucket start (inclusive).
    pub starting_at: DateTime<Utc>,
    /// Bucket end (exclusive).
    pub ending_at: DateTime<Utc>,
    /// Usage lines in this bucket.
    #[serde(default)]
    pub results: Vec<UsageResult>,
}

/// Cache creation token counts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CacheCreation {
    /// Tokens written to the 1 hour cache.
    #[serde(default)]
    pub ephemeral_1h_input_tokens: u64,
    /// Tokens written to the 5 minute cache.
    #[serde(default)]
    pub ephemeral_5m_input_tokens: u64,
}

impl CacheCreation {
    /// Total cache creation tokens.
    pub fn total(&self) -> u64 {
        self.ephemeral_1h_input_tokens + self.ephemeral_5m_input_tokens
    }
}

/// A single token usage line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageResult {
    /// Input tokens not read from cache.
    #[serde(default)]
    pub uncached_input_tokens: u64,
    /// Input tokens read from cache.
    #[serde(default)]
    pub cache_read_input_tokens: u64,
    /// Cache creation breakdown.
    #[serde(default)]
    pub cache_creation: CacheCreation,
    /// Output tokens.
    #[serde(default)]
    pub output_tokens: u64,
    /// Model name, when grouped by model.
    #[serde(default)]
    pub model: Option<String>,
    /// Workspace ID. `None` is the default workspace.
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// API key ID, when grouped by key.
    #[serde(default)]
    pub api_key_id: Option<String>,
    /// Service tier.
    #[serde(default)]
    pub service_tier: Option<String>,
}

impl UsageResult {
    /// Total tokens across input, cache and output.
    pub fn total_tokens(&self) -> u64 {
        self.uncached_input_tokens
            + self.cache_read_input_tokens
            + self.cache_creation.total()
            + self.output_tokens
    }
}

// ============================================================================
// Credit Balance
// ============================================================================

/// Prepaid credit balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditBalance {
    /// Remaining balance in dollars.
    #[serde(alias = "remaining", alias = "amount")]
    pub balance: f64,
    /// Currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// When the balance was last computed by the server.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    "USD".to_string()
}

// ============================================================================
// Aggregation
// ============================================================================

/// Sums cost (dollars) per model across all buckets.
pub fn sum_cost_by_model(buckets: &[CostBucket]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for result in buckets.iter().flat_map(|b| &b.results) {
        let key = result.model.as_deref().unwrap_or(UNKNOWN_MODEL);
        *totals.entry(key.to_string()).or_insert(0.0) += result.amount_usd();
    }
    totals
}

/// Sums cost (dollars) per workspace across all buckets.
pub fn sum_cost_by_workspace(buckets: &[CostBucket]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for result in buckets.iter().flat_map(|b| &b.results) {
        let key = result.workspace_id.as_deref().unwrap_or(DEFAULT_WORKSPACE);
        *totals.entry(key.to_string()).or_insert(0.0) += result.amount_usd();
    }
    totals
}

/// Sums total tokens per model across all buckets.
pub fn sum_tokens_by_model(buckets: &[UsageBucket]) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for result in buckets.iter().flat_map(|b| &b.results) {
        let key = result.model.as_deref().unwrap_or(UNKNOWN_MODEL);
        *totals.entry(key.to_string()).or_insert(0) += result.total_tokens();
    }
    totals
}

/// Sums total tokens per workspace across all buckets.
pub fn sum_tokens_by_workspace(buckets: &[UsageBucket]) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for result in buckets.iter().flat_map(|b| &b.results) {
        let key = result.workspace_id.as_deref().unwrap_or(DEFAULT_WORKSPACE);
        *totals.entry(key.to_string()).or_insert(0) += result.total_tokens();
    }
    totals
}

/// Total cost (dollars) across all buckets.
pub fn total_cost(buckets: &[CostBucket]) -> f64 {
    buckets
        .iter()
        .flat_map(|b| &b.results)
        .map(CostResult::amount_usd)
        .sum()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cost(amount: &str, model: Option<&str>, workspace: Option<&str>) -> CostResult {
        CostResult {
            amount: amount.to_string(),
            currency: Some("USD".to_string()),
            model: model.map(str::to_string),
            workspace_id: workspace.map(str::to_string),
            ..CostResult::default()
        }
    }

    fn bucket(day: u32, results: Vec<CostResult>) -> CostBucket {
        CostBucket {
            starting_at: Utc.with_ymd_and_hms(2025, 3, day, 0, 0, 0).unwrap(),
            ending_at: Utc.with_ymd_and_hms(2025, 3, day + 1, 0, 0, 0).unwrap(),
            results,
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(sum_cost_by_model(&[]).is_empty());
        assert!(sum_cost_by_workspace(&[]).is_empty());
        assert!(sum_tokens_by_model(&[]).is_empty());
        assert!(sum_tokens_by_workspace(&[]).is_empty());
        assert_eq!(total_cost(&[]), 0.0);
    }

    #[test]
    fn test_sum_cost_by_model() {
        let buckets = vec![
            bucket(1, vec![
                cost("150", Some("claude-sonnet-4"), None),
                cost("50", Some("claude-opus-4"), Some("wrk_1")),
            ]),
            bucket(2, vec![
                cost("250", Some("claude-sonnet-4"), Some("wrk_1")),
                cost("10", None, None),
            ]),
        ];

        let by_model = sum_cost_by_model(&buckets);
        assert!((by_model["claude-sonnet-4"] - 4.0).abs() < 1e-9);
        assert!((by_model["claude-opus-4"] - 0.5).abs() < 1e-9);
        assert!((by_model["unknown"] - 0.1).abs() < 1e-9);

        let by_workspace = sum_cost_by_workspace(&buckets);
        assert!((by_workspace["default"] - 1.6).abs() < 1e-9);
        assert!((by_workspace["wrk_1"] - 3.0).abs() < 1e-9);

        assert!((total_cost(&buckets) - 4.6).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_amount_counts_as_zero() {
        assert_eq!(cost("abc", None, None).amount_value(), 0.0);
        assert_eq!(cost("NaN", None, None).amount_value(), 0.0);
        assert_eq!(cost(" 12.5 ", None, None).amount_value(), 12.5);
    }

    #[test]
    fn test_sum_tokens_by_model() {
        let buckets = vec![UsageBucket {
            starting_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            ending_at: Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap(),
            results: vec![
                UsageResult {
                    uncached_input_tokens: 100,
                    cache_read_input_tokens: 20,
                    cache_creation: CacheCreation {
                        ephemeral_1h_input_tokens: 5,
                        ephemeral_5m_input_tokens: 5,
                    },
                    output_tokens: 70,
                    model: Some("claude-sonnet-4".to_string()),
                    ..UsageResult::default()
                },
                UsageResult {
                    output_tokens: 30,
                    model: Some("claude-sonnet-4".to_string()),
                    ..UsageResult::default()
                },
            ],
        }];

        let totals = sum_tokens_by_model(&buckets);
        assert_eq!(totals["claude-sonnet-4"], 230);

        let totals = sum_tokens_by_workspace(&buckets);
        assert_eq!(totals["default"], 230);
    }
}
