//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use quotabar_core::{CreditBalance, ExtractionResult};
use quotabar_store::Alert;
use serde::Serialize;
use std::collections::BTreeMap;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one usage read.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageOutput {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    pub bars: Vec<BarOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    pub cached: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<AlertOutput>,
}

/// A single usage bar.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarOutput {
    pub label: String,
    pub percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resets: Option<String>,
}

/// A threshold alert.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertOutput {
    pub label: String,
    pub level: String,
    pub percentage: u8,
}

/// Cost report output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostOutput {
    pub days: u32,
    pub group_by: String,
    pub total_cost_usd: f64,
    pub total_tokens: u64,
    pub groups: Vec<GroupCostOutput>,
}

/// Cost for one model or workspace.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCostOutput {
    pub name: String,
    pub cost_usd: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
}

/// Credit balance output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceOutput {
    pub balance: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats an extraction result.
    pub fn format_usage(
        &self,
        result: &ExtractionResult,
        fetched_at: Option<DateTime<Utc>>,
        cached: bool,
        alerts: &[Alert],
    ) -> Result<String> {
        self.format(&usage_to_output(result, fetched_at, cached, alerts))
    }

    /// Formats a cost breakdown.
    pub fn format_cost(
        &self,
        days: u32,
        group_by: &str,
        costs: &BTreeMap<String, f64>,
        tokens: &BTreeMap<String, u64>,
    ) -> Result<String> {
        let mut groups: Vec<GroupCostOutput> = costs
            .iter()
            .map(|(name, cost)| GroupCostOutput {
                name: name.clone(),
                cost_usd: *cost,
                tokens: tokens.get(name).copied(),
            })
            .collect();
        groups.sort_by(|a, b| b.cost_usd.total_cmp(&a.cost_usd));

        self.format(&CostOutput {
            days,
            group_by: group_by.to_string(),
            total_cost_usd: costs.values().sum(),
            total_tokens: tokens.values().sum(),
            groups,
        })
    }

    /// Formats the credit balance.
    pub fn format_balance(&self, balance: &CreditBalance) -> Result<String> {
        self.format(&BalanceOutput {
            balance: balance.balance,
            currency: balance.currency.clone(),
            updated_at: balance.updated_at,
        })
    }
}

/// Converts an extraction result to output.
fn usage_to_output(
    result: &ExtractionResult,
    fetched_at: Option<DateTime<Utc>>,
    cached: bool,
    alerts: &[Alert],
) -> UsageOutput {
    UsageOutput {
        authenticated: result.is_authenticated,
        plan: result.plan.clone(),
        email: result.email.clone(),
        strategy: result.strategy.map(|s| s.display_name().to_string()),
        bars: result
            .bars
            .iter()
            .map(|bar| BarOutput {
                label: bar.label.clone(),
                percentage: bar.percentage,
                resets: result.display_reset(bar).map(str::to_string),
            })
            .collect(),
        fetched_at,
        cached,
        alerts: alerts
            .iter()
            .map(|alert| AlertOutput {
                label: alert.label.clone(),
                level: alert.level.to_string(),
                percentage: alert.percentage,
            })
            .collect(),
    }
}
