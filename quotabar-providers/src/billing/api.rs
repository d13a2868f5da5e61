//! Admin API client for cost, token usage and credit balance.
//!
//! # API Endpoints
//!
//! ```text
//! GET {base}/v1/organizations/cost_report?starting_at=..&ending_at=..&group_by[]=..&page=..
//! GET {base}/v1/organizations/usage_report/messages?starting_at=..&bucket_width=1d&page=..
//! GET {base}/v1/organizations/credit_balance
//! x-api-key: <admin key>
//! anthropic-version: 2023-06-01
//! ```
//!
//! Report endpoints are paginated; see [`collect_pages`].

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use quotabar_core::{CostBucket, CostReportPage, CreditBalance, UsageBucket, UsageReportPage};
use quotabar_fetch::{BackoffPolicy, FetchError, HttpClient, HttpError, ResponseExt};

use super::error::BillingError;
use super::pagination::collect_pages;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the Admin API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";

/// Environment variable holding the admin key by default.
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_ADMIN_KEY";

/// Cost report endpoint.
pub const COST_REPORT_ENDPOINT: &str = "/v1/organizations/cost_report";

/// Token usage report endpoint.
pub const USAGE_REPORT_ENDPOINT: &str = "/v1/organizations/usage_report/messages";

/// Credit balance endpoint.
pub const CREDIT_BALANCE_ENDPOINT: &str = "/v1/organizations/credit_balance";

/// API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Longest error body kept in messages.
const MAX_ERROR_BODY: usize = 200;

// ============================================================================
// Group By
// ============================================================================

/// Dimension to group report results by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    /// Group by model.
    #[default]
    Model,
    /// Group by workspace.
    Workspace,
}

impl GroupBy {
    /// `group_by[]` value for the cost report. Cost lines carry the model
    /// in their description grouping.
    pub fn cost_param(self) -> &'static str {
        match self {
            Self::Model => "description",
            Self::Workspace => "workspace_id",
        }
    }

    /// `group_by[]` value for the usage report.
    pub fn usage_param(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Workspace => "workspace_id",
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Admin API client.
#[derive(Debug, Clone)]
pub struct BillingClient {
    http: HttpClient,
    headers: HeaderMap,
    base_url: String,
    backoff: BackoffPolicy,
}

impl BillingClient {
    /// Creates a client for the default base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be sent as a header or the HTTP
    /// client cannot be built.
    pub fn new(api_key: &str) -> Result<Self, BillingError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|_| BillingError::InvalidApiKey)?,
        );
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let mut client = Self {
            http: HttpClient::new()?,
            headers,
            base_url: String::new(),
            backoff: BackoffPolicy::default(),
        };
        client.set_base_url(DEFAULT_API_BASE_URL)?;
        Ok(client)
    }

    /// Creates a client with the key read from environment variable `var`.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::MissingApiKey` if the variable is unset or empty.
    pub fn from_env(var: &str) -> Result<Self, BillingError> {
        let key = std::env::var(var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| BillingError::MissingApiKey(var.to_string()))?;
        Self::new(key.trim())
    }

    /// Points the client at another base URL. Requests are restricted to
    /// that URL's host.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvalidBaseUrl` if the URL has no host.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, BillingError> {
        self.set_base_url(base_url)?;
        Ok(self)
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// The base URL requests go to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn set_base_url(&mut self, base_url: &str) -> Result<(), BillingError> {
        let parsed = Url::parse(base_url).map_err(|e| BillingError::InvalidBaseUrl(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| BillingError::InvalidBaseUrl(format!("no host in {base_url}")))?;

        self.http = self.http.clone().with_allowed_domains(vec![host.to_string()]);
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(())
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// Fetches every cost bucket in `[starting_at, ending_at)`.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty range, a rejected key, exhausted
    /// retries, or a malformed or looping response.
    #[instrument(skip(self))]
    pub async fn fetch_cost_report(
        &self,
        starting_at: DateTime<Utc>,
        ending_at: DateTime<Utc>,
        group_by: GroupBy,
    ) -> Result<Vec<CostBucket>, BillingError> {
        check_range(starting_at, ending_at)?;
        let mut query = range_query(starting_at, ending_at);
        query.push(("group_by[]".to_string(), group_by.cost_param().to_string()));

        let buckets = collect_pages(|token| {
            let query = with_page(&query, token);
            async move { self.get_json::<CostReportPage>(COST_REPORT_ENDPOINT, &query).await }
        })
        .await?;

        debug!(buckets = buckets.len(), "Cost report fetched");
        Ok(buckets)
    }

    /// Fetches daily token usage buckets in `[starting_at, ending_at)`.
    ///
    /// # Errors
    ///
    /// Same as [`fetch_cost_report`](Self::fetch_cost_report).
    #[instrument(skip(self))]
    pub async fn fetch_usage_report(
        &self,
        starting_at: DateTime<Utc>,
        ending_at: DateTime<Utc>,
        group_by: GroupBy,
    ) -> Result<Vec<UsageBucket>, BillingError> {
        check_range(starting_at, ending_at)?;
        let mut query = range_query(starting_at, ending_at);
        query.push(("bucket_width".to_string(), "1d".to_string()));
        query.push(("group_by[]".to_string(), group_by.usage_param().to_string()));

        let buckets = collect_pages(|token| {
            let query = with_page(&query, token);
            async move { self.get_json::<UsageReportPage>(USAGE_REPORT_ENDPOINT, &query).await }
        })
        .await?;

        debug!(buckets = buckets.len(), "Usage report fetched");
        Ok(buckets)
    }

    /// Fetches the prepaid credit balance.
    ///
    /// # Errors
    ///
    /// Returns an error for a rejected key, exhausted retries or a
    /// malformed response.
    #[instrument(skip(self))]
    pub async fn fetch_credit_balance(&self) -> Result<CreditBalance, BillingError> {
        let balance: CreditBalance = self.get_json(CREDIT_BALANCE_ENDPOINT, &[]).await?;
        debug!(balance = balance.balance, currency = %balance.currency, "Credit balance fetched");
        Ok(balance)
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// GETs `endpoint` and decodes JSON, retrying per the backoff policy.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let response = match self.http.get(&url, self.headers.clone(), query).await {
                Ok(response) => response,
                Err(HttpError::Request(e))
                    if BackoffPolicy::is_retryable_error(&e) && self.backoff.can_retry(attempt) =>
                {
                    let delay = self.backoff.delay_for(attempt);
                    warn!(attempt, error = %e, ?delay, "Request failed, retrying");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();
            if status.is_success() {
                let body = response.text().await.map_err(HttpError::from)?;
                debug!(len = body.len(), "Response body received");
                return serde_json::from_str(&body).map_err(|e| {
                    warn!(error = %e, "Failed to parse API response");
                    FetchError::InvalidResponse(format!("Invalid JSON: {e}"))
                });
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(FetchError::AuthenticationFailed(format!(
                    "admin key rejected ({status})"
                )));
            }

            if BackoffPolicy::is_retryable_status(status) {
                let retry_after = response.retry_after_secs();
                if self.backoff.can_retry(attempt) {
                    let delay = self.backoff.delay_with_hint(attempt, retry_after);
                    warn!(attempt, %status, ?delay, "Retryable status, backing off");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                if response.is_rate_limited() {
                    return Err(FetchError::RateLimited { retry_after });
                }
            }

            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::InvalidResponse(format!(
                "HTTP {status}: {}",
                truncate(&body, MAX_ERROR_BODY)
            )));
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn check_range(starting_at: DateTime<Utc>, ending_at: DateTime<Utc>) -> Result<(), BillingError> {
    if starting_at >= ending_at {
        return Err(BillingError::InvalidRange(format!(
            "{starting_at} is not before {ending_at}"
        )));
    }
    Ok(())
}

fn range_query(starting_at: DateTime<Utc>, ending_at: DateTime<Utc>) -> Vec<(String, String)> {
    vec![
        (
            "starting_at".to_string(),
            starting_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (
            "ending_at".to_string(),
            ending_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
    ]
}

fn with_page(query: &[(String, String)], token: Option<String>) -> Vec<(String, String)> {
    let mut query = query.to_vec();
    if let Some(token) = token {
        query.push(("page".to_string(), token));
    }
    query
}

fn truncate(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(i, _)| &text[..i])
}

/// Default report window: the last `days` days up to now.
pub fn last_days(days: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let ending_at = Utc::now();
    let starting_at = ending_at - chrono::Duration::days(i64::from(days.max(1)));
    (starting_at, ending_at)
}
