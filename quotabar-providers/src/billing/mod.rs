//! Billing REST client.
//!
//! Polls the Admin API for cost and token usage reports and the prepaid
//! credit balance. Aggregation over the returned buckets lives in
//! `quotabar_core` as pure reduces.

pub mod api;
pub mod error;
pub mod pagination;

pub use api::{last_days, BillingClient, GroupBy, DEFAULT_API_BASE_URL, DEFAULT_API_KEY_ENV};
pub use error::BillingError;
pub use pagination::{collect_pages, Page, MAX_PAGES};
