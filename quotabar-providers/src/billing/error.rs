//! Billing-specific error types.

use quotabar_fetch::{FetchError, HttpError};
use thiserror::Error;

/// Errors from the billing API client.
#[derive(Debug, Error)]
pub enum BillingError {
    /// No admin API key in the environment.
    #[error("Admin API key not set (expected in ${0})")]
    MissingApiKey(String),

    /// The API key cannot be sent as a header.
    #[error("Admin API key contains invalid characters")]
    InvalidApiKey,

    /// The configured base URL is unusable.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// The requested report range is empty or reversed.
    #[error("Invalid report range: {0}")]
    InvalidRange(String),

    /// Request or response failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl From<HttpError> for BillingError {
    fn from(err: HttpError) -> Self {
        Self::Fetch(FetchError::Http(err))
    }
}

impl BillingError {
    /// Returns true if the key was missing or rejected.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey(_) | Self::InvalidApiKey | Self::Fetch(FetchError::AuthenticationFailed(_))
        )
    }
}
