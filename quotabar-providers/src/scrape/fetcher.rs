//! Usage page fetcher.
//!
//! Ties single-flight page acquisition to the extraction engine. The engine
//! only ever sees complete page text: a busy target, a timeout or a render
//! failure never reaches [`extract_usage`].
//!
//! # Example
//!
//! ```ignore
//! let flight = Arc::new(SingleFlight::new(renderer));
//! let fetcher = UsagePageFetcher::new(flight, "https://claude.ai/settings/usage");
//!
//! match fetcher.fetch().await? {
//!     Some(result) => println!("{} bars", result.bars.len()),
//!     None => println!("another fetch is in progress"),
//! }
//! ```

use std::sync::Arc;

use quotabar_core::ExtractionResult;
use quotabar_fetch::{FetchError, SingleFlight, Target};
use tracing::{debug, info, instrument};

use super::extract_usage;

/// Fetches and extracts the usage page.
#[derive(Debug, Clone)]
pub struct UsagePageFetcher {
    flight: Arc<SingleFlight>,
    url: String,
}

impl UsagePageFetcher {
    /// Creates a fetcher for `url` sharing `flight` with other callers.
    pub fn new(flight: Arc<SingleFlight>, url: impl Into<String>) -> Self {
        Self {
            flight,
            url: url.into(),
        }
    }

    /// The usage page URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns true if a usage page acquisition is running.
    pub fn is_busy(&self) -> bool {
        self.flight.is_busy(Target::Usage)
    }

    /// Acquires the usage page and extracts it.
    ///
    /// Returns `Ok(None)` when another acquisition of the usage page is
    /// still running; the caller should try again later.
    ///
    /// # Errors
    ///
    /// Returns an error on acquisition timeout or render failure.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<Option<ExtractionResult>, FetchError> {
        let Some(page) = self.flight.acquire_or_none(Target::Usage, &self.url).await? else {
            info!("Usage page acquisition in flight, skipping");
            return Ok(None);
        };

        debug!(len = page.text.len(), current_url = %page.current_url, "Usage page acquired");
        Ok(Some(extract_usage(&page.text, &page.current_url)))
    }
}
