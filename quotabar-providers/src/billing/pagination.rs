//! Cursor pagination over report endpoints.
//!
//! Report endpoints return `{ data, has_more, next_page }`. Pages are
//! requested with the previous page's token until `has_more` is false.

use std::collections::HashSet;
use std::future::Future;

use quotabar_core::{CostBucket, CostReportPage, UsageBucket, UsageReportPage};
use quotabar_fetch::FetchError;
use tracing::{debug, warn};

/// Upper bound on pages followed for one report.
pub const MAX_PAGES: usize = 100;

/// A page of a cursor-paginated report.
pub trait Page {
    /// Item type in `data`.
    type Item;

    /// Splits the page into its items, `has_more` and `next_page`.
    fn into_parts(self) -> (Vec<Self::Item>, bool, Option<String>);
}

impl Page for CostReportPage {
    type Item = CostBucket;

    fn into_parts(self) -> (Vec<CostBucket>, bool, Option<String>) {
        (self.data, self.has_more, self.next_page)
    }
}

impl Page for UsageReportPage {
    type Item = UsageBucket;

    fn into_parts(self) -> (Vec<UsageBucket>, bool, Option<String>) {
        (self.data, self.has_more, self.next_page)
    }
}

/// Follows `next_page` tokens and concatenates every page's items.
///
/// `fetch_page` receives `None` for the first page and the previous
/// page's token afterwards.
///
/// # Errors
///
/// Propagates page errors. Returns `FetchError::InvalidResponse` when the
/// server claims more pages without a token, repeats a token, or exceeds
/// [`MAX_PAGES`].
pub async fn collect_pages<P, F, Fut>(mut fetch_page: F) -> Result<Vec<P::Item>, FetchError>
where
    P: Page,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<P, FetchError>>,
{
    let mut items = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut token = None;

    for page_number in 1..=MAX_PAGES {
        let (data, has_more, next_page) = fetch_page(token.take()).await?.into_parts();
        debug!(page = page_number, items = data.len(), has_more, "Report page received");
        items.extend(data);

        if !has_more {
            return Ok(items);
        }

        let Some(next) = next_page else {
            warn!(page = page_number, "Server reported more pages without a token");
            return Err(FetchError::InvalidResponse(
                "has_more is set but next_page is missing".to_string(),
            ));
        };
        if !seen_tokens.insert(next.clone()) {
            warn!(page = page_number, "Server repeated a page token");
            return Err(FetchError::InvalidResponse(format!(
                "page token repeated: {next}"
            )));
        }
        token = Some(next);
    }

    Err(FetchError::InvalidResponse(format!(
        "report exceeded {MAX_PAGES} pages"
    )))
}
