//! Usage page extraction engine.
//!
//! Turns the visible text of a rendered usage page into an
//! [`ExtractionResult`]. The engine is a pure function of the text and the
//! page URL: no I/O, no shared mutable state.
//!
//! Extraction is a two-stage pipeline:
//!
//! 1. [`labeled`] - anchors on exact heading lines. If it finds anything,
//!    the second stage does not run.
//! 2. [`proximity`] - infers labels from the text around each `N%`.
//!
//! Entries from either stage go through the same [`normalize`] step, and
//! document-level [`metadata`] is extracted independently of both.

pub mod fetcher;
pub mod labeled;
pub mod metadata;
pub mod normalize;
pub mod proximity;
pub mod vocabulary;

pub use fetcher::UsagePageFetcher;

use quotabar_core::{ExtractionResult, ExtractionStrategy};
use tracing::{debug, info};

use self::labeled::{parse_labeled, split_lines};
use self::metadata::{extract_email, fallback_reset_date, infer_plan, is_login_page};
use self::normalize::normalize;
use self::proximity::parse_proximity;
use self::vocabulary::VOCABULARY_VERSION;

/// Extracts usage bars and metadata from rendered page text.
///
/// Never fails: a login page yields [`ExtractionResult::unauthenticated`],
/// and text with nothing recognizable yields an authenticated result with
/// no bars.
pub fn extract_usage(text: &str, current_url: &str) -> ExtractionResult {
    debug!(len = text.len(), current_url, vocabulary = VOCABULARY_VERSION, "Extracting usage");

    if is_login_page(text, current_url) {
        info!(current_url, "Usage page shows a login screen");
        return ExtractionResult::unauthenticated();
    }

    let labeled = parse_labeled(&split_lines(text));
    let (entries, strategy) = if labeled.is_empty() {
        debug!("No heading matched, falling back to proximity parsing");
        (parse_proximity(text), ExtractionStrategy::Proximity)
    } else {
        (labeled, ExtractionStrategy::Labeled)
    };

    let bars = normalize(entries);
    let result = ExtractionResult {
        strategy: (!bars.is_empty()).then_some(strategy),
        bars,
        is_authenticated: true,
        fallback_reset_date: fallback_reset_date(text),
        plan: infer_plan(text),
        email: extract_email(text),
    };

    debug!(
        bars = result.bars.len(),
        strategy = ?result.strategy,
        plan = ?result.plan,
        has_fallback_reset = result.fallback_reset_date.is_some(),
        "Extraction complete"
    );
    result
}
