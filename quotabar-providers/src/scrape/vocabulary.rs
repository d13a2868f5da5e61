//! Recognized vocabulary for the usage page.
//!
//! Everything the engine matches against lives here as data: headings,
//! label normalization, positional defaults, window sizes and the regex
//! lists for reset idioms, plan names and emails. Supporting a new locale
//! or a changed page layout means editing this file, not the parsers.
//!
//! Bump [`VOCABULARY_VERSION`] whenever a list changes so cached results
//! can be told apart in logs.

use regex::Regex;
use std::sync::LazyLock;

/// Version of the vocabulary tables below.
pub const VOCABULARY_VERSION: u32 = 3;

// ============================================================================
// Headings & Labels
// ============================================================================

/// Section headings, in English and Korean.
///
/// Matched case-insensitively against whole lines by the labeled parser,
/// and as substrings by the proximity parser.
pub const HEADINGS: &[&str] = &[
    "Current session",
    "All models",
    "Sonnet only",
    "Extra usage",
    "Weekly limit",
    "Weekly limits",
    "Daily limit",
    "Monthly limit",
    "Standard",
    "Advanced",
    "Sonnet만",
    "주간 한도",
    "일일 한도",
    "월간 한도",
];

/// Summary headings that group other sections and have no percentage.
pub const SUMMARY_HEADINGS: &[&str] = &["Weekly limits"];

/// Localized label to canonical English label.
pub const NORMALIZATION: &[(&str, &str)] = &[
    ("Sonnet만", "Sonnet only"),
    ("주간 한도", "Weekly limit"),
    ("일일 한도", "Daily limit"),
    ("월간 한도", "Monthly limit"),
];

/// Labels assigned by position when no heading precedes a percentage.
pub const DEFAULT_LABELS: &[&str] = &["Current Session", "All models", "Sonnet only", "Extra usage"];

// ============================================================================
// Windows
// ============================================================================

/// Lines scanned after a heading by the labeled parser.
pub const LABELED_WINDOW: usize = 8;

/// Maximum distinct percentages kept by the proximity parser.
///
/// Session, all models, model specific and extra usage.
pub const PROXIMITY_CAP: usize = 4;

/// Characters before a percentage searched for a label and reset text.
pub const BEFORE_WINDOW: usize = 150;

/// Characters after a percentage kept for reset lookahead.
pub const AFTER_WINDOW: usize = 50;

// ============================================================================
// Login Detection
// ============================================================================

/// URL fragments that mean the browser landed on an auth page.
pub const LOGIN_URL_MARKERS: &[&str] = &["/login", "/signup"];

/// Phrases that together mean an embedded login widget is showing.
pub const LOGIN_TEXT_MARKERS: &[&str] = &["Welcome back", "Continue with"];

// ============================================================================
// Plan Inference
// ============================================================================

/// Phrases only the Max plan's usage page shows.
pub const MAX_PLAN_MARKERS: &[&str] = &["Extra usage", "All models"];

/// Phrase only the Pro plan's usage page shows.
pub const PRO_PLAN_MARKER: &str = "Pro features";

// ============================================================================
// Regex Patterns
// ============================================================================

/// `45% used`, anywhere in a line.
pub static PERCENT_USED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)%\s*used").expect("Invalid regex"));

/// A line that is only `45%`.
pub static PERCENT_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)%$").expect("Invalid regex"));

/// Any `45%` in free text.
pub static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)%").expect("Invalid regex"));

/// Korean reset idioms: "… 후 재설정" (in …) and "… 에 재설정" (at …).
pub static KOREAN_RESET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\n]*(?:후|에) 재설정").expect("Invalid regex"));

/// English reset idiom: text starting with "Reset" or "Resets".
pub static ENGLISH_RESET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Resets?\b[^\n]*").expect("Invalid regex"));

/// Document-wide reset date patterns, tried in order.
pub static RESET_DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Resets in \d+\s*hr\s*\d+\s*min[^\n]*",
        r"(?i)Resets (?:Mon|Tue|Wed|Thu|Fri|Sat|Sun)[a-z]*\.?[^\n]*",
        r"(?i)resets\s*(?:on|in|:)?\s*(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\.?\s+\d{1,2}\b",
        r"(?i)\bin \d+ days?\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

/// Plan name patterns, tried in order. Group 1 is the plan.
pub static PLAN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bClaude (Max|Pro|Team|Enterprise|Free)\b",
        r"(?i)\b(Max|Pro|Team|Enterprise) Plan\b",
        r"(?i)\bPlan:\s*(Max|Pro|Team|Enterprise|Free)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

/// Email-shaped substring.
pub static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("Invalid regex")
});

// ============================================================================
// Lookups
// ============================================================================

/// Returns the heading a trimmed line equals, ignoring case.
pub fn match_heading(line: &str) -> Option<&'static str> {
    HEADINGS
        .iter()
        .copied()
        .find(|heading| heading.to_lowercase() == line.to_lowercase())
}

/// Returns true if `heading` is a summary heading.
pub fn is_summary_heading(heading: &str) -> bool {
    SUMMARY_HEADINGS
        .iter()
        .any(|summary| summary.eq_ignore_ascii_case(heading))
}

/// Maps a localized label to its canonical form; others pass through.
///
/// Matching ignores case, like heading detection, so a page heading kept
/// verbatim still normalizes.
pub fn canonical_label(label: &str) -> &str {
    NORMALIZATION
        .iter()
        .find(|(localized, _)| localized.to_lowercase() == label.to_lowercase())
        .map_or(label, |(_, canonical)| canonical)
}

/// Label for the `index`-th (0-based) unlabeled percentage.
pub fn default_label(index: usize) -> String {
    DEFAULT_LABELS
        .get(index)
        .map_or_else(|| format!("Usage {}", index + 1), |label| (*label).to_string())
}
