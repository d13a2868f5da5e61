//! Document-level metadata: login detection, fallback reset date, plan and
//! email. None of these depend on which parser produced the bars.

use super::vocabulary::{
    EMAIL_RE, LOGIN_TEXT_MARKERS, LOGIN_URL_MARKERS, MAX_PLAN_MARKERS, PLAN_PATTERNS,
    PRO_PLAN_MARKER, RESET_DATE_PATTERNS,
};

/// Returns true if the page is a login or signup page.
pub fn is_login_page(text: &str, current_url: &str) -> bool {
    LOGIN_URL_MARKERS
        .iter()
        .any(|marker| current_url.contains(marker))
        || LOGIN_TEXT_MARKERS.iter().all(|marker| text.contains(marker))
}

/// First document-wide reset description, trying each pattern in order.
pub fn fallback_reset_date(text: &str) -> Option<String> {
    RESET_DATE_PATTERNS
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().trim().to_string())
}

/// Infers the plan name.
///
/// Explicit mentions win. Otherwise the layout decides: Max-only sections
/// mean "Max", the Pro features blurb means "Pro".
pub fn infer_plan(text: &str) -> Option<String> {
    if let Some(plan) = PLAN_PATTERNS
        .iter()
        .find_map(|re| re.captures(text).and_then(|caps| caps.get(1)))
    {
        return Some(capitalize(plan.as_str()));
    }

    if MAX_PLAN_MARKERS.iter().any(|marker| text.contains(marker)) {
        Some("Max".to_string())
    } else if text.contains(PRO_PLAN_MARKER) {
        Some("Pro".to_string())
    } else {
        None
    }
}

/// First email-shaped substring.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
