//! Labeled-section parser.
//!
//! Anchors on lines that equal a known heading and reads the reset text and
//! percentage from the lines that follow it.

use quotabar_core::UsageEntry;
use tracing::{debug, trace};

use super::vocabulary::{
    is_summary_heading, match_heading, LABELED_WINDOW, PERCENT_ONLY_RE, PERCENT_USED_RE,
};

/// Splits page text into trimmed, non-empty lines in document order.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Parses entries anchored on heading lines.
///
/// `lines` must already be trimmed and non-empty (see [`split_lines`]).
/// Entries come out in heading order; a heading with neither a percentage
/// nor a reset line in its window produces nothing.
pub fn parse_labeled(lines: &[&str]) -> Vec<UsageEntry> {
    let mut entries = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(heading) = match_heading(line) else {
            continue;
        };
        if is_summary_heading(heading) {
            trace!(heading, "Skipping summary heading");
            continue;
        }

        let mut entry = UsageEntry::new(*line);
        let window = lines.iter().skip(i + 1).take(LABELED_WINDOW);

        for candidate in window {
            if entry.reset_text.is_none() && starts_with_reset(candidate) {
                entry.reset_text = Some((*candidate).to_string());
                continue;
            }
            if let Some(digits) = percent_digits(candidate) {
                entry.percentage = digits.parse().ok();
                if entry.percentage.is_none() {
                    debug!(heading, line = candidate, "Percentage does not fit, ignoring value");
                }
                break;
            }
        }

        if entry.has_content() {
            trace!(heading, percentage = ?entry.percentage, "Labeled entry");
            entries.push(entry);
        } else {
            debug!(heading, "Heading without percentage or reset text");
        }
    }

    entries
}

fn starts_with_reset(line: &str) -> bool {
    line.get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("reset"))
}

/// Returns the digits of a `N% used` or bare `N%` line.
fn percent_digits(line: &str) -> Option<&str> {
    PERCENT_USED_RE
        .captures(line)
        .or_else(|| PERCENT_ONLY_RE.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
