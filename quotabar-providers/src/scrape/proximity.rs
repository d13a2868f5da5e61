//! Proximity fallback parser.
//!
//! Used when no heading line is recognized. Every `N%` in the text becomes
//! a candidate; its label and reset text are inferred from the characters
//! just before it.

use std::collections::HashSet;

use quotabar_core::UsageEntry;
use tracing::{debug, trace};

use super::vocabulary::{
    default_label, AFTER_WINDOW, BEFORE_WINDOW, ENGLISH_RESET_RE, HEADINGS, KOREAN_RESET_RE,
    PERCENT_RE, PROXIMITY_CAP,
};

/// Parses entries from percentage occurrences in `text`.
///
/// Keeps at most [`PROXIMITY_CAP`] distinct in-range values, in order of
/// first occurrence. A repeated value is recorded once.
pub fn parse_proximity(text: &str) -> Vec<UsageEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for caps in PERCENT_RE.captures_iter(text) {
        if entries.len() >= PROXIMITY_CAP {
            break;
        }
        let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let value = match digits.as_str().parse::<u32>() {
            Ok(value) if value <= 100 => value,
            _ => {
                debug!(value = digits.as_str(), "Discarding out-of-range percentage");
                continue;
            }
        };
        if !seen.insert(value) {
            continue;
        }

        let before = window_before(text, whole.start());
        let after = window_after(text, whole.end());
        trace!(value, after, "Percentage lookahead");

        let label = nearest_heading(before)
            .map_or_else(|| default_label(entries.len()), str::to_string);
        let mut entry = UsageEntry::new(label).with_percentage(value);
        entry.reset_text = reset_text(before);

        trace!(label = %entry.label, value, "Proximity entry");
        entries.push(entry);
    }

    entries
}

/// Up to [`BEFORE_WINDOW`] characters ending at byte `end`.
fn window_before(text: &str, end: usize) -> &str {
    let head = &text[..end];
    let start = head
        .char_indices()
        .rev()
        .nth(BEFORE_WINDOW - 1)
        .map_or(0, |(i, _)| i);
    &head[start..]
}

/// Up to [`AFTER_WINDOW`] characters starting at byte `start`.
fn window_after(text: &str, start: usize) -> &str {
    let tail = &text[start..];
    let end = tail
        .char_indices()
        .nth(AFTER_WINDOW)
        .map_or(tail.len(), |(i, _)| i);
    &tail[..end]
}

/// The heading that occurs closest to the end of `before`.
///
/// When two headings end at the same position the longer one wins, so
/// "Weekly limits" beats "Weekly limit".
fn nearest_heading(before: &str) -> Option<&'static str> {
    HEADINGS
        .iter()
        .filter_map(|heading| before.rfind(heading).map(|pos| (pos, *heading)))
        .max_by_key(|(pos, heading)| (*pos, heading.len()))
        .map(|(_, heading)| heading)
}

/// Closest reset idiom in `before`, Korean before English.
fn reset_text(before: &str) -> Option<String> {
    KOREAN_RESET_RE
        .find_iter(before)
        .last()
        .or_else(|| ENGLISH_RESET_RE.find_iter(before).last())
        .map(|m| m.as_str().trim().to_string())
        .filter(|text| !text.is_empty())
}
