//! Turns raw entries from either parser into usage bars.

use std::collections::HashSet;

use quotabar_core::{UsageBar, UsageEntry};
use tracing::debug;

use super::vocabulary::canonical_label;

/// Normalizes parser output.
///
/// - localized labels are mapped to their canonical form;
/// - entries without a percentage, or with one outside [0, 100], are dropped;
/// - only the first bar per canonical label (ignoring case) is kept.
///
/// Order is preserved.
pub fn normalize(entries: Vec<UsageEntry>) -> Vec<UsageBar> {
    let mut seen = HashSet::new();
    let mut bars = Vec::with_capacity(entries.len());

    for mut entry in entries {
        entry.label = canonical_label(&entry.label).to_string();
        if !entry.has_valid_percentage() {
            debug!(label = %entry.label, percentage = ?entry.percentage, "Dropping entry without a valid percentage");
            continue;
        }
        if !seen.insert(entry.label.to_lowercase()) {
            debug!(label = %entry.label, "Dropping duplicate label");
            continue;
        }
        bars.extend(UsageBar::from_entry(entry));
    }

    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_korean_labels_are_canonicalized() {
        let bars = normalize(vec![
            UsageEntry::new("Sonnet만").with_percentage(65),
            UsageEntry::new("주간 한도").with_percentage(10),
        ]);
        assert_eq!(bars[0].label, "Sonnet only");
        assert_eq!(bars[0].percentage, 65);
        assert_eq!(bars[1].label, "Weekly limit");
    }

    #[test]
    fn test_reset_text_becomes_context() {
        let bars = normalize(vec![UsageEntry::new("All models")
            .with_percentage(80)
            .with_reset_text("Resets Sat 4:00 PM")]);
        assert_eq!(bars[0].context.as_deref(), Some("Resets Sat 4:00 PM"));
        assert!((bars[0].used - 80.0).abs() < f64::EPSILON);
        assert!((bars[0].limit - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_entries_without_valid_percentage_are_dropped() {
        let bars = normalize(vec![
            UsageEntry::new("Daily limit").with_reset_text("Resets tomorrow"),
            UsageEntry::new("Current session").with_percentage(101),
            UsageEntry::new("All models").with_percentage(100),
        ]);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].label, "All models");
    }

    #[test]
    fn test_duplicates_keep_first() {
        let bars = normalize(vec![
            UsageEntry::new("Sonnet only").with_percentage(30),
            UsageEntry::new("Sonnet만").with_percentage(65),
            UsageEntry::new("SONNET ONLY").with_percentage(70),
        ]);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].percentage, 30);
    }

    #[test]
    fn test_invalid_entry_does_not_claim_label() {
        let bars = normalize(vec![
            UsageEntry::new("Current session").with_percentage(150),
            UsageEntry::new("Current session").with_percentage(45),
        ]);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].percentage, 45);
    }

    #[test]
    fn test_zero_is_a_valid_percentage() {
        let bars = normalize(vec![UsageEntry::new("Extra usage").with_percentage(0)]);
        assert_eq!(bars[0].percentage, 0);
    }
}
