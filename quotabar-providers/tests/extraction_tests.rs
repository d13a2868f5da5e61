//! End-to-end tests for usage page extraction.

use quotabar_core::ExtractionStrategy;
use quotabar_providers::extract_usage;
use quotabar_providers::scrape::proximity::parse_proximity;

const URL: &str = "https://claude.ai/settings/usage";

// ============================================================================
// Strategy Precedence
// ============================================================================

#[test]
fn test_heading_precedence_over_proximity() {
    let text = "Plan usage\nSpent 12% of budget, 33% of credits\nCurrent session\n45% used\n";
    let result = extract_usage(text, URL);

    assert_eq!(result.strategy, Some(ExtractionStrategy::Labeled));
    assert_eq!(result.bars.len(), 1);
    assert_eq!(result.bars[0].label, "Current session");
    assert_eq!(result.bars[0].percentage, 45);
    assert!(result.bars.iter().all(|b| b.percentage != 12 && b.percentage != 33));
}

#[test]
fn test_proximity_is_capped() {
    let text = "stats 11% then 22% then 33% then 44% then 55% then 66%";
    let result = extract_usage(text, URL);

    assert_eq!(result.strategy, Some(ExtractionStrategy::Proximity));
    assert!(result.bars.len() <= 4);
    assert_eq!(result.bars.len(), 4);
}

#[test]
fn test_proximity_dedups_repeated_value() {
    let result = extract_usage("first 42% and again 42%", URL);
    let count = result.bars.iter().filter(|b| b.percentage == 42).count();
    assert_eq!(count, 1);
}

// ============================================================================
// Labels
// ============================================================================

#[test]
fn test_weekly_limits_summary_skipped() {
    let text = "Weekly limits\nAll models\nResets Mon 9:00 AM\n35% used\nSonnet only\n12% used";
    let result = extract_usage(text, URL);

    assert!(result.bar("Weekly limits").is_none());
    let labels: Vec<_> = result.bars.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["All models", "Sonnet only"]);
}

#[test]
fn test_korean_label_normalized() {
    let result = extract_usage("Sonnet만\n65% used", URL);
    assert_eq!(result.bars.len(), 1);
    assert_eq!(result.bars[0].label, "Sonnet only");
    assert_eq!(result.bars[0].percentage, 65);
}

#[test]
fn test_korean_page() {
    let text = "주간 한도\n2일 후 재설정\n50%\nSonnet만\n10% used";
    let result = extract_usage(text, URL);
    let labels: Vec<_> = result.bars.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["Weekly limit", "Sonnet only"]);
}

#[test]
fn test_korean_reset_idiom_in_fallback() {
    let entries = parse_proximity("Sonnet만\n4시간 18분 후 재설정\n65%");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].reset_text.as_deref(), Some("4시간 18분 후 재설정"));
}

// ============================================================================
// Authentication
// ============================================================================

#[test]
fn test_login_widget_hides_everything() {
    let text = "Welcome back\nContinue with Google\nCurrent session\n45% used\n90%";
    let result = extract_usage(text, URL);
    assert!(!result.is_authenticated);
    assert!(result.bars.is_empty());
    assert!(result.fallback_reset_date.is_none());
}

#[test]
fn test_login_redirect() {
    let result = extract_usage("Current session\n45% used", "https://claude.ai/login");
    assert!(!result.is_authenticated);
    assert!(!result.has_data());
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_full_page_scenario() {
    let text = "Current session\nResets in 2 hr 0 min\n45% used\nAll models\nResets Sat 4:00 PM\n80% used";
    let result = extract_usage(text, URL);

    assert!(result.is_authenticated);
    assert_eq!(result.bars.len(), 2);

    assert_eq!(result.bars[0].label, "Current session");
    assert_eq!(result.bars[0].percentage, 45);
    assert_eq!(result.bars[0].context.as_deref(), Some("Resets in 2 hr 0 min"));

    assert_eq!(result.bars[1].label, "All models");
    assert_eq!(result.bars[1].percentage, 80);
    assert_eq!(result.bars[1].context.as_deref(), Some("Resets Sat 4:00 PM"));
}

#[test]
fn test_empty_input_scenario() {
    let result = extract_usage("", URL);
    assert!(result.bars.is_empty());
    assert!(result.is_authenticated);
    assert!(result.fallback_reset_date.is_none());
}

#[test]
fn test_realistic_max_page() {
    let text = r"
        Settings
        Usage
        jane@example.com

        Plan usage limits
        Current session
        Resets in 4 hr 18 min
        12% used

        Weekly limits
        All models
        Resets Thu 9:00 AM
        61% used
        Sonnet only
        Resets Thu 9:00 AM
        3% used

        Extra usage
        Resets Nov 1
        0% used
    ";
    let result = extract_usage(text, URL);

    assert_eq!(result.bars.len(), 4);
    assert_eq!(result.max_percentage(), Some(61));
    assert_eq!(result.plan.as_deref(), Some("Max"));
    assert_eq!(result.email.as_deref(), Some("jane@example.com"));
    assert_eq!(result.fallback_reset_date.as_deref(), Some("Resets in 4 hr 18 min"));

    let extra = result.bar("extra usage").unwrap();
    assert_eq!(extra.percentage, 0);
    assert_eq!(result.display_reset(extra), Some("Resets Nov 1"));
}

#[test]
fn test_arbitrary_input_never_panics() {
    let inputs = [
        "%",
        "100%%%",
        "99999999999999999999% used",
        "Current session\n",
        "한",
        "\n\n\n",
        "Resets",
        "Sonnet만 후 재설정 1%",
    ];
    for input in inputs {
        let result = extract_usage(input, URL);
        assert!(result.bars.iter().all(|b| b.percentage <= 100));
    }
}
