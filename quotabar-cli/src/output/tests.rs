//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use quotabar_core::{CreditBalance, ExtractionResult, ExtractionStrategy, UsageBar};
    use quotabar_store::{Alert, AlertLevel};
    use std::collections::BTreeMap;

    fn bar(label: &str, percentage: u32, reset: Option<&str>) -> UsageBar {
        let mut bar = UsageBar::new(label, percentage).unwrap();
        bar.context = reset.map(str::to_string);
        bar
    }

    fn max_plan_result() -> ExtractionResult {
        let mut result = ExtractionResult::empty();
        result.bars = vec![
            bar("Current session", 45, Some("Resets in 2 hr 0 min")),
            bar("All models", 12, None),
        ];
        result.fallback_reset_date = Some("Resets Thu 9:00 AM".to_string());
        result.plan = Some("Max".to_string());
        result.email = Some("user@example.com".to_string());
        result.strategy = Some(ExtractionStrategy::Labeled);
        result
    }

    #[test]
    fn test_progress_bar_boundary_values() {
        let formatter = TextFormatter::new(false);

        let test_cases = vec![
            (0.0, "░░░░░░░░░░"),
            (10.0, "█░░░░░░░░░"),
            (25.0, "███░░░░░░░"), // 2.5 rounds to 3 blocks
            (50.0, "█████░░░░░"),
            (75.0, "████████░░"), // 7.5 rounds to 8 blocks
            (100.0, "██████████"),
        ];

        for (percent, expected) in test_cases {
            let bar = formatter.progress_bar(percent);
            assert_eq!(bar, expected, "Failed for {percent}%");
        }
    }

    #[test]
    fn test_progress_bar_colors_follow_thresholds() {
        let formatter = TextFormatter::new(true).with_thresholds(50, 90);

        assert!(formatter.progress_bar(95.0).contains("\x1b[31m"), "red at critical");
        assert!(formatter.progress_bar(60.0).contains("\x1b[33m"), "yellow at warning");
        assert!(formatter.progress_bar(10.0).contains("\x1b[32m"), "green below warning");
    }

    #[test]
    fn test_format_usage() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_usage(&max_plan_result(), None);

        assert!(output.starts_with("Claude (Max)"));
        assert!(output.contains("Current session:"));
        assert!(output.contains("45% used"));
        assert!(output.contains("Resets in 2 hr 0 min"));
        assert!(output.contains("Account: user@example.com"));
        assert!(!output.contains("Updated"));
    }

    #[test]
    fn test_fallback_reset_used_for_bar_without_context() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_usage(&max_plan_result(), None);

        let all_models = output.find("All models:").unwrap();
        assert!(output[all_models..].contains("Resets Thu 9:00 AM"));
    }

    #[test]
    fn test_format_unauthenticated() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_usage(&ExtractionResult::unauthenticated(), None);
        assert!(output.contains("Not signed in"));
    }

    #[test]
    fn test_format_empty_result() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_usage(&ExtractionResult::empty(), None);
        assert!(output.contains("No usage bars found"));
    }

    #[test]
    fn test_no_color_has_no_escapes() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_usage(&max_plan_result(), Some(chrono::Utc::now()));
        assert!(!output.contains("\x1b["));
        assert!(output.contains("Updated"));
    }

    #[test]
    fn test_format_cost() {
        let formatter = TextFormatter::new(false);
        let mut costs = BTreeMap::new();
        costs.insert("claude-opus-4".to_string(), 3.0);
        costs.insert("claude-sonnet-4".to_string(), 13.0);
        let mut tokens = BTreeMap::new();
        tokens.insert("claude-sonnet-4".to_string(), 3_700_000);

        let output = formatter.format_cost(7, "model", &costs, &tokens);

        assert!(output.contains("last 7 days"));
        assert!(output.contains("$16.00"));
        assert!(output.contains("3.7M"));
        // Highest cost first
        assert!(output.find("claude-sonnet-4").unwrap() < output.find("claude-opus-4").unwrap());
    }

    #[test]
    fn test_format_balance_and_alert() {
        let formatter = TextFormatter::new(false);
        let balance = CreditBalance {
            balance: 42.5,
            currency: "USD".to_string(),
            updated_at: None,
        };
        assert_eq!(formatter.format_balance(&balance), "Credit balance: 42.50 USD");

        let alert = Alert {
            label: "All models".to_string(),
            level: AlertLevel::Critical,
            percentage: 97,
        };
        let line = formatter.format_alert(&alert);
        assert!(line.starts_with("CRITICAL"));
        assert!(line.contains("97%"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use quotabar_core::{CreditBalance, ExtractionResult, UsageBar};
    use quotabar_store::{Alert, AlertLevel};
    use std::collections::BTreeMap;

    #[test]
    fn test_usage_is_camel_case() {
        let mut result = ExtractionResult::empty();
        result.bars = vec![UsageBar::new("Current session", 45).unwrap()];
        result.fallback_reset_date = Some("Resets Thu 9:00 AM".to_string());

        let json = JsonFormatter::new(false)
            .format_usage(&result, None, true, &[])
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["authenticated"], true);
        assert_eq!(value["cached"], true);
        assert_eq!(value["bars"][0]["label"], "Current session");
        assert_eq!(value["bars"][0]["percentage"], 45);
        assert_eq!(value["bars"][0]["resets"], "Resets Thu 9:00 AM");
        assert!(value.get("plan").is_none());
        assert!(value.get("fetchedAt").is_none());
        assert!(value.get("alerts").is_none());
    }

    #[test]
    fn test_usage_with_alerts() {
        let alert = Alert {
            label: "All models".to_string(),
            level: AlertLevel::Warning,
            percentage: 81,
        };
        let json = JsonFormatter::new(true)
            .format_usage(&ExtractionResult::unauthenticated(), None, false, &[alert])
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["authenticated"], false);
        assert_eq!(value["alerts"][0]["level"], "warning");
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_cost_output() {
        let mut costs = BTreeMap::new();
        costs.insert("default".to_string(), 1.5);
        costs.insert("wrkspc_01".to_string(), 2.5);

        let json = JsonFormatter::new(false)
            .format_cost(30, "workspace", &costs, &BTreeMap::new())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["groupBy"], "workspace");
        assert_eq!(value["totalCostUsd"], 4.0);
        assert_eq!(value["totalTokens"], 0);
        assert_eq!(value["groups"][0]["name"], "wrkspc_01");
        assert!(value["groups"][0].get("tokens").is_none());
    }

    #[test]
    fn test_balance_output() {
        let balance = CreditBalance {
            balance: 10.0,
            currency: "USD".to_string(),
            updated_at: None,
        };
        let json = JsonFormatter::new(false).format_balance(&balance).unwrap();
        assert_eq!(json, r#"{"balance":10.0,"currency":"USD"}"#);
    }
}
