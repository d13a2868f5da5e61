//! Integration tests for core extraction result types.

use quotabar_core::{ExtractionResult, UsageBar, UsageEntry};

#[test]
fn test_empty_result_is_authenticated() {
    let result = ExtractionResult::default();
    assert!(result.is_authenticated);
    assert!(!result.has_data());
}

#[test]
fn test_cached_result_validation() {
    let mut result = ExtractionResult::empty();
    result
        .bars
        .extend(UsageBar::from_entry(UsageEntry::new("All models").with_percentage(80)));
    assert!(result.validate().is_ok());

    result.bars[0].limit = 50.0;
    assert!(result.validate().is_err());
}
