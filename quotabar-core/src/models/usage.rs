//! Usage-related types.
//!
//! This module contains the types produced by the usage page extraction:
//! - [`UsageEntry`] - Raw candidate, as found in the page text
//! - [`UsageBar`] - Normalized bar handed to callers
//! - [`ExtractionResult`] - The full result of one extraction

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The limit every usage bar is measured against.
///
/// Only percentages are observable on the usage page, so the limit is fixed.
pub const BAR_LIMIT: f64 = 100.0;

// ============================================================================
// Usage Entry
// ============================================================================

/// A candidate usage entry before normalization.
///
/// The label is the raw heading text in whatever language the page was
/// rendered in. A missing percentage means the percentage could not be
/// parsed; it is never treated as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEntry {
    /// Raw section heading.
    pub label: String,
    /// Parsed percentage, unvalidated.
    pub percentage: Option<u32>,
    /// Raw reset description (e.g. "Resets in 4 hr 18 min").
    pub reset_text: Option<String>,
}

impl UsageEntry {
    /// Creates an entry with only a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            percentage: None,
            reset_text: None,
        }
    }

    /// Sets the percentage.
    #[must_use]
    pub fn with_percentage(mut self, percentage: u32) -> Self {
        self.percentage = Some(percentage);
        self
    }

    /// Sets the reset text.
    #[must_use]
    pub fn with_reset_text(mut self, reset_text: impl Into<String>) -> Self {
        self.reset_text = Some(reset_text.into());
        self
    }

    /// Returns true if the entry carries anything worth emitting.
    pub fn has_content(&self) -> bool {
        self.percentage.is_some() || self.reset_text.is_some()
    }

    /// Returns true if the percentage is present and within [0, 100].
    pub fn has_valid_percentage(&self) -> bool {
        self.percentage.is_some_and(|p| p <= 100)
    }
}

// ============================================================================
// Usage Bar
// ============================================================================

/// A normalized usage bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageBar {
    /// Amount used, in percentage points.
    pub used: f64,
    /// Always [`BAR_LIMIT`].
    pub limit: f64,
    /// Percentage used (0-100).
    pub percentage: u8,
    /// Canonical label.
    pub label: String,
    /// Reset description for display. Never parsed further.
    pub context: Option<String>,
}

impl UsageBar {
    /// Creates a bar from a percentage. Returns `None` above 100.
    pub fn new(label: impl Into<String>, percentage: u32) -> Option<Self> {
        let percentage = u8::try_from(percentage).ok().filter(|p| *p <= 100)?;
        Some(Self {
            used: f64::from(percentage),
            limit: BAR_LIMIT,
            percentage,
            label: label.into(),
            context: None,
        })
    }

    /// Builds a bar from a candidate entry, keeping its raw label.
    ///
    /// Returns `None` when the entry has no percentage or the percentage
    /// lies outside [0, 100].
    pub fn from_entry(entry: UsageEntry) -> Option<Self> {
        let mut bar = Self::new(entry.label, entry.percentage?)?;
        bar.context = entry.reset_text;
        Some(bar)
    }

    /// Returns the remaining percentage.
    pub fn remaining_percent(&self) -> f64 {
        (self.limit - self.used).max(0.0)
    }

    /// Returns true if usage is approaching the limit (>80%).
    pub fn is_approaching_limit(&self) -> bool {
        self.percentage > 80
    }

    /// Returns true if usage is at or over the limit.
    pub fn is_over_limit(&self) -> bool {
        self.percentage >= 100
    }

    /// Validates a bar that came from outside the engine (e.g. a cache file).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` if the percentage is above 100, the
    /// limit is not [`BAR_LIMIT`], or `used` disagrees with the percentage.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.percentage > 100 {
            return Err(CoreError::InvalidData(format!(
                "percentage {} out of valid range [0, 100]",
                self.percentage
            )));
        }
        if (self.limit - BAR_LIMIT).abs() > f64::EPSILON {
            return Err(CoreError::InvalidData(format!(
                "limit {} is not {BAR_LIMIT}",
                self.limit
            )));
        }
        if !self.used.is_finite() || (self.used - f64::from(self.percentage)).abs() > f64::EPSILON {
            return Err(CoreError::InvalidData(format!(
                "used {} does not match percentage {}",
                self.used, self.percentage
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Extraction Result
// ============================================================================

/// Which parsing stage produced the bars of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Bars anchored on recognized section headings.
    Labeled,
    /// Bars recovered from percentage occurrences and nearby text.
    Proximity,
}

impl ExtractionStrategy {
    /// Returns the display name for this strategy.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Labeled => "labeled",
            Self::Proximity => "proximity",
        }
    }
}

/// Everything extracted from one read of the usage page.
///
/// Produced fresh on each extraction and owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Usage bars in first-found order.
    #[serde(default)]
    pub bars: Vec<UsageBar>,
    /// False when the page was a login or signup page.
    pub is_authenticated: bool,
    /// Document-wide reset description, used when a bar has none.
    pub fallback_reset_date: Option<String>,
    /// Inferred plan name.
    pub plan: Option<String>,
    /// First email address found in the page.
    pub email: Option<String>,
    /// Stage that produced the bars, if any bars were found.
    #[serde(default)]
    pub strategy: Option<ExtractionStrategy>,
}

impl ExtractionResult {
    /// An authenticated result with no data.
    pub fn empty() -> Self {
        Self {
            bars: Vec::new(),
            is_authenticated: true,
            fallback_reset_date: None,
            plan: None,
            email: None,
            strategy: None,
        }
    }

    /// The result for a login or signup page.
    pub fn unauthenticated() -> Self {
        Self {
            is_authenticated: false,
            ..Self::empty()
        }
    }

    /// Returns true if any bar was extracted.
    pub fn has_data(&self) -> bool {
        !self.bars.is_empty()
    }

    /// Returns the highest percentage across all bars.
    pub fn max_percentage(&self) -> Option<u8> {
        self.bars.iter().map(|b| b.percentage).max()
    }

    /// Finds a bar by label, ignoring case.
    pub fn bar(&self, label: &str) -> Option<&UsageBar> {
        self.bars
            .iter()
            .find(|b| b.label.eq_ignore_ascii_case(label))
    }

    /// Returns the reset text to show for a bar.
    ///
    /// The bar's own context wins; the document-level fallback is only
    /// used when the bar has none.
    pub fn display_reset<'a>(&'a self, bar: &'a UsageBar) -> Option<&'a str> {
        bar.context
            .as_deref()
            .or(self.fallback_reset_date.as_deref())
    }

    /// Validates every bar.
    ///
    /// # Errors
    ///
    /// Returns the first bar validation failure, prefixed with its label.
    pub fn validate(&self) -> Result<(), CoreError> {
        for bar in &self.bars {
            bar.validate()
                .map_err(|e| CoreError::InvalidData(format!("{}: {e}", bar.label)))?;
        }
        Ok(())
    }
}

impl Default for ExtractionResult {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_from_entry() {
        let entry = UsageEntry::new("All models")
            .with_percentage(80)
            .with_reset_text("Resets Sat 4:00 PM");
        let bar = UsageBar::from_entry(entry).unwrap();

        assert_eq!(bar.percentage, 80);
        assert_eq!(bar.used, 80.0);
        assert_eq!(bar.limit, BAR_LIMIT);
        assert_eq!(bar.context.as_deref(), Some("Resets Sat 4:00 PM"));
    }

    #[test]
    fn test_entry_percentage_validity() {
        assert!(!UsageEntry::new("x").with_reset_text("Resets soon").has_valid_percentage());
        assert!(!UsageEntry::new("x").with_percentage(101).has_valid_percentage());
        assert!(UsageEntry::new("x").with_percentage(0).has_valid_percentage());
        assert!(UsageEntry::new("x").with_percentage(100).has_valid_percentage());
    }

    #[test]
    fn test_bar_from_entry_rejects_missing_and_out_of_range() {
        assert!(UsageBar::from_entry(UsageEntry::new("x").with_reset_text("Resets soon")).is_none());
        assert!(UsageBar::from_entry(UsageEntry::new("x").with_percentage(101)).is_none());
        assert!(UsageBar::from_entry(UsageEntry::new("x").with_percentage(100)).is_some());
        assert!(UsageBar::from_entry(UsageEntry::new("x").with_percentage(0)).is_some());
    }

    #[test]
    fn test_bar_limits() {
        let bar = UsageBar::new("Current session", 85).unwrap();
        assert!(bar.is_approaching_limit());
        assert!(!bar.is_over_limit());
        assert_eq!(bar.remaining_percent(), 15.0);

        let full = UsageBar::new("Current session", 100).unwrap();
        assert!(full.is_over_limit());
        assert_eq!(full.remaining_percent(), 0.0);
    }

    #[test]
    fn test_bar_validate() {
        let mut bar = UsageBar::new("Sonnet only", 40).unwrap();
        assert!(bar.validate().is_ok());

        bar.used = 41.0;
        assert!(bar.validate().is_err());

        let mut bar = UsageBar::new("Sonnet only", 40).unwrap();
        bar.percentage = 140;
        assert!(bar.validate().is_err());
    }

    #[test]
    fn test_unauthenticated_result() {
        let result = ExtractionResult::unauthenticated();
        assert!(!result.is_authenticated);
        assert!(result.bars.is_empty());
        assert!(result.plan.is_none());
        assert!(result.email.is_none());
        assert!(result.fallback_reset_date.is_none());
    }

    #[test]
    fn test_display_reset_prefers_bar_context() {
        let mut result = ExtractionResult::empty();
        result.fallback_reset_date = Some("in 3 days".to_string());

        let mut with_context = UsageBar::new("Current session", 10).unwrap();
        with_context.context = Some("Resets in 1 hr 0 min".to_string());
        let without_context = UsageBar::new("All models", 20).unwrap();

        assert_eq!(result.display_reset(&with_context), Some("Resets in 1 hr 0 min"));
        assert_eq!(result.display_reset(&without_context), Some("in 3 days"));
    }

    #[test]
    fn test_max_percentage_and_lookup() {
        let mut result = ExtractionResult::empty();
        assert_eq!(result.max_percentage(), None);

        result.bars.push(UsageBar::new("Current session", 45).unwrap());
        result.bars.push(UsageBar::new("All models", 80).unwrap());

        assert_eq!(result.max_percentage(), Some(80));
        assert_eq!(result.bar("all MODELS").map(|b| b.percentage), Some(80));
        assert!(result.bar("Extra usage").is_none());
    }
}
