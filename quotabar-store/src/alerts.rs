//! Usage threshold alerts.
//!
//! Alerts fire when a bar crosses into a higher level, not on every
//! refresh while it stays there. When usage falls back (quota reset) the
//! level drops with it, so the next climb alerts again.

use quotabar_core::{ExtractionResult, UsageBar};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

use crate::config::GeneralConfig;

/// Alert severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Below the warning threshold.
    #[default]
    None,
    /// At or above the warning threshold.
    Warning,
    /// At or above the critical threshold.
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "ok",
            Self::Warning => "warning",
            Self::Critical => "critical",
        })
    }
}

/// A threshold crossing for one bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Bar label.
    pub label: String,
    /// New level.
    pub level: AlertLevel,
    /// Percentage that triggered it.
    pub percentage: u8,
}

impl Alert {
    /// Human-readable message.
    pub fn message(&self) -> String {
        match self.level {
            AlertLevel::Critical => format!(
                "{} is at {}% of its limit. Consider slowing down.",
                self.label, self.percentage
            ),
            _ => format!("{} is at {}% of its limit.", self.label, self.percentage),
        }
    }
}

/// Tracks the last alerted level per bar label.
#[derive(Debug, Clone)]
pub struct AlertTracker {
    warning: u8,
    critical: u8,
    last: HashMap<String, AlertLevel>,
}

impl Default for AlertTracker {
    fn default() -> Self {
        Self::new(80, 95)
    }
}

impl AlertTracker {
    /// Creates a tracker with the given thresholds.
    pub fn new(warning: u8, critical: u8) -> Self {
        Self {
            warning,
            critical,
            last: HashMap::new(),
        }
    }

    /// Creates a tracker from configured thresholds.
    pub fn from_config(config: &GeneralConfig) -> Self {
        Self::new(config.warning_threshold, config.critical_threshold)
    }

    /// Level for a percentage.
    pub fn level_for(&self, percentage: u8) -> AlertLevel {
        if percentage >= self.critical {
            AlertLevel::Critical
        } else if percentage >= self.warning {
            AlertLevel::Warning
        } else {
            AlertLevel::None
        }
    }

    /// Records `bar` and returns an alert if it moved to a higher level.
    pub fn check(&mut self, bar: &UsageBar) -> Option<Alert> {
        let key = bar.label.to_lowercase();
        let current = self.level_for(bar.percentage);
        let last = self.last.get(&key).copied().unwrap_or_default();

        if current == last {
            return None;
        }
        self.last.insert(key, current);

        if current < last {
            debug!(label = %bar.label, from = %last, to = %current, "Usage dropped below threshold");
            return None;
        }

        info!(label = %bar.label, level = %current, percentage = bar.percentage, "Threshold crossed");
        Some(Alert {
            label: bar.label.clone(),
            level: current,
            percentage: bar.percentage,
        })
    }

    /// Checks every bar of an authenticated result.
    pub fn check_all(&mut self, result: &ExtractionResult) -> Vec<Alert> {
        if !result.is_authenticated {
            return Vec::new();
        }
        result.bars.iter().filter_map(|bar| self.check(bar)).collect()
    }

    /// Forgets all state.
    pub fn reset(&mut self) {
        self.last.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(label: &str, percentage: u32) -> UsageBar {
        UsageBar::new(label, percentage).unwrap()
    }

    #[test]
    fn test_levels() {
        let tracker = AlertTracker::default();
        assert_eq!(tracker.level_for(79), AlertLevel::None);
        assert_eq!(tracker.level_for(80), AlertLevel::Warning);
        assert_eq!(tracker.level_for(95), AlertLevel::Critical);
        assert_eq!(tracker.level_for(100), AlertLevel::Critical);
    }

    #[test]
    fn test_fires_once_per_crossing() {
        let mut tracker = AlertTracker::default();

        assert_eq!(tracker.check(&bar("All models", 50)), None);
        let alert = tracker.check(&bar("All models", 82)).unwrap();
        assert_eq!(alert.level, AlertLevel::Warning);
        assert_eq!(tracker.check(&bar("All models", 85)), None);

        let alert = tracker.check(&bar("All models", 96)).unwrap();
        assert_eq!(alert.level, AlertLevel::Critical);
        assert_eq!(tracker.check(&bar("All models", 99)), None);
    }

    #[test]
    fn test_rearms_after_reset() {
        let mut tracker = AlertTracker::default();
        assert!(tracker.check(&bar("Current session", 90)).is_some());
        assert_eq!(tracker.check(&bar("Current session", 5)), None);
        assert!(tracker.check(&bar("Current session", 90)).is_some());
    }

    #[test]
    fn test_jump_straight_to_critical() {
        let mut tracker = AlertTracker::default();
        let alert = tracker.check(&bar("Extra usage", 100)).unwrap();
        assert_eq!(alert.level, AlertLevel::Critical);
        assert!(alert.message().contains("slowing down"));
    }

    #[test]
    fn test_labels_are_independent() {
        let mut tracker = AlertTracker::new(50, 90);
        let mut result = ExtractionResult::empty();
        result.bars = vec![bar("Current session", 60), bar("Sonnet only", 10), bar("All models", 91)];

        let alerts = tracker.check_all(&result);
        let labels: Vec<_> = alerts.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Current session", "All models"]);
        assert!(tracker.check_all(&result).is_empty());

        tracker.reset();
        assert_eq!(tracker.check_all(&result).len(), 2);
    }

    #[test]
    fn test_unauthenticated_result_is_ignored() {
        let mut tracker = AlertTracker::default();
        assert!(tracker.check_all(&ExtractionResult::unauthenticated()).is_empty());
    }
}
