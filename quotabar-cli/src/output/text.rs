//! Text output formatting with progress bars and colors.

use chrono::{DateTime, Local, Utc};
use quotabar_core::{CreditBalance, ExtractionResult, UsageBar};
use quotabar_store::{Alert, AlertLevel};
use std::collections::BTreeMap;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    warning: u8,
    critical: u8,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            warning: 80,
            critical: 95,
            bar_width: 10,
        }
    }

    /// Colors bars using the configured alert thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, warning: u8, critical: u8) -> Self {
        self.warning = warning;
        self.critical = critical;
        self
    }

    /// Formats an extraction result.
    pub fn format_usage(
        &self,
        result: &ExtractionResult,
        fetched_at: Option<DateTime<Utc>>,
    ) -> String {
        let mut lines = Vec::new();

        // Header: "Claude (Max)"
        match &result.plan {
            Some(plan) => lines.push(format!("{} ({})", self.bold("Claude"), self.blue(plan))),
            None => lines.push(self.bold("Claude")),
        }

        if !result.is_authenticated {
            lines.push(self.red("Not signed in. Log in to claude.ai in the render browser."));
            return lines.join("\n");
        }

        if result.bars.is_empty() {
            lines.push(self.dim("No usage bars found on the page"));
        }
        for bar in &result.bars {
            lines.push(self.format_bar(result, bar));
        }

        if let Some(email) = &result.email {
            lines.push(format!("Account: {}", self.cyan(email)));
        }
        if let Some(fetched_at) = fetched_at {
            let local = fetched_at.with_timezone(&Local);
            lines.push(self.dim(&format!("Updated {}", local.format("%Y-%m-%d %H:%M"))));
        }

        lines.join("\n")
    }

    /// Formats one bar with its reset line.
    fn format_bar(&self, result: &ExtractionResult, bar: &UsageBar) -> String {
        let pct = f64::from(bar.percentage);
        let pct_str = self.color_for_percent(pct, &format!("{}% used", bar.percentage));
        let mut line = format!(
            "{:<18} {} {}",
            format!("{}:", bar.label),
            self.progress_bar(pct),
            pct_str
        );

        if let Some(reset) = result.display_reset(bar) {
            line.push_str(&format!("\n{:<18} {}", "", self.dim(reset)));
        }

        line
    }

    /// Formats a progress bar filled by the used percentage.
    pub fn progress_bar(&self, percent_used: f64) -> String {
        let clamped = percent_used.clamp(0.0, 100.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let filled = ((clamped / 100.0) * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(clamped, &bar)
    }

    /// Formats a cost breakdown.
    pub fn format_cost(
        &self,
        days: u32,
        group_label: &str,
        costs: &BTreeMap<String, f64>,
        tokens: &BTreeMap<String, u64>,
    ) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{} (last {} day{})",
            self.bold("Cost Report"),
            days,
            if days == 1 { "" } else { "s" }
        ));
        lines.push("─".repeat(40));

        let total: f64 = costs.values().sum();
        lines.push(format!("Total cost:   {}", self.green(&format!("${total:.2}"))));

        let total_tokens: u64 = tokens.values().sum();
        if total_tokens > 0 {
            lines.push(format!("Total tokens: {}", format_number(total_tokens)));
        }

        if !costs.is_empty() {
            lines.push(String::new());
            lines.push(self.dim(&format!("By {group_label}:")));
            let mut sorted: Vec<_> = costs.iter().collect();
            sorted.sort_by(|a, b| b.1.total_cmp(a.1));
            for (name, cost) in sorted {
                match tokens.get(name) {
                    Some(count) => lines.push(format!(
                        "  {name:<28} ${cost:>9.2}  {} tokens",
                        format_number(*count)
                    )),
                    None => lines.push(format!("  {name:<28} ${cost:>9.2}")),
                }
            }
        }

        lines.join("\n")
    }

    /// Formats the credit balance.
    pub fn format_balance(&self, balance: &CreditBalance) -> String {
        let amount = format!("{:.2} {}", balance.balance, balance.currency);
        let mut line = format!("{} {}", self.bold("Credit balance:"), self.green(&amount));
        if let Some(updated_at) = balance.updated_at {
            let local = updated_at.with_timezone(&Local);
            line.push_str(&self.dim(&format!(" (as of {})", local.format("%Y-%m-%d %H:%M"))));
        }
        line
    }

    /// Formats a threshold alert.
    pub fn format_alert(&self, alert: &Alert) -> String {
        let tag = match alert.level {
            AlertLevel::Critical => self.red("CRITICAL"),
            AlertLevel::Warning => self.yellow("WARNING"),
            AlertLevel::None => self.dim("OK"),
        };
        format!("{tag} {}", alert.message())
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_for_percent(&self, percent_used: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent_used >= f64::from(self.critical) {
            self.red(text)
        } else if percent_used >= f64::from(self.warning) {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn blue(&self, text: &str) -> String {
        self.paint(BLUE, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_number(n: u64) -> String {
    let n = n as f64;
    if n >= 1_000_000.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.1}K", n / 1_000.0)
    } else {
        format!("{n:.0}")
    }
}
