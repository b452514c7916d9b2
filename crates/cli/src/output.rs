//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use usage_lib::UsageSeverity;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Group digits in thousands, e.g. 14250 -> "14,250"
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format bandwidth in Mbps
pub fn format_mbps(mbps: u32) -> String {
    format!("{} Mbps", format_thousands(mbps as u64))
}

/// Format a percentage without trailing zeros
pub fn format_percent(value: f64) -> String {
    format!("{}%", value)
}

/// Color severity based on value
pub fn color_severity(severity: UsageSeverity) -> String {
    match severity {
        UsageSeverity::Normal => severity.to_string().green().to_string(),
        UsageSeverity::Warning => severity.to_string().yellow().to_string(),
        UsageSeverity::Depleted => severity.to_string().red().to_string(),
    }
}

/// Color an alert title to match its severity
pub fn color_title(title: &str, severity: UsageSeverity) -> String {
    match severity {
        UsageSeverity::Normal => title.bold().to_string(),
        UsageSeverity::Warning => title.yellow().bold().to_string(),
        UsageSeverity::Depleted => title.red().bold().to_string(),
    }
}
