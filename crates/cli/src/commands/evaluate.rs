//! IO budget evaluation command

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use usage_lib::{evaluate, UsageAlert};

use crate::output::{color_severity, color_title, format_percent, print_json, OutputFormat};

#[derive(Serialize)]
struct EvaluationReport {
    remaining_percent: f64,
    is_free_tier: bool,
    alert: UsageAlert,
}

/// Classify a remaining IO budget and print the resulting prompt
pub fn show_evaluation(remaining: f64, free_tier: bool, format: OutputFormat) -> Result<()> {
    let alert = evaluate(remaining, free_tier);

    match format {
        OutputFormat::Json => print_json(&EvaluationReport {
            remaining_percent: remaining,
            is_free_tier: free_tier,
            alert,
        })?,
        OutputFormat::Table => {
            println!("{}", "IO Budget".bold());
            println!("{}", "=".repeat(50));
            println!("Remaining today:        {}", format_percent(remaining));
            println!("Severity:               {}", color_severity(alert.severity()));
            print_alert(&alert, None);
        }
    }

    Ok(())
}

/// Print an alert block; nothing for a normal budget
pub fn print_alert(alert: &UsageAlert, upgrade_url: Option<&str>) {
    let (Some(title), Some(body), Some(cta)) = (alert.title(), alert.body(), alert.cta_label())
    else {
        return;
    };

    println!();
    println!("{}", color_title(title, alert.severity()));
    println!("{}", body);
    match upgrade_url {
        Some(url) => println!("{} {}", format!("[{}]", cta).bold(), url.underline()),
        None => println!("{}", format!("[{}]", cta).bold()),
    }
}
