//! Infrastructure panel command

use std::sync::Arc;

use anyhow::{bail, Result};
use colored::Colorize;
use tabled::Tabled;
use tracing::{debug, info};
use usage_lib::panel::{
    AttributeSection, ChartSpec, ChartState, IoBudgetDetails, IO_BUDGET_EXPLAINER,
    IO_BUDGET_EXPLAINER_TITLE,
};
use usage_lib::{
    is_valid_project_ref, InfrastructurePanel, InfrastructurePanelBuilder, MonitoringClient,
    PanelContext,
};

use super::evaluate::print_alert;
use crate::output::{format_mbps, print_json, print_warning, OutputFormat};

/// Row for a daily chart table
#[derive(Tabled)]
struct ChartRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Row for the compute overview table
#[derive(Tabled)]
struct OverviewRow {
    #[tabled(rename = "Overview")]
    label: &'static str,
    #[tabled(rename = "")]
    value: String,
}

/// Fetch and print the infrastructure panel of a project
pub async fn show_panel(
    client: MonitoringClient,
    project_ref: &str,
    format: OutputFormat,
) -> Result<()> {
    if !is_valid_project_ref(project_ref) {
        bail!("Invalid project ref: {:?}", project_ref);
    }

    debug!(project_ref, api_url = %client.base_url(), "Fetching infrastructure panel");
    let client = Arc::new(client);
    let builder = InfrastructurePanelBuilder::new(client.clone(), client);

    let Some(panel) = builder.build(project_ref, &PanelContext::now()).await else {
        info!(project_ref, "No infrastructure panel available");
        print_warning("No infrastructure usage available for this project");
        return Ok(());
    };
    debug!(
        project_ref,
        sections = panel.sections.len(),
        free_tier = panel.is_free_tier,
        "Infrastructure panel built"
    );

    match format {
        OutputFormat::Json => print_json(&panel)?,
        OutputFormat::Table => print_panel(&panel),
    }

    Ok(())
}

fn print_panel(panel: &InfrastructurePanel) {
    println!("{}", panel.title.bold());
    println!("{}", "=".repeat(60));
    println!("{}", panel.description.dimmed());

    for section in &panel.sections {
        println!();
        print_section(section);
    }
}

fn print_section(section: &AttributeSection) {
    println!("{} {}", section.title.bold(), format!("#{}", section.anchor).dimmed());
    println!("{}", "-".repeat(60));
    println!("{}", section.description);
    if let Some(last_known) = &section.last_known_value {
        println!("Last known value: {}", last_known.cyan());
    }

    if let Some(io) = &section.io_budget {
        print_io_budget(io);
    }

    println!();
    println!("{}", section.chart_heading);
    for paragraph in &section.chart_paragraphs {
        println!("{}", paragraph.dimmed());
    }

    match &section.chart {
        ChartState::Loading => println!("{}", "Loading...".dimmed()),
        ChartState::Ready(chart) => print_chart(chart),
    }
}

fn print_io_budget(io: &IoBudgetDetails) {
    print_alert(&io.alert, Some(&io.upgrade_url));

    println!();
    println!("{}", IO_BUDGET_EXPLAINER_TITLE);
    println!("{}", IO_BUDGET_EXPLAINER.dimmed());

    let rows = vec![
        OverviewRow {
            label: "Current compute instance",
            value: io.overview.instance_name.clone(),
        },
        OverviewRow {
            label: "Maximum IO Bandwidth (burst limit)",
            value: format_mbps(io.overview.max_bandwidth_mbps),
        },
        OverviewRow {
            label: "Baseline IO Bandwidth",
            value: format_mbps(io.overview.base_bandwidth_mbps),
        },
        OverviewRow {
            label: "Daily burst time limit",
            value: format!("{} mins", io.overview.daily_burst_limit_mins),
        },
    ];
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);
}

fn print_chart(chart: &ChartSpec) {
    if chart.data.is_empty() {
        println!("{}", "No data for this period".yellow());
        return;
    }

    let rows: Vec<ChartRow> = chart
        .values()
        .map(|(point, value)| ChartRow {
            date: point.period_start_formatted.clone(),
            value: value
                .map(|v| chart.format_y(v))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);
}
