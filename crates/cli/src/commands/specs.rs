//! Compute instance spec commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;
use usage_lib::compute::{self, ComputeInstanceSpec, COMPUTE_INSTANCE_SPECS};

use crate::output::{format_mbps, print_info, print_json, OutputFormat};

/// Row for compute instance table
#[derive(Tabled)]
struct SpecRow {
    #[tabled(rename = "Product")]
    product_id: String,
    #[tabled(rename = "Instance")]
    name: String,
    #[tabled(rename = "Max IO Bandwidth")]
    max_bandwidth: String,
    #[tabled(rename = "Baseline IO Bandwidth")]
    base_bandwidth: String,
}

impl From<&ComputeInstanceSpec> for SpecRow {
    fn from(spec: &ComputeInstanceSpec) -> Self {
        Self {
            product_id: spec.product_id.to_string(),
            name: spec.name.to_string(),
            max_bandwidth: format_mbps(spec.max_bandwidth),
            base_bandwidth: format_mbps(spec.base_bandwidth),
        }
    }
}

/// Show the whole spec table, or the spec one product id resolves to
pub fn show_specs(instance: Option<&str>, format: OutputFormat) -> Result<()> {
    let specs: Vec<&ComputeInstanceSpec> = match instance {
        Some(id) => vec![compute::resolve(Some(id))],
        None => COMPUTE_INSTANCE_SPECS.iter().collect(),
    };

    match format {
        OutputFormat::Json => print_json(&specs)?,
        OutputFormat::Table => {
            if let Some(id) = instance {
                if compute::find(id).is_none() {
                    print_info(&format!(
                        "Unknown instance {}, showing {}",
                        id.cyan(),
                        compute::DEFAULT_INSTANCE_PRODUCT_ID
                    ));
                }
            }

            let rows: Vec<SpecRow> = specs.into_iter().map(SpecRow::from).collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!(
                "Daily burst time limit: {} mins",
                compute::DAILY_BURST_LIMIT_MINS
            );
        }
    }

    Ok(())
}
