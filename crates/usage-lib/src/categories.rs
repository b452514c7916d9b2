//! Usage category metadata
//!
//! Each category is a section of the usage page; its attributes map one to
//! one onto charts.

use serde::Serialize;

use crate::models::attributes;

pub const INFRA_CATEGORY_KEY: &str = "infra";

/// Unit label for percentage based attributes
pub const PERCENTAGE_UNIT: &str = "percentage";

/// A single chartable attribute within a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageAttribute {
    /// Page anchor for deep links
    pub anchor: &'static str,
    /// Key used to query the monitoring API
    pub key: &'static str,
    /// Field of each sample holding the value
    pub attribute: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub description: &'static str,
    /// Paragraphs separated by newlines
    pub chart_description: &'static str,
}

impl UsageAttribute {
    /// Heading shown above the chart
    pub fn chart_heading(&self) -> String {
        match self.key {
            attributes::DISK_IO_BUDGET => "IO Budget remaining each day".to_string(),
            attributes::RAM_USAGE => format!("Max {} usage each day", self.name.to_lowercase()),
            _ => format!("Max {} usage each day", self.name),
        }
    }

    pub fn chart_paragraphs(&self) -> Vec<String> {
        self.chart_description
            .split('\n')
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageCategory {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub attributes: &'static [UsageAttribute],
}

const INFRA_ATTRIBUTES: &[UsageAttribute] = &[
    UsageAttribute {
        anchor: "cpu",
        key: attributes::CPU_USAGE,
        attribute: "max_cpu_usage",
        name: "CPU",
        unit: PERCENTAGE_UNIT,
        description: "Max CPU usage of your server",
        chart_description: "The data shown here is refreshed over a period of 24 hours.",
    },
    UsageAttribute {
        anchor: "ram",
        key: attributes::RAM_USAGE,
        attribute: "ram_usage",
        name: "Memory",
        unit: PERCENTAGE_UNIT,
        description: "Memory usage of your server",
        chart_description: "The data shown here is refreshed over a period of 24 hours.",
    },
    UsageAttribute {
        anchor: "disk_io",
        key: attributes::DISK_IO_BUDGET,
        attribute: attributes::DISK_IO_BUDGET,
        name: "Disk IO Bandwidth",
        unit: PERCENTAGE_UNIT,
        description: "The disk performance of your workload is determined by the Disk IO \
bandwidth of your compute instance.",
        chart_description: "The data shown here is refreshed over a period of 24 hours.\n\
If you run out of IO budget, your workload runs at the baseline IO bandwidth until the \
budget replenishes the next day.",
    },
];

pub static USAGE_CATEGORIES: &[UsageCategory] = &[UsageCategory {
    key: INFRA_CATEGORY_KEY,
    name: "Infrastructure",
    description: "Usage statistics related to your server instance",
    attributes: INFRA_ATTRIBUTES,
}];

pub fn find_category<'a>(categories: &'a [UsageCategory], key: &str) -> Option<&'a UsageCategory> {
    categories.iter().find(|category| category.key == key)
}
