//! I/O budget threshold evaluation
//!
//! Classifies today's remaining I/O budget into a severity tier and
//! produces the upgrade prompt shown next to the disk I/O chart.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{attributes, DailyMetricPoint, PERIOD_LABEL_FORMAT};

/// Budget at or below which the prompt switches to a warning
pub const WARNING_THRESHOLD_PERCENT: f64 = 20.0;

/// Budget at or below which the budget counts as used up
pub const DEPLETED_THRESHOLD_PERCENT: f64 = 0.0;

/// Budget assumed when today has no sample yet
pub const FULL_BUDGET_PERCENT: f64 = 100.0;

pub const UPGRADE_PROJECT_LABEL: &str = "Upgrade project";
pub const CHANGE_COMPUTE_LABEL: &str = "Change compute add-on";

const DEPLETED_TITLE: &str = "IO Budget for today has been used up";
const DEPLETED_BODY: &str = "Your workload has used up all the burst IO throughput minutes during \
the day and is running at the baseline performance. If you need consistent disk performance, \
consider upgrading to a larger compute add-on.";

const WARNING_TITLE: &str = "IO Budget for today is running out";
const WARNING_BODY: &str = "Your workload is about to use up all the burst IO throughput minutes \
during the day. Once this is completely used up, your workload will run at the baseline \
performance. If you need consistent disk performance, consider upgrading to a larger compute \
add-on.";

/// Severity tier of the remaining I/O budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageSeverity {
    /// More than 20% of the budget remains
    Normal,
    /// Budget is above zero but at or below 20%
    Warning,
    /// Budget is used up
    Depleted,
}

impl UsageSeverity {
    /// Classify a remaining budget percentage. Values outside 0..=100 are
    /// classified by the same rules.
    pub fn classify(remaining_budget_percent: f64) -> Self {
        if remaining_budget_percent <= DEPLETED_THRESHOLD_PERCENT {
            UsageSeverity::Depleted
        } else if remaining_budget_percent <= WARNING_THRESHOLD_PERCENT {
            UsageSeverity::Warning
        } else {
            UsageSeverity::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UsageSeverity::Normal => "normal",
            UsageSeverity::Warning => "warning",
            UsageSeverity::Depleted => "depleted",
        }
    }
}

impl fmt::Display for UsageSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upgrade prompt for the current I/O budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "severity", rename_all = "lowercase")]
pub enum UsageAlert {
    Normal,
    Warning {
        title: String,
        body: String,
        cta_label: String,
    },
    Depleted {
        title: String,
        body: String,
        cta_label: String,
    },
}

impl UsageAlert {
    pub fn severity(&self) -> UsageSeverity {
        match self {
            UsageAlert::Normal => UsageSeverity::Normal,
            UsageAlert::Warning { .. } => UsageSeverity::Warning,
            UsageAlert::Depleted { .. } => UsageSeverity::Depleted,
        }
    }

    /// Whether an alert should be rendered at all
    pub fn is_visible(&self) -> bool {
        !matches!(self, UsageAlert::Normal)
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            UsageAlert::Normal => None,
            UsageAlert::Warning { title, .. } | UsageAlert::Depleted { title, .. } => Some(title),
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            UsageAlert::Normal => None,
            UsageAlert::Warning { body, .. } | UsageAlert::Depleted { body, .. } => Some(body),
        }
    }

    pub fn cta_label(&self) -> Option<&str> {
        match self {
            UsageAlert::Normal => None,
            UsageAlert::Warning { cta_label, .. } | UsageAlert::Depleted { cta_label, .. } => {
                Some(cta_label)
            }
        }
    }
}

/// Call-to-action label for the upgrade button
pub fn cta_label(is_free_tier: bool) -> &'static str {
    if is_free_tier {
        UPGRADE_PROJECT_LABEL
    } else {
        CHANGE_COMPUTE_LABEL
    }
}

/// Evaluate the remaining I/O budget into an upgrade prompt
pub fn evaluate(remaining_budget_percent: f64, is_free_tier: bool) -> UsageAlert {
    let cta = cta_label(is_free_tier).to_string();
    match UsageSeverity::classify(remaining_budget_percent) {
        UsageSeverity::Normal => UsageAlert::Normal,
        UsageSeverity::Warning => UsageAlert::Warning {
            title: WARNING_TITLE.to_string(),
            body: WARNING_BODY.to_string(),
            cta_label: cta,
        },
        UsageSeverity::Depleted => UsageAlert::Depleted {
            title: DEPLETED_TITLE.to_string(),
            body: DEPLETED_BODY.to_string(),
            cta_label: cta,
        },
    }
}

/// Remaining I/O budget for `today`, matched on the formatted period label.
/// Returns the full budget when today has no sample.
pub fn current_day_budget(points: &[DailyMetricPoint], today: NaiveDate) -> f64 {
    let label = today.format(PERIOD_LABEL_FORMAT).to_string();
    points
        .iter()
        .find(|point| point.period_start_formatted == label)
        .and_then(|point| point.value(attributes::DISK_IO_BUDGET))
        .unwrap_or(FULL_BUDGET_PERCENT)
}
