//! Core data models for infrastructure usage

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Product id of the free pricing tier
pub const FREE_TIER_PRODUCT_ID: &str = "tier_free";

/// Marker identifying compute instance add-ons by product id
pub const COMPUTE_INSTANCE_MARKER: &str = "_instance_";

/// Display format of `periodStartFormatted` labels
pub const PERIOD_LABEL_FORMAT: &str = "%d %b";

/// Attribute keys queried from the monitoring API
pub mod attributes {
    pub const CPU_USAGE: &str = "cpu_usage";
    pub const RAM_USAGE: &str = "ram_usage";
    pub const DISK_IO_BUDGET: &str = "disk_io_budget";
}

/// Daily sample returned by the monitoring API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricPoint {
    pub period_start: DateTime<Utc>,
    #[serde(rename = "periodStartFormatted")]
    pub period_start_formatted: String,
    #[serde(rename = "loopId")]
    pub loop_id: u32,
    /// Attribute values keyed by attribute name
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

impl DailyMetricPoint {
    pub fn new(period_start: DateTime<Utc>, loop_id: u32) -> Self {
        Self {
            period_start,
            period_start_formatted: period_start.format(PERIOD_LABEL_FORMAT).to_string(),
            loop_id,
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, attribute: impl Into<String>, value: f64) -> Self {
        self.values.insert(attribute.into(), serde_json::Value::from(value));
        self
    }

    /// Numeric value of an attribute; numeric strings are accepted
    pub fn value(&self, attribute: &str) -> Option<f64> {
        match self.values.get(attribute)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Value of an attribute only when the API sent a JSON number
    pub fn number(&self, attribute: &str) -> Option<f64> {
        self.values.get(attribute)?.as_f64()
    }
}

/// Result of one metric series lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub is_loading: bool,
    pub data: Vec<DailyMetricPoint>,
}

impl MetricSeries {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            data: Vec::new(),
        }
    }

    pub fn loaded(data: Vec<DailyMetricPoint>) -> Self {
        Self {
            is_loading: false,
            data,
        }
    }
}

/// Current billing period, in unix seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingPeriod {
    #[serde(default)]
    pub current_period_start: Option<i64>,
    #[serde(default)]
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionTier {
    #[serde(rename = "supabase_prod_id")]
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionAddon {
    #[serde(rename = "supabase_prod_id")]
    pub product_id: String,
    pub name: String,
}

/// Project subscription as returned by the billing API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub billing: BillingPeriod,
    pub tier: SubscriptionTier,
    #[serde(default)]
    pub addons: Vec<SubscriptionAddon>,
}

impl Subscription {
    pub fn is_free_tier(&self) -> bool {
        self.tier.product_id == FREE_TIER_PRODUCT_ID
    }

    /// First add-on that provisions a compute instance
    pub fn compute_instance(&self) -> Option<&SubscriptionAddon> {
        self.addons
            .iter()
            .find(|addon| addon.product_id.contains(COMPUTE_INSTANCE_MARKER))
    }

    pub fn period_start(&self) -> Option<DateTime<Utc>> {
        self.billing
            .current_period_start
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    pub fn period_end(&self) -> Option<DateTime<Utc>> {
        self.billing
            .current_period_end
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }
}
