//! Seams to the billing and monitoring services
//!
//! The panel only depends on these traits; `client::MonitoringClient`
//! implements them over HTTP and tests provide in-memory stubs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{MetricSeries, Subscription};

/// Sampling interval used for all infrastructure charts
pub const DAILY_INTERVAL: &str = "1d";

/// Project refs are opaque identifiers made of ASCII letters, digits, `-`
/// and `_`. Anything else is rejected before it reaches a URL.
pub fn is_valid_project_ref(project_ref: &str) -> bool {
    !project_ref.is_empty()
        && project_ref
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Parameters of one metric series lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    pub project_ref: String,
    pub attribute: String,
    pub interval: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl MetricQuery {
    /// Daily series over the given window
    pub fn daily(
        project_ref: &str,
        attribute: &str,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            project_ref: project_ref.to_string(),
            attribute: attribute.to_string(),
            interval: DAILY_INTERVAL.to_string(),
            start_date,
            end_date,
        }
    }
}

/// Looks up the subscription of a project
#[async_trait]
pub trait SubscriptionLookup: Send + Sync {
    async fn subscription(&self, project_ref: &str) -> Result<Subscription>;
}

/// Fetches a metric series from the monitoring service
#[async_trait]
pub trait MetricSeriesLookup: Send + Sync {
    async fn series(&self, query: &MetricQuery) -> Result<MetricSeries>;
}

/// Resolves where the upgrade button links to
pub trait UpgradeUrlResolver: Send + Sync {
    fn upgrade_url(&self, project_ref: &str, subscription: Option<&Subscription>) -> String;
}

/// Links into the billing subscription page, opening the panel that fits
/// the project's tier
#[derive(Debug, Clone, Copy, Default)]
pub struct BillingUpgradeUrl;

impl UpgradeUrlResolver for BillingUpgradeUrl {
    fn upgrade_url(&self, project_ref: &str, subscription: Option<&Subscription>) -> String {
        let base = format!("/project/{}/settings/billing/subscription", project_ref);
        match subscription {
            None => base,
            Some(sub) if sub.is_free_tier() => format!("{}?panel=subscriptionPlan", base),
            Some(_) => format!("{}?panel=computeInstance", base),
        }
    }
}
