//! Infrastructure usage library for the billing dashboard
//!
//! This crate provides the core functionality for:
//! - I/O budget threshold evaluation and upgrade prompts
//! - Compute instance bandwidth specs
//! - Usage category metadata and last-known-value annotations
//! - Assembling the infrastructure panel from monitoring collaborators
//! - Metrics and structured logging

pub mod annotation;
pub mod categories;
pub mod client;
pub mod collaborators;
pub mod compute;
pub mod error;
pub mod models;
pub mod observability;
pub mod panel;
pub mod threshold;

pub use client::MonitoringClient;
pub use collaborators::{
    is_valid_project_ref, BillingUpgradeUrl, MetricQuery, MetricSeriesLookup, SubscriptionLookup,
    UpgradeUrlResolver,
};
pub use compute::ComputeInstanceSpec;
pub use error::{Result, UsageError};
pub use models::*;
pub use observability::{StructuredLogger, UsageMetrics};
pub use panel::{InfrastructurePanel, InfrastructurePanelBuilder, PanelContext};
pub use threshold::{evaluate, UsageAlert, UsageSeverity};
