//! Observability infrastructure for usage panels
//!
//! Provides:
//! - Prometheus metrics (alert evaluations, fetch errors, panel build latency)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::threshold::UsageSeverity;

/// Histogram buckets for panel build latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<UsageMetricsInner> = OnceLock::new();

struct UsageMetricsInner {
    alert_evaluations: IntCounterVec,
    fetch_errors: IntCounterVec,
    panels_built: IntCounter,
    panels_suppressed: IntCounter,
    panel_build_seconds: Histogram,
}

impl UsageMetricsInner {
    fn new() -> Self {
        Self {
            alert_evaluations: register_int_counter_vec!(
                "infra_usage_alert_evaluations_total",
                "I/O budget evaluations by resulting severity",
                &["severity"]
            )
            .expect("Failed to register alert_evaluations"),

            fetch_errors: register_int_counter_vec!(
                "infra_usage_fetch_errors_total",
                "Failed collaborator lookups by source",
                &["source"]
            )
            .expect("Failed to register fetch_errors"),

            panels_built: register_int_counter!(
                "infra_usage_panels_built_total",
                "Infrastructure panels assembled"
            )
            .expect("Failed to register panels_built"),

            panels_suppressed: register_int_counter!(
                "infra_usage_panels_suppressed_total",
                "Panels not rendered because category metadata was missing"
            )
            .expect("Failed to register panels_suppressed"),

            panel_build_seconds: register_histogram!(
                "infra_usage_panel_build_seconds",
                "Time spent assembling an infrastructure panel",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register panel_build_seconds"),
        }
    }
}

/// Usage metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share it.
#[derive(Clone)]
pub struct UsageMetrics {
    _private: (),
}

impl Default for UsageMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(UsageMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &UsageMetricsInner {
        GLOBAL_METRICS.get_or_init(UsageMetricsInner::new)
    }

    pub fn record_evaluation(&self, severity: UsageSeverity) {
        self.inner()
            .alert_evaluations
            .with_label_values(&[severity.as_str()])
            .inc();
    }

    pub fn evaluations(&self, severity: UsageSeverity) -> u64 {
        self.inner()
            .alert_evaluations
            .with_label_values(&[severity.as_str()])
            .get()
    }

    pub fn inc_fetch_errors(&self, source: &str) {
        self.inner().fetch_errors.with_label_values(&[source]).inc();
    }

    pub fn fetch_errors(&self, source: &str) -> u64 {
        self.inner().fetch_errors.with_label_values(&[source]).get()
    }

    pub fn observe_panel_build(&self, duration_secs: f64) {
        self.inner().panels_built.inc();
        self.inner().panel_build_seconds.observe(duration_secs);
    }

    pub fn inc_panels_suppressed(&self) {
        self.inner().panels_suppressed.inc();
    }
}

/// Structured logger for usage panel events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Log the outcome of an I/O budget evaluation
    pub fn log_evaluation(&self, project_ref: &str, remaining_percent: f64, severity: UsageSeverity) {
        match severity {
            UsageSeverity::Normal => debug!(
                event = "io_budget_evaluated",
                service = %self.service,
                project_ref = %project_ref,
                remaining_percent = remaining_percent,
                severity = %severity,
                "IO budget within limits"
            ),
            _ => info!(
                event = "io_budget_evaluated",
                service = %self.service,
                project_ref = %project_ref,
                remaining_percent = remaining_percent,
                severity = %severity,
                "IO budget running low"
            ),
        }
    }

    /// Log a failed collaborator lookup
    pub fn log_fetch_failure(&self, project_ref: &str, source: &str, error: &str) {
        warn!(
            event = "fetch_failed",
            service = %self.service,
            project_ref = %project_ref,
            source = %source,
            error = %error,
            "Lookup failed, rendering without it"
        );
    }

    pub fn log_panel_built(&self, project_ref: &str, sections: usize, elapsed_ms: f64) {
        info!(
            event = "panel_built",
            service = %self.service,
            project_ref = %project_ref,
            sections = sections,
            elapsed_ms = elapsed_ms,
            "Infrastructure panel assembled"
        );
    }

    pub fn log_panel_suppressed(&self, project_ref: &str, category: &str) {
        warn!(
            event = "panel_suppressed",
            service = %self.service,
            project_ref = %project_ref,
            category = %category,
            "No category metadata, skipping panel"
        );
    }

    pub fn log_startup(&self, version: &str) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            "Usage service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Usage service shutting down"
        );
    }
}
