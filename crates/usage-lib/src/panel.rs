//! Infrastructure panel assembly
//!
//! Resolves the subscription, fetches the CPU, RAM and I/O budget series
//! concurrently, and builds the view model handed to the section and chart
//! surfaces.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::annotation::last_known_value;
use crate::categories::{
    find_category, UsageAttribute, UsageCategory, INFRA_CATEGORY_KEY, USAGE_CATEGORIES,
};
use crate::collaborators::{
    BillingUpgradeUrl, MetricQuery, MetricSeriesLookup, SubscriptionLookup, UpgradeUrlResolver,
};
use crate::compute::{self, DAILY_BURST_LIMIT_MINS, DEFAULT_INSTANCE_NAME};
use crate::models::{attributes, DailyMetricPoint, MetricSeries, Subscription};
use crate::observability::{StructuredLogger, UsageMetrics};
use crate::threshold::{current_day_budget, evaluate, UsageAlert};

/// Upper bound of every infrastructure chart's y-axis
pub const PERCENT_Y_LIMIT: f64 = 100.0;

pub const IO_BUDGET_EXPLAINER_TITLE: &str = "What is Disk IO Bandwidth?";
pub const IO_BUDGET_EXPLAINER: &str = "Smaller compute instances can burst up to the maximum disk \
IO bandwidth for 30 minutes in a day. Beyond that, the performance reverts to the baseline disk \
IO bandwidth.";

/// Source label used for subscription lookup failures
const SUBSCRIPTION_SOURCE: &str = "subscription";

/// Wall-clock view used for "today" and timestamp rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelContext {
    pub today: NaiveDate,
    pub offset: FixedOffset,
}

impl PanelContext {
    pub fn new(today: NaiveDate, offset: FixedOffset) -> Self {
        Self { today, offset }
    }

    /// Context for the local clock and timezone
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            today: now.date_naive(),
            offset: *now.offset(),
        }
    }
}

/// Everything the chart surface needs to draw one attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub name: String,
    pub unit: String,
    pub attribute: String,
    pub data: Vec<DailyMetricPoint>,
    pub y_limit: f64,
}

impl ChartSpec {
    /// Y-axis tick label
    pub fn format_y(&self, value: f64) -> String {
        format!("{}%", value)
    }

    pub fn values(&self) -> impl Iterator<Item = (&DailyMetricPoint, Option<f64>)> + '_ {
        self.data
            .iter()
            .map(move |point| (point, point.value(&self.attribute)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ChartState {
    Loading,
    Ready(ChartSpec),
}

/// Bandwidth overview of the current compute instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputeOverview {
    pub instance_name: String,
    pub max_bandwidth_mbps: u32,
    pub base_bandwidth_mbps: u32,
    pub daily_burst_limit_mins: u32,
}

/// Extra content of the disk I/O budget section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IoBudgetDetails {
    pub remaining_percent: f64,
    pub alert: UsageAlert,
    pub upgrade_url: String,
    pub overview: ComputeOverview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSection {
    pub anchor: String,
    pub key: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_known_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_budget: Option<IoBudgetDetails>,
    pub chart_heading: String,
    pub chart_paragraphs: Vec<String>,
    pub chart: ChartState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfrastructurePanel {
    pub project_ref: String,
    pub title: String,
    pub description: String,
    pub is_free_tier: bool,
    pub sections: Vec<AttributeSection>,
}

impl InfrastructurePanel {
    pub fn section(&self, key: &str) -> Option<&AttributeSection> {
        self.sections.iter().find(|section| section.key == key)
    }

    pub fn io_budget(&self) -> Option<&IoBudgetDetails> {
        self.section(attributes::DISK_IO_BUDGET)
            .and_then(|section| section.io_budget.as_ref())
    }
}

/// Builds infrastructure panels from the billing and monitoring services
#[derive(Clone)]
pub struct InfrastructurePanelBuilder {
    subscriptions: Arc<dyn SubscriptionLookup>,
    metrics: Arc<dyn MetricSeriesLookup>,
    upgrade_urls: Arc<dyn UpgradeUrlResolver>,
    categories: &'static [UsageCategory],
    usage_metrics: UsageMetrics,
    logger: StructuredLogger,
}

impl InfrastructurePanelBuilder {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionLookup>,
        metrics: Arc<dyn MetricSeriesLookup>,
    ) -> Self {
        Self {
            subscriptions,
            metrics,
            upgrade_urls: Arc::new(BillingUpgradeUrl),
            categories: USAGE_CATEGORIES,
            usage_metrics: UsageMetrics::new(),
            logger: StructuredLogger::new("infra-usage"),
        }
    }

    pub fn with_upgrade_url_resolver(mut self, resolver: Arc<dyn UpgradeUrlResolver>) -> Self {
        self.upgrade_urls = resolver;
        self
    }

    /// Replace the category table
    pub fn with_categories(mut self, categories: &'static [UsageCategory]) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Build the panel for a project.
    ///
    /// Returns `None` when the infra category has no metadata. Lookup
    /// failures never fail the panel: a missing subscription behaves like
    /// a project without add-ons and a failed series renders empty.
    pub async fn build(&self, project_ref: &str, ctx: &PanelContext) -> Option<InfrastructurePanel> {
        let started = Instant::now();

        let subscription = match self.subscriptions.subscription(project_ref).await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                self.usage_metrics.inc_fetch_errors(SUBSCRIPTION_SOURCE);
                self.logger
                    .log_fetch_failure(project_ref, SUBSCRIPTION_SOURCE, &e.to_string());
                None
            }
        };

        let Some(category) = find_category(self.categories, INFRA_CATEGORY_KEY) else {
            self.usage_metrics.inc_panels_suppressed();
            self.logger
                .log_panel_suppressed(project_ref, INFRA_CATEGORY_KEY);
            return None;
        };

        let start_date = subscription.as_ref().and_then(Subscription::period_start);
        let end_date = subscription.as_ref().and_then(Subscription::period_end);

        let (cpu, ram, io) = tokio::join!(
            self.fetch_series(project_ref, attributes::CPU_USAGE, start_date, end_date),
            self.fetch_series(project_ref, attributes::RAM_USAGE, start_date, end_date),
            self.fetch_series(project_ref, attributes::DISK_IO_BUDGET, start_date, end_date),
        );

        let is_free_tier = subscription
            .as_ref()
            .map(Subscription::is_free_tier)
            .unwrap_or(false);
        let remaining_percent = current_day_budget(&io.data, ctx.today);
        let alert = evaluate(remaining_percent, is_free_tier);
        self.usage_metrics.record_evaluation(alert.severity());
        self.logger
            .log_evaluation(project_ref, remaining_percent, alert.severity());

        let io_budget = IoBudgetDetails {
            remaining_percent,
            alert,
            upgrade_url: self
                .upgrade_urls
                .upgrade_url(project_ref, subscription.as_ref()),
            overview: compute_overview(subscription.as_ref()),
        };

        let mut series: HashMap<&str, MetricSeries> = HashMap::from([
            (attributes::CPU_USAGE, cpu),
            (attributes::RAM_USAGE, ram),
            (attributes::DISK_IO_BUDGET, io),
        ]);

        let sections = category
            .attributes
            .iter()
            .map(|attribute| {
                let data = series.remove(attribute.key).unwrap_or_default();
                let details =
                    (attribute.key == attributes::DISK_IO_BUDGET).then(|| io_budget.clone());
                build_section(attribute, data, details, ctx)
            })
            .collect::<Vec<_>>();

        let elapsed = started.elapsed();
        self.usage_metrics.observe_panel_build(elapsed.as_secs_f64());
        self.logger
            .log_panel_built(project_ref, sections.len(), elapsed.as_secs_f64() * 1000.0);

        Some(InfrastructurePanel {
            project_ref: project_ref.to_string(),
            title: category.name.to_string(),
            description: category.description.to_string(),
            is_free_tier,
            sections,
        })
    }

    async fn fetch_series(
        &self,
        project_ref: &str,
        attribute: &str,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> MetricSeries {
        let query = MetricQuery::daily(project_ref, attribute, start_date, end_date);
        match self.metrics.series(&query).await {
            Ok(series) => series,
            Err(e) => {
                self.usage_metrics.inc_fetch_errors(attribute);
                self.logger
                    .log_fetch_failure(project_ref, attribute, &e.to_string());
                MetricSeries::default()
            }
        }
    }
}

fn compute_overview(subscription: Option<&Subscription>) -> ComputeOverview {
    let addon = subscription.and_then(Subscription::compute_instance);
    let spec = compute::resolve(addon.map(|a| a.product_id.as_str()));
    ComputeOverview {
        instance_name: addon
            .map(|a| a.name.clone())
            .unwrap_or_else(|| DEFAULT_INSTANCE_NAME.to_string()),
        max_bandwidth_mbps: spec.max_bandwidth,
        base_bandwidth_mbps: spec.base_bandwidth,
        daily_burst_limit_mins: DAILY_BURST_LIMIT_MINS,
    }
}

fn build_section(
    attribute: &UsageAttribute,
    series: MetricSeries,
    io_budget: Option<IoBudgetDetails>,
    ctx: &PanelContext,
) -> AttributeSection {
    let last_known_value = last_known_value(&series.data, attribute.attribute, &ctx.offset);
    let chart = if series.is_loading {
        ChartState::Loading
    } else {
        ChartState::Ready(ChartSpec {
            name: attribute.name.to_string(),
            unit: attribute.unit.to_string(),
            attribute: attribute.attribute.to_string(),
            data: series.data,
            y_limit: PERCENT_Y_LIMIT,
        })
    };

    AttributeSection {
        anchor: attribute.anchor.to_string(),
        key: attribute.key.to_string(),
        title: attribute.name.to_string(),
        description: attribute.description.to_string(),
        last_known_value,
        io_budget,
        chart_heading: attribute.chart_heading(),
        chart_paragraphs: attribute.chart_paragraphs(),
        chart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, UsageError};
    use crate::models::{BillingPeriod, SubscriptionAddon, SubscriptionTier};
    use crate::threshold::UsageSeverity;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct StubSubscriptions(Option<Subscription>);

    #[async_trait]
    impl SubscriptionLookup for StubSubscriptions {
        async fn subscription(&self, _project_ref: &str) -> Result<Subscription> {
            self.0.clone().ok_or(UsageError::Api {
                status: 500,
                body: "billing unavailable".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct StubSeries {
        series: HashMap<String, MetricSeries>,
        failing: Vec<String>,
        queries: Mutex<Vec<MetricQuery>>,
    }

    impl StubSeries {
        fn with(mut self, attribute: &str, series: MetricSeries) -> Self {
            self.series.insert(attribute.to_string(), series);
            self
        }

        fn failing(mut self, attribute: &str) -> Self {
            self.failing.push(attribute.to_string());
            self
        }
    }

    #[async_trait]
    impl MetricSeriesLookup for StubSeries {
        async fn series(&self, query: &MetricQuery) -> Result<MetricSeries> {
            self.queries.lock().unwrap().push(query.clone());
            if self.failing.contains(&query.attribute) {
                return Err(UsageError::Api {
                    status: 503,
                    body: "monitoring unavailable".to_string(),
                });
            }
            Ok(self
                .series
                .get(&query.attribute)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn ctx() -> PanelContext {
        PanelContext::new(
            NaiveDate::from_ymd_opt(2023, 5, 10).unwrap(),
            FixedOffset::east_opt(0).unwrap(),
        )
    }

    fn subscription(tier: &str, addons: &[(&str, &str)]) -> Subscription {
        Subscription {
            billing: BillingPeriod {
                current_period_start: Some(1_682_899_200),
                current_period_end: Some(1_685_577_600),
            },
            tier: SubscriptionTier {
                product_id: tier.to_string(),
                name: None,
            },
            addons: addons
                .iter()
                .map(|(id, name)| SubscriptionAddon {
                    product_id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        }
    }

    fn point(day: u32, loop_id: u32, attribute: &str, value: f64) -> DailyMetricPoint {
        let start = Utc.with_ymd_and_hms(2023, 5, day, 0, 0, 0).unwrap();
        DailyMetricPoint::new(start, loop_id).with_value(attribute, value)
    }

    fn io_series(today_budget: f64) -> MetricSeries {
        MetricSeries::loaded(vec![
            point(9, 0, attributes::DISK_IO_BUDGET, 100.0),
            point(10, 1, attributes::DISK_IO_BUDGET, today_budget),
        ])
    }

    fn builder(sub: Option<Subscription>, series: StubSeries) -> InfrastructurePanelBuilder {
        InfrastructurePanelBuilder::new(Arc::new(StubSubscriptions(sub)), Arc::new(series))
    }

    #[tokio::test]
    async fn test_depleted_budget_on_free_tier() {
        let series = StubSeries::default().with(attributes::DISK_IO_BUDGET, io_series(0.0));
        let panel = builder(Some(subscription("tier_free", &[])), series)
            .build("abc", &ctx())
            .await
            .unwrap();

        let io = panel.io_budget().unwrap();
        assert_eq!(io.alert.severity(), UsageSeverity::Depleted);
        assert_eq!(io.alert.cta_label(), Some("Upgrade project"));
        assert_eq!(
            io.upgrade_url,
            "/project/abc/settings/billing/subscription?panel=subscriptionPlan"
        );
        assert!(panel.is_free_tier);
    }

    #[tokio::test]
    async fn test_warning_on_paid_tier_with_large_instance() {
        let series = StubSeries::default().with(attributes::DISK_IO_BUDGET, io_series(15.0));
        let sub = subscription("tier_pro", &[("addon_instance_large", "Large")]);
        let panel = builder(Some(sub), series).build("abc", &ctx()).await.unwrap();

        let io = panel.io_budget().unwrap();
        assert_eq!(io.remaining_percent, 15.0);
        assert_eq!(io.alert.severity(), UsageSeverity::Warning);
        assert_eq!(io.alert.cta_label(), Some("Change compute add-on"));
        assert_eq!(
            io.overview,
            ComputeOverview {
                instance_name: "Large".to_string(),
                max_bandwidth_mbps: 4750,
                base_bandwidth_mbps: 630,
                daily_burst_limit_mins: 30,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_today_sample_is_normal() {
        let series = StubSeries::default().with(
            attributes::DISK_IO_BUDGET,
            MetricSeries::loaded(vec![point(9, 0, attributes::DISK_IO_BUDGET, 3.0)]),
        );
        let panel = builder(Some(subscription("tier_free", &[])), series)
            .build("abc", &ctx())
            .await
            .unwrap();

        let io = panel.io_budget().unwrap();
        assert_eq!(io.remaining_percent, 100.0);
        assert_eq!(io.alert, UsageAlert::Normal);
    }

    #[tokio::test]
    async fn test_missing_category_suppresses_panel() {
        let panel = builder(Some(subscription("tier_free", &[])), StubSeries::default())
            .with_categories(&[])
            .build("abc", &ctx())
            .await;
        assert!(panel.is_none());
    }

    #[tokio::test]
    async fn test_sections_follow_category_order() {
        let panel = builder(Some(subscription("tier_pro", &[])), StubSeries::default())
            .build("abc", &ctx())
            .await
            .unwrap();

        assert_eq!(panel.title, "Infrastructure");
        let keys: Vec<_> = panel.sections.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["cpu_usage", "ram_usage", "disk_io_budget"]);
        assert!(panel.section("cpu_usage").unwrap().io_budget.is_none());
        assert!(panel.section("ram_usage").unwrap().io_budget.is_none());
        assert_eq!(
            panel.section("ram_usage").unwrap().chart_heading,
            "Max memory usage each day"
        );
    }

    #[tokio::test]
    async fn test_loading_series_yields_loading_chart() {
        let series = StubSeries::default().with(attributes::CPU_USAGE, MetricSeries::loading());
        let panel = builder(Some(subscription("tier_pro", &[])), series)
            .build("abc", &ctx())
            .await
            .unwrap();

        assert_eq!(panel.section("cpu_usage").unwrap().chart, ChartState::Loading);
        assert!(matches!(
            panel.section("ram_usage").unwrap().chart,
            ChartState::Ready(_)
        ));
    }

    #[tokio::test]
    async fn test_chart_spec_carries_attribute_and_limit() {
        let cpu = MetricSeries::loaded(vec![point(9, 0, "max_cpu_usage", 45.0)]);
        let series = StubSeries::default().with(attributes::CPU_USAGE, cpu);
        let panel = builder(Some(subscription("tier_pro", &[])), series)
            .build("abc", &ctx())
            .await
            .unwrap();

        let ChartState::Ready(chart) = &panel.section("cpu_usage").unwrap().chart else {
            panic!("cpu chart should be ready");
        };
        assert_eq!(chart.name, "CPU");
        assert_eq!(chart.attribute, "max_cpu_usage");
        assert_eq!(chart.y_limit, 100.0);
        assert_eq!(chart.format_y(45.0), "45%");
        assert_eq!(chart.values().next().unwrap().1, Some(45.0));
    }

    #[tokio::test]
    async fn test_last_known_value_annotation() {
        let cpu = MetricSeries::loaded(vec![
            point(8, 0, "max_cpu_usage", 10.0),
            point(9, 1, "max_cpu_usage", 0.0),
        ]);
        let series = StubSeries::default().with(attributes::CPU_USAGE, cpu);
        let panel = builder(Some(subscription("tier_pro", &[])), series)
            .build("abc", &ctx())
            .await
            .unwrap();

        assert_eq!(
            panel.section("cpu_usage").unwrap().last_known_value.as_deref(),
            Some("08 May 2023, 00:00am (+0000)")
        );
        assert!(panel.section("ram_usage").unwrap().last_known_value.is_none());
    }

    #[tokio::test]
    async fn test_queries_use_billing_period() {
        let series = Arc::new(StubSeries::default());
        let builder = InfrastructurePanelBuilder::new(
            Arc::new(StubSubscriptions(Some(subscription("tier_pro", &[])))),
            series.clone(),
        );
        builder.build("abc", &ctx()).await.unwrap();

        let queries = series.queries.lock().unwrap();
        assert_eq!(queries.len(), 3);
        for query in queries.iter() {
            assert_eq!(query.project_ref, "abc");
            assert_eq!(query.interval, "1d");
            assert_eq!(
                query.start_date,
                Some(Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap())
            );
            assert_eq!(
                query.end_date,
                Some(Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap())
            );
        }
    }

    #[tokio::test]
    async fn test_subscription_failure_falls_back_to_micro() {
        let series = Arc::new(StubSeries::default().with(attributes::DISK_IO_BUDGET, io_series(5.0)));
        let builder = InfrastructurePanelBuilder::new(Arc::new(StubSubscriptions(None)), series.clone());
        let panel = builder.build("abc", &ctx()).await.unwrap();

        let io = panel.io_budget().unwrap();
        assert_eq!(io.overview.instance_name, "Micro");
        assert_eq!(io.overview.base_bandwidth_mbps, 87);
        assert_eq!(io.alert.cta_label(), Some("Change compute add-on"));
        assert_eq!(io.upgrade_url, "/project/abc/settings/billing/subscription");
        assert!(series
            .queries
            .lock()
            .unwrap()
            .iter()
            .all(|q| q.start_date.is_none() && q.end_date.is_none()));
    }

    #[tokio::test]
    async fn test_failed_series_renders_empty_chart() {
        let series = StubSeries::default()
            .with(attributes::DISK_IO_BUDGET, io_series(0.0))
            .failing(attributes::RAM_USAGE);
        let panel = builder(Some(subscription("tier_pro", &[])), series)
            .build("abc", &ctx())
            .await
            .unwrap();

        match &panel.section("ram_usage").unwrap().chart {
            ChartState::Ready(chart) => assert!(chart.data.is_empty()),
            ChartState::Loading => panic!("failed series should not be loading"),
        }
        assert_eq!(
            panel.io_budget().unwrap().alert.severity(),
            UsageSeverity::Depleted
        );
    }

    struct FixedUrl;

    impl UpgradeUrlResolver for FixedUrl {
        fn upgrade_url(&self, project_ref: &str, _subscription: Option<&Subscription>) -> String {
            format!("https://billing.example.com/{}", project_ref)
        }
    }

    #[tokio::test]
    async fn test_custom_upgrade_url_resolver() {
        let panel = builder(Some(subscription("tier_free", &[])), StubSeries::default())
            .with_upgrade_url_resolver(Arc::new(FixedUrl))
            .build("xyz", &ctx())
            .await
            .unwrap();
        assert_eq!(
            panel.io_budget().unwrap().upgrade_url,
            "https://billing.example.com/xyz"
        );
    }

    #[test]
    fn test_panel_serializes_chart_state() {
        let section = build_section(
            &USAGE_CATEGORIES[0].attributes[0],
            MetricSeries::loading(),
            None,
            &ctx(),
        );
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["chart"]["state"], "loading");
        assert!(json.get("io_budget").is_none());
    }
}
