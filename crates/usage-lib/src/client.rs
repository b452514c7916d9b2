//! HTTP client for the platform billing and monitoring API

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use tracing::debug;
use url::{ParseError, Url};

use crate::collaborators::{
    is_valid_project_ref, MetricQuery, MetricSeriesLookup, SubscriptionLookup,
};
use crate::error::{Result, UsageError};
use crate::models::{DailyMetricPoint, MetricSeries, Subscription};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Body of an infra-monitoring response
#[derive(Debug, Deserialize)]
struct InfraMonitoringResponse {
    #[serde(default)]
    data: Vec<DailyMetricPoint>,
}

/// Client for the platform API
#[derive(Debug, Clone)]
pub struct MonitoringClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl MonitoringClient {
    /// Create a new client rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        // Url::join replaces the last segment unless the base ends with '/'
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Authenticate requests with a bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/projects/{ref}/{endpoint}` with the ref as a single encoded segment
    fn project_url(&self, project_ref: &str, endpoint: &str) -> Result<Url> {
        if !is_valid_project_ref(project_ref) {
            return Err(UsageError::InvalidProjectRef(project_ref.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UsageError::InvalidUrl(ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["projects", project_ref, endpoint]);
        Ok(url)
    }

    /// Make a GET request
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "GET");
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(UsageError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn iso_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl SubscriptionLookup for MonitoringClient {
    async fn subscription(&self, project_ref: &str) -> Result<Subscription> {
        let url = self.project_url(project_ref, "subscription")?;
        self.get(url).await
    }
}

#[async_trait]
impl MetricSeriesLookup for MonitoringClient {
    async fn series(&self, query: &MetricQuery) -> Result<MetricSeries> {
        let mut url = self.project_url(&query.project_ref, "infra-monitoring")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("attribute", &query.attribute);
            pairs.append_pair("interval", &query.interval);
            if let Some(start) = &query.start_date {
                pairs.append_pair("startDate", &iso_date(start));
            }
            if let Some(end) = &query.end_date {
                pairs.append_pair("endDate", &iso_date(end));
            }
        }

        let response: InfraMonitoringResponse = self.get(url).await?;
        Ok(MetricSeries::loaded(response.data))
    }
}
