//! Server configuration

use anyhow::Result;
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Port for the HTTP API
    #[serde(default = "default_port")]
    pub port: u16,

    /// Platform API serving subscriptions and infra monitoring
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token for the platform API
    #[serde(default)]
    pub api_token: Option<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_api_url() -> String {
    "http://platform-api:8000/platform".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            api_url: default_api_url(),
            api_token: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `USAGE_SERVER_*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("USAGE_SERVER"))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder().add_source(source).build()?;
        Ok(config.try_deserialize()?)
    }
}
