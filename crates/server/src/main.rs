//! Usage Server - serves infrastructure usage panels
//!
//! Assembles the infrastructure section of the billing usage page from
//! the platform's subscription and monitoring endpoints.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use usage_lib::{InfrastructurePanelBuilder, MonitoringClient, StructuredLogger};

mod api;
mod config;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting usage-server");

    let config = config::ServerConfig::load()?;
    info!(api_url = %config.api_url, "Server configured");

    let logger = StructuredLogger::new("usage-server");
    logger.log_startup(SERVER_VERSION);

    let mut client = MonitoringClient::new(&config.api_url)?;
    if let Some(token) = &config.api_token {
        client = client.with_token(token.clone());
    }
    let client = Arc::new(client);

    let panels =
        InfrastructurePanelBuilder::new(client.clone(), client).with_logger(logger.clone());
    let app_state = Arc::new(api::AppState::new(panels));

    let api_handle = tokio::spawn(api::serve(config.port, app_state));

    tokio::select! {
        result = api_handle => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
