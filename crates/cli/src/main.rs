//! Infrastructure usage CLI
//!
//! A command-line tool for checking IO budget alerts, browsing compute
//! instance specs, and rendering a project's infrastructure usage panel.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{evaluate, panel, specs};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use usage_lib::MonitoringClient;

const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Infrastructure usage CLI
#[derive(Parser)]
#[command(name = "infra-usage")]
#[command(author, version, about = "CLI for Infrastructure Usage", long_about = None)]
pub struct Cli {
    /// Platform API URL (can also be set via INFRA_USAGE_API_URL env var)
    #[arg(long, env = "INFRA_USAGE_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for the platform API
    #[arg(long, env = "INFRA_USAGE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a remaining IO budget percentage
    Evaluate {
        /// Remaining IO budget for today, in percent
        #[arg(long, allow_negative_numbers = true)]
        remaining: f64,

        /// Project is on the free tier
        #[arg(long)]
        free_tier: bool,
    },

    /// Show compute instance bandwidth specs
    Specs {
        /// Resolve a single add-on product id (falls back to micro)
        #[arg(long)]
        instance: Option<String>,
    },

    /// Render the infrastructure usage panel of a project
    Show {
        /// Project reference
        project_ref: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();

    let config = config::Config::load()?;
    let format = cli
        .format
        .or_else(|| config.output_format())
        .unwrap_or_default();

    match cli.command {
        Commands::Evaluate {
            remaining,
            free_tier,
        } => {
            evaluate::show_evaluation(remaining, free_tier, format)?;
        }
        Commands::Specs { instance } => {
            specs::show_specs(instance.as_deref(), format)?;
        }
        Commands::Show { project_ref } => {
            let api_url = cli
                .api_url
                .or(config.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string());
            let mut client = MonitoringClient::new(&api_url)?;
            if let Some(token) = cli.token.or(config.token) {
                client = client.with_token(token);
            }
            panel::show_panel(client, &project_ref, format).await?;
        }
    }

    Ok(())
}
