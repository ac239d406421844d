//! Flourish - one-click chat draft rewriting.
//!
//! Two halves: `serve` runs the rewrite backend, `attach` hooks a Chrome tab
//! over CDP and drives the in-page trigger.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use flourish_cdp::{CdpClient, CdpPage, CdpTrigger};
use flourish_client::RewriteClient;
use flourish_controller::orchestrator::{Orchestrator, OrchestratorConfig};
use flourish_server::{RewriteServer, ServerConfig, UpstreamConfig};

mod cli;

use cli::{Cli, Commands};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

async fn run_serve(
    host: String,
    port: u16,
    upstream_url: String,
    api_key: String,
    model: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig {
        host,
        port,
        upstream: UpstreamConfig {
            api_url: upstream_url,
            api_key,
            model,
            ..UpstreamConfig::default()
        },
    };
    RewriteServer::new(config).run().await
}

async fn run_attach(
    endpoint: String,
    page_url: Option<String>,
    api: String,
    mode: String,
    intensity: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = Arc::new(CdpClient::connect(&endpoint, page_url.as_deref()).await?);
    info!(url = client.page_url(), "attached to page");

    let page = Arc::new(CdpPage::attach(Arc::clone(&client)).await?);
    let trigger = Arc::new(CdpTrigger::new(client));
    let service = Arc::new(RewriteClient::new(&api));

    let mut config = OrchestratorConfig {
        mode,
        ..OrchestratorConfig::default()
    };
    if let Some(intensity) = intensity {
        config
            .options
            .insert("intensity".to_string(), serde_json::json!(intensity));
    }

    let orchestrator = Orchestrator::new(page, trigger, service, config);
    orchestrator.run().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            host,
            port,
            upstream_url,
            api_key,
            model,
        } => run_serve(host, port, upstream_url, api_key, model).await,
        Commands::Attach {
            endpoint,
            page_url,
            api,
            mode,
            intensity,
        } => run_attach(endpoint, page_url, api, mode, intensity).await,
    }
}
