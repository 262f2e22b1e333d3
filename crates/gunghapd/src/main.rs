//! gunghapd - compatibility report service
//!
//! Serves the report endpoint and the chat relay in front of the Gemini API.

use anyhow::{Context, Result};
use clap::Parser;
use gunghapd::config::mask_key;
use gunghapd::{AppState, ServiceConfig};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "gunghapd")]
#[command(about = "Compatibility report service", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to listen on (overrides GUNGHAP_BIND)
    #[arg(long)]
    bind: Option<String>,

    /// Gemini model identifier (overrides GEMINI_MODEL)
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("[BOOT] gunghapd v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = ServiceConfig::from_env();
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }

    match config.api_key.as_deref() {
        Some(key) => info!("[BOOT] Credential loaded ({})", mask_key(key)),
        None => warn!("[BOOT] GEMINI_API_KEY is not set"),
    }
    info!(
        "[BOOT] Model {} at {} (timeout {}s)",
        config.model, config.base_url, config.request_timeout_secs
    );

    let state = AppState::new(config).context("Failed to initialise model client")?;
    gunghapd::server::run(state).await
}
