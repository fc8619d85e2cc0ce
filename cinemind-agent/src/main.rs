//! cinemind-agent - movie review rating service
//!
//! Serves the review UI and the HTTP API: sentiment-based rating of audience
//! reviews, TMDB metadata lookup and language-model review writing.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cinemind_agent::{build_router, services::ReviewAgent, AppState};
use cinemind_common::config::CONFIG_PATH_ENV;
use cinemind_common::TomlConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "cinemind-agent")]
#[command(about = "Movie review rating agent", long_about = None)]
struct Args {
    /// Path to config.toml
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Listen address (overrides [server].host)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides [server].port)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting CineMind agent (cinemind-agent) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let agent = if config.has_api_keys() {
        match ReviewAgent::from_config(&config) {
            Ok(agent) => {
                info!(model = %config.llm.model, "✓ Review agent ready");
                Some(agent)
            }
            Err(e) => {
                warn!("Review agent unavailable: {}", e);
                None
            }
        }
    } else {
        warn!("TMDB and language model API keys not configured; review generation disabled");
        warn!("Only /api/rating/analyze and /health are usable");
        None
    };

    let state = AppState::new(&config, agent);
    let app = build_router(state);

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("cinemind-agent listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
