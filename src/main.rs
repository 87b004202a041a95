// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{Context, Result};
use clap::Parser;
use snapsearch_agent::app::{create_router, snapsearch_state, AppState, VERSION};
use snapsearch_agent::models::settings::Settings;
use snapsearch_agent::services::interceptor::Hooks;
use std::net::{IpAddr, SocketAddr};
use tracing_subscriber::EnvFilter;

/// Demo server serving snapshots of a JavaScript page to search engine robots.
#[derive(Debug, Parser)]
#[command(version = VERSION)]
struct Args {
    /// Address to bind to.
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let settings = Settings::from_env().context("Failed to load SnapSearch settings")?;
    let api_url = settings.client.api_url.clone();

    let hooks = Hooks::default()
        .after_intercept(|url, result| tracing::debug!(url, ?result, "Interception finished"));
    let snapsearch = snapsearch_state(settings, hooks).context("Invalid SnapSearch configuration")?;

    let app = create_router(AppState { api_url }, snapsearch);

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("snapsearch-agent v{} listening on {}", VERSION, addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
