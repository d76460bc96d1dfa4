use anyhow::Context;
use clap::Parser;
use portal_api::{create_router, AppState, Config, GatewayClient};
use portal_engine::SessionStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let config = Config::parse();

    let session = Arc::new(SessionStore::new());
    let gateway = GatewayClient::new(&config.gateway_base, config.upstream_timeout(), session)
        .context("building gateway client")?;
    let state = AppState::new(gateway, config.retry_policy());
    let app = create_router(state, &config.public_dir);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("binding {addr}"))?;
    info!(target: "portal", "Server running at http://{} (gateway {})", addr, config.gateway_base);
    axum::serve(listener, app).await?;
    Ok(())
}
