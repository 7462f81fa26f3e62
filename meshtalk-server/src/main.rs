use anyhow::{Context, Result};
use axum::{Router, routing::get};
use meshtalk_server::{Relay, SignalingService, ws_handler};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let addr: SocketAddr = env::var("MESHTALK_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_owned())
        .parse()
        .context("MESHTALK_ADDR is not a valid socket address")?;

    let (relay_cmd_tx, relay_cmd_rx) = mpsc::channel(256);
    let service = SignalingService::new(relay_cmd_tx);

    let relay = Relay::new(relay_cmd_rx, Arc::new(service.clone()));
    tokio::spawn(relay.run());

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(service);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Signaling relay listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
