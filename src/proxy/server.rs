//! Server setup and initialization

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::assets::DirAssets;
use crate::config::Config;
use crate::quota;

use super::handlers::{asset_handler, chat_handler};
use super::state::ProxyState;
use super::upstream::AnthropicUpstream;
use super::CHAT_PATH;

/// Build the router: the chat path for every method, assets for the rest
pub fn build_router(state: ProxyState) -> Router {
    Router::new()
        .route(CHAT_PATH, any(chat_handler))
        .fallback(asset_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Assemble `ProxyState` from configuration
pub async fn build_state(config: &Config) -> Result<ProxyState> {
    let upstream = AnthropicUpstream::from_config(&config.upstream)?;

    let quota = quota::from_config(&config.quota)
        .await
        .context("Failed to initialize quota store")?;
    if quota.is_none() {
        tracing::info!("Rate limiting disabled (quota backend = none)");
    }

    let assets = DirAssets::new(&config.assets.dir);
    if !assets.root().is_dir() {
        tracing::warn!(
            "Asset directory {} does not exist; non-API paths will return 404",
            assets.root().display()
        );
    }

    Ok(ProxyState::new(
        Arc::new(upstream),
        quota,
        Arc::new(assets),
        config.quota.client_ip_header.clone(),
    )
    .with_body_limit(config.upstream.max_body_bytes))
}

/// Start the gateway server
pub async fn start_proxy(
    config: Config,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<()> {
    let bind_addr = config.bind_addr;
    let state = build_state(&config).await?;
    let app = build_router(state);

    tracing::info!("Starting gateway on {}", bind_addr);

    let listener = TcpListener::bind(bind_addr)
        .await
        .context("Failed to bind to address")?;

    tracing::info!(
        "Gateway listening on {} (upstream: {})",
        bind_addr,
        config.upstream.url
    );

    // Stop accepting on shutdown signal, finish in-flight requests
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
        })
        .await
        .context("Server error")?;

    tracing::info!("Gateway shut down gracefully");
    Ok(())
}
