use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::app::{create_context, create_router};
use crate::configs::Settings;
use crate::services::TcpHubConnector;

pub mod app;
pub mod configs;
pub mod errors;
pub mod handles;
pub mod models;
pub mod repositories;
pub mod services;
#[cfg(any(test, feature = "mock"))]
pub mod testing;

pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let context = create_context(settings, Arc::new(TcpHubConnector)).await?;

    let transmitter = context.registry.transmitter();
    if let Err(e) = transmitter.test_connection().await {
        tracing::warn!(
            "hub {} not reachable at startup, will retry on first command: {}",
            transmitter.hub().address(),
            e
        );
    }

    let app = create_router(&context);

    let ip_addr = settings
        .server
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("invalid server host {}", settings.server.host))?;

    let address = SocketAddr::from((ip_addr, settings.server.port));

    let listener = TcpListener::bind(&address).await?;

    tracing::info!("listening on {:?}", address);

    let shutdown = context.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.send_replace(true);
        })
        .await?;

    context.registry.shutdown_all().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
