// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Transport assembly and serving.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use s2t_gateway_core::application::dispatcher::Dispatcher;
use s2t_gateway_core::application::registry::ToolRegistry;
use s2t_gateway_core::infrastructure::accelerator_client::AcceleratorClient;
use s2t_gateway_core::infrastructure::config::GatewayConfig;
use s2t_gateway_core::presentation::origin::OriginPolicy;
use s2t_gateway_core::presentation::shutdown::{self, ShutdownCoordinator};
use s2t_gateway_core::presentation::sse_legacy::{self, LegacyConnectionRegistry, LegacySseState};
use s2t_gateway_core::presentation::stdio::StdioTransport;
use s2t_gateway_core::presentation::streamable_http::{
    self, SessionManager, StreamableHttpState,
};

/// Run the HTTP transports until a termination signal drains them.
pub async fn serve(config: GatewayConfig) -> Result<()> {
    let registry = Arc::new(ToolRegistry::new());
    let tool_count = registry.len();
    let client = Arc::new(AcceleratorClient::new(
        config.base_url.clone(),
        config.api_key.clone(),
    ));
    let origins = Arc::new(OriginPolicy::new(config.allowed_origins.clone()));
    let sessions = Arc::new(SessionManager::new());
    let legacy = Arc::new(LegacyConnectionRegistry::new());

    let app = streamable_http::router(StreamableHttpState::new(
        registry.clone(),
        client.clone(),
        origins.clone(),
        sessions.clone(),
        legacy.clone(),
    ))
    .merge(sse_legacy::router(LegacySseState::new(
        registry,
        client,
        origins,
        legacy.clone(),
    )));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(tools = tool_count, base_url = %config.base_url, "gateway configured");
    info!("gateway listening on {}", addr);

    let coordinator = ShutdownCoordinator::new(sessions, legacy);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::graceful(coordinator))
        .await
        .context("HTTP server failed")?;

    info!("gateway stopped");
    Ok(())
}

/// Run the point-to-point stdio transport: one session per process.
pub async fn run_stdio(config: GatewayConfig) -> Result<()> {
    let registry = Arc::new(ToolRegistry::new());
    let client = Arc::new(AcceleratorClient::new(config.base_url, config.api_key));
    let dispatcher = Dispatcher::new(registry, client);

    StdioTransport::new(dispatcher).run().await
}
