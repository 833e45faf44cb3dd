// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain HTTP liveness endpoint for hosts that expect a web port.

use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use sequin_config::model::KeepaliveConfig;
use sequin_core::SequinError;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
struct KeepaliveState {
    started: Instant,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(KeepaliveState {
            started: Instant::now(),
        })
}

async fn root() -> &'static str {
    "Bot is running!"
}

async fn health(State(state): State<KeepaliveState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.started.elapsed().as_secs(),
    })
}

pub async fn bind(config: &KeepaliveConfig) -> Result<TcpListener, SequinError> {
    let addr = format!("{}:{}", config.bind_address, config.port);
    TcpListener::bind(&addr)
        .await
        .map_err(|e| SequinError::Internal(format!("failed to bind keep-alive server to {addr}: {e}")))
}

/// Serves until `cancel` fires.
pub async fn serve_on(listener: TcpListener, cancel: CancellationToken) -> Result<(), SequinError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "keep-alive server listening");
    }
    axum::serve(listener, router())
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| SequinError::Internal(format!("keep-alive server error: {e}")))
}
