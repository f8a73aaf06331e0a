use crate::ServerInfo;

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use log::debug;
use serde_json::json;

/// GET / - Plain landing text
pub async fn landing(State(info): State<Arc<ServerInfo>>) -> Response {
    debug!("Landing page requested");

    (
        StatusCode::OK,
        format!("HTTP server is running on port {}", info.port),
    )
        .into_response()
}

/// GET /health - Instance status with uptime
pub async fn health_check(State(info): State<Arc<ServerInfo>>) -> Response {
    let now = Utc::now();
    let uptime = now.signed_duration_since(info.started_at).num_seconds().max(0);

    let health = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "port": info.port,
        "started_at": info.started_at.to_rfc3339(),
        "uptime_seconds": uptime,
        "timestamp": now.to_rfc3339(),
    });

    (StatusCode::OK, Json(health)).into_response()
}

/// GET /live - Liveness probe (is the process alive?)
pub async fn liveness_check() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// GET /ready - Readiness probe
pub async fn readiness_check() -> Response {
    // Handlers only run once the listener is bound and serving
    (StatusCode::OK, "Ready").into_response()
}
