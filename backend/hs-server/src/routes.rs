use crate::health;

use std::sync::Arc;

use axum::{Router, routing::get};
use chrono::{DateTime, Utc};
use tower_http::cors::{Any, CorsLayer};

/// Facts about the serving instance exposed through the health endpoints.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub port: u16,
    pub started_at: DateTime<Utc>,
}

impl ServerInfo {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            started_at: Utc::now(),
        }
    }
}

/// Build the embedded server's router
pub fn build_router(info: ServerInfo) -> Router {
    Router::new()
        .route("/", get(health::landing))
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        .with_state(Arc::new(info))
        // Browsers on the LAN hit this from other origins
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
