//! Handlers for server info and health.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Server info returned at the root.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    /// Crate version from Cargo.toml.
    pub v: &'static str,
    /// PEM of the key that verifies issued tokens.
    pub public_key: String,
}

/// Health check response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
}

/// GET /
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        v: env!("CARGO_PKG_VERSION"),
        public_key: state.config.token.keys.public_pem().to_string(),
    })
}

/// GET /health -- returns service and database health.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = pomucky_db::health_check(&state.pool).await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}
