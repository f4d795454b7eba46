//! Route definitions for server info and health.

use axum::routing::get;
use axum::Router;

use crate::handlers::meta;
use crate::state::AppState;

/// ```text
/// GET /        -> info
/// GET /health  -> health_check
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(meta::info))
        .route("/health", get(meta::health_check))
}
