//! Route definitions for aggregate counters.

use axum::routing::get;
use axum::Router;

use crate::handlers::stats;
use crate::state::AppState;

/// ```text
/// GET /stats                      -> catalog_stats
/// GET /users/@self/place/stats    -> own_place_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats::catalog_stats))
        .route("/users/@self/place/stats", get(stats::own_place_stats))
}
