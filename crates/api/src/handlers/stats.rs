//! Handlers for aggregate counters.

use axum::extract::State;
use axum::Json;
use pomucky_db::models::stats::{CatalogStats, PlaceStats};
use pomucky_db::repositories::StatsRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /stats
pub async fn catalog_stats(State(state): State<AppState>) -> AppResult<Json<CatalogStats>> {
    Ok(Json(StatsRepo::catalog(&state.pool).await?))
}

/// GET /users/@self/place/stats
pub async fn own_place_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<PlaceStats>> {
    Ok(Json(StatsRepo::for_place(&state.pool, auth.caller.place_id).await?))
}
