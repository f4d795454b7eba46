//! Route definitions for places and the caller's own place.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, put};
use axum::Router;
use pomucky_core::media::MAX_IMAGE_BYTES;

use crate::handlers::places;
use crate::state::AppState;

/// ```text
/// GET  /places                      -> list_places
/// POST /places                      -> create_place
/// GET  /places/{id}                 -> get_place
/// PUT  /places/{id}                 -> update_place
/// GET  /places/{id}/banner          -> get_banner
/// GET  /places/{id}/users           -> list_place_users
/// GET  /places/@local/users         -> list_local_users
/// GET  /users/@self/place           -> get_own_place
/// PUT  /users/@self/place           -> update_own_place
/// PUT  /users/@self/place/banner    -> put_own_banner
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/places", get(places::list_places).post(places::create_place))
        .route("/places/{id}", get(places::get_place).put(places::update_place))
        .route("/places/{id}/banner", get(places::get_banner))
        .route("/places/{id}/users", get(places::list_place_users))
        .route("/places/@local/users", get(places::list_local_users))
        .route(
            "/users/@self/place",
            get(places::get_own_place).put(places::update_own_place),
        )
        .route(
            "/users/@self/place/banner",
            put(places::put_own_banner).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
}
