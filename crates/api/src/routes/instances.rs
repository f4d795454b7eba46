//! Route definitions for instances.

use axum::routing::get;
use axum::Router;

use crate::handlers::instances;
use crate::state::AppState;

/// ```text
/// GET  /instances                 -> list_instances
/// GET  /instances/@local          -> list_local_instances
/// GET  /instances/{id}            -> get_instance
/// PUT  /instances/{id}            -> update_instance
/// GET  /pomucky/{id}/instances    -> list_pomucka_instances
/// POST /pomucky/{id}/instances    -> create_instance
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/instances", get(instances::list_instances))
        .route("/instances/@local", get(instances::list_local_instances))
        .route(
            "/instances/{id}",
            get(instances::get_instance).put(instances::update_instance),
        )
        .route(
            "/pomucky/{id}/instances",
            get(instances::list_pomucka_instances).post(instances::create_instance),
        )
}
