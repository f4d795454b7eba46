//! Route definitions for the `/pomucky` catalog.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pomucky;
use crate::state::AppState;

/// ```text
/// POST   /pomucky                 -> create_pomucka
/// GET    /pomucky/search          -> search
/// GET    /pomucky/searchOptions   -> search_options
/// GET    /pomucky/{id}            -> get_pomucka
/// PUT    /pomucky/{id}            -> update_pomucka
/// DELETE /pomucky/{id}            -> delete_pomucka
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pomucky", post(pomucky::create_pomucka))
        .route("/pomucky/search", get(pomucky::search))
        .route("/pomucky/searchOptions", get(pomucky::search_options))
        .route(
            "/pomucky/{id}",
            get(pomucky::get_pomucka)
                .put(pomucky::update_pomucka)
                .delete(pomucky::delete_pomucka),
        )
}
