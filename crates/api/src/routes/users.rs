//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// ```text
/// GET    /users          -> list_users
/// POST   /users          -> create_user
/// GET    /users/@self    -> get_self
/// PUT    /users/@self    -> update_self
/// GET    /users/{id}     -> get_user
/// DELETE /users/{id}     -> delete_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/@self", get(users::get_self).put(users::update_self))
        .route("/users/{id}", get(users::get_user).delete(users::delete_user))
}
