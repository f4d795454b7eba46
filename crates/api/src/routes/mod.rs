pub mod images;
pub mod instances;
pub mod meta;
pub mod places;
pub mod pomucky;
pub mod stats;
pub mod token;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the route tree. Everything is mounted at the root.
///
/// Resources share path prefixes (`/users/@self/place` lives with places,
/// `/pomucky/{id}/instances` with instances), so each module declares full
/// paths and the routers are merged rather than nested.
///
/// ```text
/// /                                   server info (public)
/// /health                             health check (public)
///
/// /token                              log in (PUT), log out (DELETE)
///
/// /users                              list (GLOBAL_ADMIN), create (LOCAL_ADMIN)
/// /users/@self                        own profile, password change
/// /users/{id}                         get, delete (LOCAL_ADMIN, place scoped)
///
/// /places                             list (public), create (GLOBAL_ADMIN)
/// /places/{id}                        get (public), update
/// /places/{id}/banner                 banner image (public)
/// /places/{id}/users                  users of a place
/// /places/@local/users                users of the caller's place
/// /users/@self/place                  own place, update
/// /users/@self/place/banner           replace own banner (PUT)
///
/// /pomucky                            create (GLOBAL_ADMIN)
/// /pomucky/search                     search (public)
/// /pomucky/searchOptions              facet values (public, cached)
/// /pomucky/{id}                       get (public), update, delete (GLOBAL_ADMIN)
/// /pomucky/{id}/images                list (public), upload (GLOBAL_ADMIN)
/// /images/{id}                        binary (public), delete (GLOBAL_ADMIN)
///
/// /instances                          all instances (logged in)
/// /instances/@local                   instances at the caller's place
/// /instances/{id}                     get, update (logged in)
/// /pomucky/{id}/instances             list (public), register (logged in)
///
/// /stats                              catalog totals (public)
/// /users/@self/place/stats            totals of the caller's place
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(meta::router())
        .merge(token::router())
        .merge(users::router())
        .merge(places::router())
        .merge(pomucky::router())
        .merge(images::router())
        .merge(instances::router())
        .merge(stats::router())
}
