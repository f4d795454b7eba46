//! Route definitions for the `/token` resource.

use axum::routing::put;
use axum::Router;

use crate::handlers::token;
use crate::state::AppState;

/// ```text
/// PUT    /token  -> issue
/// DELETE /token  -> revoke
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/token", put(token::issue).delete(token::revoke))
}
