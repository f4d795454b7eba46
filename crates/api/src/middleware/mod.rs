//! Authentication middleware and authorization extractors.
//!
//! - [`auth::resolve_auth`] -- Router-wide middleware resolving the `token` cookie.
//! - [`auth::AuthUser`] -- Requires a logged-in caller.
//! - [`auth::MaybeUser`] -- Logged-in caller if any.
//! - [`rbac`] -- `RequireLocalManager` .. `RequireGlobalAdmin` role guards.

pub mod auth;
pub mod rbac;
