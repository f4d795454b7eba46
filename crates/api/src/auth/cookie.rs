//! The `token` cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use pomucky_core::auth::TOKEN_COOKIE;

use super::jwt::TokenConfig;

/// HttpOnly cookie carrying a freshly issued token.
pub fn token_cookie(token: String, config: &TokenConfig) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .build()
}

/// Cookie to pass to `CookieJar::remove` so the client drops its token.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE).path("/").build()
}
