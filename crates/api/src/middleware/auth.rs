//! Cookie-based caller resolution.
//!
//! [`resolve_auth`] runs before every handler. It turns the `token` cookie
//! into an [`AuthUser`] stored in the request extensions, or rejects the
//! request outright:
//!
//! | Condition                                  | Result                           |
//! |--------------------------------------------|----------------------------------|
//! | no cookie                                  | anonymous, continue              |
//! | signature / issuer / audience / expiry bad | 403 `invalid_token`, cookie cleared |
//! | subject no longer exists                   | 403 `user_deleted`, cookie cleared |
//! | forced password change, route not exempt   | 403 `password_change_required`   |
//!
//! Handlers then pick [`AuthUser`] or [`MaybeUser`] as an extractor.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use pomucky_core::auth::{exempt_from_password_gate, Caller, TOKEN_COOKIE};
use pomucky_core::error::{CoreError, INVALID_TOKEN, PASSWORD_CHANGE_REQUIRED, USER_DELETED};
use pomucky_db::models::user::User;
use pomucky_db::repositories::UserRepo;

use crate::auth::cookie::removal_cookie;
use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller: the full user row plus the reduced identity used in
/// authorization checks.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub caller: Caller,
}

impl AuthUser {
    fn from_user(user: User) -> Result<Self, AppError> {
        let role = user.role().ok_or_else(|| {
            AppError::InternalError(format!("user {} has invalid role {}", user.id, user.role))
        })?;
        let caller = Caller {
            user_id: user.id,
            role,
            place_id: user.place_id,
        };
        Ok(Self { user, caller })
    }
}

/// Router-wide middleware resolving the `token` cookie.
pub async fn resolve_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = jar.get(TOKEN_COOKIE).map(|c| c.value().to_string()) else {
        return next.run(req).await;
    };
    if token.is_empty() {
        return next.run(req).await;
    }

    let reject = |jar: CookieJar, reason: &str| {
        (
            jar.remove(removal_cookie()),
            AppError::Core(CoreError::Forbidden(reason.to_string())),
        )
            .into_response()
    };

    let user_id = match verify_token(&token, &state.config.token) {
        Ok(claims) => match claims.user_id() {
            Some(id) => id,
            None => {
                tracing::debug!(sub = %claims.sub, "Token subject is not a user id");
                return reject(jar, INVALID_TOKEN);
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "Token verification failed");
            return reject(jar, INVALID_TOKEN);
        }
    };

    let user = match UserRepo::find_by_id(&state.pool, user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(user_id, "Token subject no longer exists");
            return reject(jar, USER_DELETED);
        }
        Err(e) => return AppError::from(e).into_response(),
    };

    if user.force_change_password
        && !exempt_from_password_gate(req.method().as_str(), req.uri().path())
    {
        return AppError::Core(CoreError::Forbidden(PASSWORD_CHANGE_REQUIRED.into()))
            .into_response();
    }

    match AuthUser::from_user(user) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| CoreError::not_logged_in().into())
    }
}

/// The caller if logged in. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

impl MaybeUser {
    pub fn caller(&self) -> Option<&Caller> {
        self.0.as_ref().map(|auth| &auth.caller)
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthUser>().cloned()))
    }
}
