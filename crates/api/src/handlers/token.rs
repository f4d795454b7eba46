//! Handlers for `/token` (log in, log out).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use pomucky_core::error::CoreError;
use pomucky_db::models::user::UserResponse;
use pomucky_db::repositories::UserRepo;
use serde::Deserialize;
use validator::Validate;

use crate::auth::cookie::{removal_cookie, token_cookie};
use crate::auth::jwt::issue_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::state::AppState;

/// Request body for `PUT /token`.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    pub name: String,
    pub password: String,
}

/// PUT /token
///
/// Check the credentials and set the `token` cookie. An unknown name and a
/// wrong password both answer 404 `user_not_found`.
pub async fn issue(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(input): ValidJson<TokenRequest>,
) -> AppResult<(CookieJar, Json<UserResponse>)> {
    let user = UserRepo::find_by_name(&state.pool, &input.name)
        .await?
        .ok_or(CoreError::InvalidCredentials)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Wrong password on token request");
        return Err(CoreError::InvalidCredentials.into());
    }

    let token = issue_token(user.id, &state.config.token)
        .map_err(|e| AppError::InternalError(format!("Token signing error: {e}")))?;

    tracing::info!(user_id = user.id, place_id = user.place_id, "Token issued");
    Ok((
        jar.add(token_cookie(token, &state.config.token)),
        Json(UserResponse::from(&user)),
    ))
}

/// DELETE /token
///
/// Clear the `token` cookie. Nothing is revoked server-side.
pub async fn revoke(jar: CookieJar) -> (CookieJar, StatusCode) {
    (jar.remove(removal_cookie()), StatusCode::NO_CONTENT)
}
