//! Handlers for `/users`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pomucky_core::access::{self, Placement};
use pomucky_core::error::{CoreError, INVALID_PASSWORD, PASSWORD_NOT_CHANGED, WRONG_PASSWORD};
use pomucky_core::roles::Role;
use pomucky_core::types::DbId;
use pomucky_core::validation::password_length_ok;
use pomucky_db::models::user::{CreateUser, UserResponse};
use pomucky_db::repositories::{PlaceRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::{PathId, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireGlobalAdmin, RequireLocalAdmin};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Login name, email-shaped.
    #[validate(email, length(min = 2, max = 256))]
    pub name: String,
    #[validate(length(min = 6, max = 72))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 256))]
    pub display_name: String,
    pub role: Role,
    /// Target place. Omitted means the caller's own place.
    pub place: Option<DbId>,
}

/// Request body for `PUT /users/@self`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSelfRequest {
    #[validate(length(max = 256))]
    pub display_name: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /users
///
/// Create a user at the caller's place, or at another place for global
/// admins. The new user must change their password on first login.
pub async fn create_user(
    State(state): State<AppState>,
    RequireLocalAdmin(auth): RequireLocalAdmin,
    ValidJson(input): ValidJson<CreateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let placement = access::can_create_user_for(&auth.caller, input.place, input.role)?;
    if let Placement::OtherPlace(place_id) = placement {
        if !PlaceRepo::exists(&state.pool, place_id).await? {
            return Err(CoreError::MissingReference {
                key: "place",
                entity: "place",
                id: place_id,
            }
            .into());
        }
    }

    let create = CreateUser {
        name: input.name,
        display_name: input.display_name,
        password_hash: hash(&input.password)?,
        role: input.role,
        place_id: placement.place_id(),
        force_change_password: true,
    };
    let user = UserRepo::create(&state.pool, &create).await?;

    tracing::info!(
        user_id = user.id,
        place_id = user.place_id,
        role = %input.role,
        created_by = auth.caller.user_id,
        "User created"
    );
    Ok(Json(user.into()))
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    RequireGlobalAdmin(_auth): RequireGlobalAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/@self
pub async fn get_self(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(&auth.user))
}

/// PUT /users/@self
///
/// Change the display name and/or the password. A password change needs
/// the current password and clears a pending forced change.
pub async fn update_self(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(input): ValidJson<UpdateSelfRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = &auth.user;

    if let Some(new_password) = input.new_password.as_deref() {
        if !password_length_ok(new_password) {
            return Err(CoreError::Validation(INVALID_PASSWORD.into()).into());
        }

        let old_password = input.old_password.as_deref().unwrap_or_default();
        let matches = verify_password(old_password, &user.password_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
        if !matches {
            return Err(CoreError::Validation(WRONG_PASSWORD.into()).into());
        }
        if user.force_change_password && new_password == old_password {
            return Err(CoreError::Validation(PASSWORD_NOT_CHANGED.into()).into());
        }

        UserRepo::update_password(&state.pool, user.id, &hash(new_password)?).await?;
        tracing::info!(user_id = user.id, "Password changed");
    }

    if let Some(display_name) = input.display_name.as_deref() {
        UserRepo::update_display_name(&state.pool, user.id, display_name).await?;
    }

    let updated = UserRepo::find_by_id(&state.pool, user.id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "user",
            id: user.id,
        })?;
    Ok(Json(updated.into()))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireLocalAdmin(auth): RequireLocalAdmin,
    PathId(id): PathId,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "user", id })?;
    access::can_view_user(&auth.caller, user.place_id)?;
    Ok(Json(user.into()))
}

/// DELETE /users/{id}
///
/// Same place scoping as reading the user.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireLocalAdmin(auth): RequireLocalAdmin,
    PathId(id): PathId,
) -> AppResult<StatusCode> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "user", id })?;
    access::can_delete_user(&auth.caller, user.place_id)?;

    if !UserRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound { entity: "user", id }.into());
    }
    tracing::info!(user_id = id, deleted_by = auth.caller.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
