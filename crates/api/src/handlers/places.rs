//! Handlers for `/places` and the caller's own place under `/users/@self/place`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use pomucky_core::access;
use pomucky_core::error::CoreError;
use pomucky_core::media::image_mimetype;
use pomucky_core::place::{validate_contacts, Contact};
use pomucky_core::types::DbId;
use pomucky_core::validation::{FieldError, ERR_REQUIRED};
use pomucky_db::models::place::{CreatePlace, Place, UpdatePlace};
use pomucky_db::models::user::UserResponse;
use pomucky_db::repositories::{PlaceRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{PathId, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireGlobalAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /places`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlaceRequest {
    #[validate(length(min = 1, code = "required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

/// Request body for the place update routes. `contacts` replaces the list.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePlaceRequest {
    #[validate(length(min = 1, code = "required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub contacts: Option<Vec<Contact>>,
}

async fn find_place(state: &AppState, id: DbId) -> AppResult<Place> {
    Ok(PlaceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "place", id })?)
}

async fn apply_update(
    state: &AppState,
    id: DbId,
    input: UpdatePlaceRequest,
) -> AppResult<Json<Place>> {
    if let Some(contacts) = &input.contacts {
        validate_contacts(contacts).map_err(CoreError::from)?;
    }
    let update = UpdatePlace {
        name: input.name,
        description: input.description,
        website: input.website,
        contacts: input.contacts,
    };
    let place = PlaceRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(CoreError::NotFound { entity: "place", id })?;
    Ok(Json(place))
}

// ---------------------------------------------------------------------------
// Places
// ---------------------------------------------------------------------------

/// GET /places
pub async fn list_places(State(state): State<AppState>) -> AppResult<Json<Vec<Place>>> {
    Ok(Json(PlaceRepo::list(&state.pool).await?))
}

/// GET /places/{id}
pub async fn get_place(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<Place>> {
    Ok(Json(find_place(&state, id).await?))
}

/// POST /places
pub async fn create_place(
    State(state): State<AppState>,
    RequireGlobalAdmin(auth): RequireGlobalAdmin,
    ValidJson(input): ValidJson<CreatePlaceRequest>,
) -> AppResult<Json<Place>> {
    access::can_create_place(&auth.caller)?;
    validate_contacts(&input.contacts).map_err(CoreError::from)?;

    let create = CreatePlace {
        name: input.name,
        description: input.description,
        website: input.website,
        contacts: input.contacts,
    };
    let place = PlaceRepo::create(&state.pool, &create).await?;

    tracing::info!(place_id = place.id, created_by = auth.caller.user_id, "Place created");
    Ok(Json(place))
}

/// PUT /places/{id}
///
/// Local managers may edit their own place here too; any other place needs
/// a global admin.
pub async fn update_place(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId,
    ValidJson(input): ValidJson<UpdatePlaceRequest>,
) -> AppResult<Json<Place>> {
    access::can_edit_place(&auth.caller, id)?;
    let response = apply_update(&state, id, input).await?;
    tracing::info!(place_id = id, updated_by = auth.caller.user_id, "Place updated");
    Ok(response)
}

/// GET /places/{id}/banner
pub async fn get_banner(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<impl IntoResponse> {
    match PlaceRepo::find_banner(&state.pool, id).await? {
        Some(banner) => Ok(([(CONTENT_TYPE, banner.banner_mimetype)], banner.banner)),
        None => {
            find_place(&state, id).await?;
            Err(CoreError::NotFound {
                entity: "banner",
                id,
            }
            .into())
        }
    }
}

/// GET /places/{id}/users
///
/// Own place from local manager up, other places from global manager up.
pub async fn list_place_users(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId,
) -> AppResult<Json<Vec<UserResponse>>> {
    access::can_list_users_of_place(&auth.caller, id)?;
    find_place(&state, id).await?;
    let users = UserRepo::list_by_place(&state.pool, id).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /places/@local/users
pub async fn list_local_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<UserResponse>>> {
    access::can_list_users_of_place(&auth.caller, auth.caller.place_id)?;
    let users = UserRepo::list_by_place(&state.pool, auth.caller.place_id).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

// ---------------------------------------------------------------------------
// Own place
// ---------------------------------------------------------------------------

/// GET /users/@self/place
pub async fn get_own_place(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Place>> {
    Ok(Json(find_place(&state, auth.caller.place_id).await?))
}

/// PUT /users/@self/place
pub async fn update_own_place(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(input): ValidJson<UpdatePlaceRequest>,
) -> AppResult<Json<Place>> {
    let id = access::can_edit_own_place(&auth.caller)?;
    let response = apply_update(&state, id, input).await?;
    tracing::info!(place_id = id, updated_by = auth.caller.user_id, "Own place updated");
    Ok(response)
}

/// PUT /users/@self/place/banner
///
/// Raw image body; the format comes from `Content-Type`.
pub async fn put_own_banner(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<StatusCode> {
    let id = access::can_edit_own_place(&auth.caller)?;
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let mimetype = image_mimetype(content_type).map_err(CoreError::from)?;
    if body.is_empty() {
        return Err(CoreError::from(FieldError::new("body", ERR_REQUIRED)).into());
    }

    if !PlaceRepo::set_banner(&state.pool, id, &body, mimetype).await? {
        return Err(CoreError::NotFound { entity: "place", id }.into());
    }
    tracing::info!(place_id = id, mimetype, bytes = body.len(), "Banner replaced");
    Ok(StatusCode::NO_CONTENT)
}
