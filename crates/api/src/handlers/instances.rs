//! Handlers for physical aid instances.
//!
//! Every response passes through [`InstanceView::assemble`] or
//! [`InstanceSummary::for_caller`], which decide per instance whether the
//! caller may see who borrowed it.

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use pomucky_core::access::Placement;
use pomucky_core::auth::Caller;
use pomucky_core::error::CoreError;
use pomucky_core::instance::{can_modify_instance, creation_place, LoanChange, Renter};
use pomucky_core::types::DbId;
use pomucky_core::validation::first_field_error;
use pomucky_db::models::instance::{
    referenced_places, CreateInstance, InstanceRow, InstanceSummary, InstanceView, UpdateInstance,
};
use pomucky_db::models::place::Place;
use pomucky_db::models::pomucka::Pomucka;
use pomucky_db::repositories::{InstanceRepo, PlaceRepo, PomuckaRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{double_option, ApiQuery, PathId, ValidJson};
use crate::middleware::auth::{AuthUser, MaybeUser};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `POST /pomucky/{id}/instances`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateInstanceParams {
    /// Place to register the instance for. Defaults to the caller's place.
    pub place: Option<DbId>,
}

/// Request body for `PUT /instances/{id}`.
///
/// `rentedBy` is three-state: absent keeps the loan, `null` ends it and an
/// object starts (or replaces) it.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstanceRequest {
    pub currently_at: Option<DbId>,
    #[serde(default, deserialize_with = "double_option")]
    pub rented_by: Option<Option<Renter>>,
}

/// Response of `GET /pomucky/{id}/instances`.
#[derive(Debug, Serialize)]
pub struct PomuckaInstances {
    pub pomucka: Pomucka,
    pub instances: Vec<InstanceSummary>,
    /// Every place referenced by `instances`, once.
    pub places: Vec<Place>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn place_lookup(state: &AppState, rows: &[InstanceRow]) -> AppResult<HashMap<DbId, Place>> {
    let places = PlaceRepo::find_many(&state.pool, &referenced_places(rows)).await?;
    Ok(places.into_iter().map(|p| (p.id, p)).collect())
}

async fn views(
    state: &AppState,
    rows: &[InstanceRow],
    caller: Option<&Caller>,
) -> AppResult<Vec<InstanceView>> {
    let places = place_lookup(state, rows).await?;
    rows.iter()
        .map(|row| {
            InstanceView::assemble(row, &places, caller).ok_or_else(|| {
                AppError::InternalError(format!("instance {} references a missing place", row.id))
            })
        })
        .collect()
}

async fn single_view(
    state: &AppState,
    row: InstanceRow,
    caller: &Caller,
) -> AppResult<Json<InstanceView>> {
    let mut list = views(state, std::slice::from_ref(&row), Some(caller)).await?;
    list.pop()
        .map(Json)
        .ok_or_else(|| AppError::InternalError(format!("instance {} not assembled", row.id)))
}

async fn find_instance(state: &AppState, id: DbId) -> AppResult<InstanceRow> {
    Ok(InstanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "instance",
            id,
        })?)
}

/// Validate an assigned renter, reporting fields as `rentedBy.<field>`.
fn check_renter(rented_by: &Option<Option<Renter>>) -> AppResult<()> {
    if let Some(Some(renter)) = rented_by {
        if let Err(errors) = renter.validate() {
            if let Some(mut field) = first_field_error(&errors) {
                field.key = format!("rentedBy.{}", field.key);
                return Err(CoreError::InvalidBody(field).into());
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /instances
pub async fn list_instances(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<InstanceView>>> {
    let rows = InstanceRepo::list(&state.pool).await?;
    Ok(Json(views(&state, &rows, Some(&auth.caller)).await?))
}

/// GET /instances/@local
///
/// Instances physically at the caller's place, whoever owns them.
pub async fn list_local_instances(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<InstanceView>>> {
    let rows = InstanceRepo::list_at(&state.pool, auth.caller.place_id).await?;
    Ok(Json(views(&state, &rows, Some(&auth.caller)).await?))
}

/// GET /pomucky/{id}/instances
///
/// Public. Anonymous callers only learn whether each instance is on loan.
pub async fn list_pomucka_instances(
    State(state): State<AppState>,
    maybe: MaybeUser,
    PathId(pomucka_id): PathId,
) -> AppResult<Json<PomuckaInstances>> {
    let pomucka = PomuckaRepo::find_by_id(&state.pool, pomucka_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "pomucka",
            id: pomucka_id,
        })?;

    let rows = InstanceRepo::list_for_pomucka(&state.pool, pomucka_id).await?;
    let places = PlaceRepo::find_many(&state.pool, &referenced_places(&rows)).await?;
    let instances = rows
        .iter()
        .map(|row| InstanceSummary::for_caller(row, maybe.caller()))
        .collect();

    Ok(Json(PomuckaInstances {
        pomucka,
        instances,
        places,
    }))
}

/// GET /instances/{id}
pub async fn get_instance(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId,
) -> AppResult<Json<InstanceView>> {
    let row = find_instance(&state, id).await?;
    single_view(&state, row, &auth.caller).await
}

/// POST /pomucky/{id}/instances
///
/// Registers a new instance owned by and located at the target place.
pub async fn create_instance(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(pomucka_id): PathId,
    ApiQuery(params): ApiQuery<CreateInstanceParams>,
) -> AppResult<Json<InstanceView>> {
    if !PomuckaRepo::exists(&state.pool, pomucka_id).await? {
        return Err(CoreError::NotFound {
            entity: "pomucka",
            id: pomucka_id,
        }
        .into());
    }
    let placement = creation_place(&auth.caller, params.place)?;
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

    let create = CreateInstance {
        pomucka_id,
        place_id: placement.place_id(),
    };
    let row = InstanceRepo::create(&state.pool, &create).await?;

    tracing::info!(
        instance_id = row.id,
        pomucka_id,
        place_id = create.place_id,
        created_by = auth.caller.user_id,
        "Instance registered"
    );
    single_view(&state, row, &auth.caller).await
}

/// PUT /instances/{id}
///
/// Relocate and/or change the loan in one write. Concurrent updates of the
/// same instance are last-write-wins.
pub async fn update_instance(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId,
    ValidJson(input): ValidJson<UpdateInstanceRequest>,
) -> AppResult<Json<InstanceView>> {
    check_renter(&input.rented_by)?;

    let row = find_instance(&state, id).await?;
    can_modify_instance(&auth.caller, row.owned_by, row.currently_at)?;

    if let Some(target) = input.currently_at {
        if target != row.currently_at && !PlaceRepo::exists(&state.pool, target).await? {
            return Err(CoreError::MissingReference {
                key: "currentlyAt",
                entity: "place",
                id: target,
            }
            .into());
        }
    }

    let update = UpdateInstance {
        currently_at: input.currently_at,
        loan: LoanChange::from_request(input.rented_by),
    };
    let updated = InstanceRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "instance",
            id,
        })?;

    tracing::info!(
        instance_id = id,
        from = row.currently_at,
        to = updated.currently_at,
        on_loan = updated.loan_state().is_on_loan(),
        updated_by = auth.caller.user_id,
        "Instance updated"
    );
    single_view(&state, updated, &auth.caller).await
}
