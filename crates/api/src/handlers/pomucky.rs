//! Handlers for the aid catalog under `/pomucky`.
//!
//! Reads are public. Writes need a global admin and go through the import
//! cleaning in [`pomucky_core::catalog`] so hand-entered and imported
//! entries look the same.

use axum::extract::State;
use axum::http::header::CACHE_CONTROL;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use pomucky_core::catalog::{
    clean_name, clean_person_or_company, clean_publication_place, clean_signatura,
    normalize_categories, CatalogQuery, CatalogSearchParams, SEARCH_OPTIONS_MAX_AGE_SECS,
};
use pomucky_core::error::{CoreError, POMUCKA_HAS_INSTANCES};
use pomucky_core::validation::{FieldError, ERR_REQUIRED};
use pomucky_db::models::pomucka::{
    CatalogPage, CreatePomucka, Pomucka, PomuckaDetails, UpdatePomucka, UpdatePomuckaDetails,
};
use pomucky_db::repositories::PomuckaRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{ApiQuery, PathId, ValidJson};
use crate::middleware::rbac::RequireGlobalAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /pomucky`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePomuckaRequest {
    #[validate(length(min = 1, code = "required"))]
    pub name: String,
    #[serde(default)]
    pub signatura: String,
    #[serde(rename = "ISXN")]
    pub isxn: Option<i64>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub details: PomuckaDetails,
}

/// Request body for `PUT /pomucky/{id}`. Only present fields are written.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePomuckaRequest {
    #[validate(length(min = 1, code = "required"))]
    pub name: Option<String>,
    pub signatura: Option<String>,
    #[serde(rename = "ISXN")]
    pub isxn: Option<i64>,
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub details: UpdatePomuckaDetails,
}

fn clean_opt(value: Option<String>, clean: fn(&str) -> String) -> Option<String> {
    value.map(|v| clean(&v))
}

/// Cleaning can strip a name down to nothing (`" : "`).
fn require_name(name: String) -> AppResult<String> {
    if name.is_empty() {
        return Err(CoreError::from(FieldError::new("name", ERR_REQUIRED)).into());
    }
    Ok(name)
}

impl CreatePomuckaRequest {
    fn into_create(self) -> AppResult<CreatePomucka> {
        let details = PomuckaDetails {
            author: clean_opt(self.details.author, clean_person_or_company),
            company: clean_opt(self.details.company, clean_person_or_company),
            misto_vydani: clean_opt(self.details.misto_vydani, clean_publication_place),
            ..self.details
        };
        Ok(CreatePomucka {
            name: require_name(clean_name(&self.name))?,
            signatura: clean_signatura(&self.signatura),
            isxn: self.isxn,
            categories: normalize_categories(&self.categories),
            details,
        })
    }
}

impl UpdatePomuckaRequest {
    fn into_update(self) -> AppResult<UpdatePomucka> {
        let name = match self.name {
            Some(name) => Some(require_name(clean_name(&name))?),
            None => None,
        };
        let details = UpdatePomuckaDetails {
            author: clean_opt(self.details.author, clean_person_or_company),
            company: clean_opt(self.details.company, clean_person_or_company),
            misto_vydani: clean_opt(self.details.misto_vydani, clean_publication_place),
            ..self.details
        };
        Ok(UpdatePomucka {
            name,
            signatura: clean_opt(self.signatura, clean_signatura),
            isxn: self.isxn,
            categories: self.categories.as_deref().map(normalize_categories),
            details,
        })
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /pomucky
pub async fn create_pomucka(
    State(state): State<AppState>,
    RequireGlobalAdmin(auth): RequireGlobalAdmin,
    ValidJson(input): ValidJson<CreatePomuckaRequest>,
) -> AppResult<Json<Pomucka>> {
    let create = input.into_create()?;
    let pomucka = PomuckaRepo::create(&state.pool, &create).await?;

    tracing::info!(
        pomucka_id = pomucka.id,
        created_by = auth.caller.user_id,
        "Catalog entry created"
    );
    Ok(Json(pomucka))
}

/// GET /pomucky/search
///
/// Free-text search with `q`, narrowed by `id[]` and `categories[]`, paged
/// with `page`/`limit`. The facets describe the whole filtered set, not
/// just the page.
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CatalogSearchParams>,
) -> AppResult<Json<CatalogPage>> {
    let query = CatalogQuery::compose(params)?;
    Ok(Json(PomuckaRepo::search(&state.pool, &query).await?))
}

/// GET /pomucky/searchOptions
pub async fn search_options(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let facets = PomuckaRepo::search_options(&state.pool).await?;
    let cache = format!("max-age={SEARCH_OPTIONS_MAX_AGE_SECS}");
    Ok(([(CACHE_CONTROL, cache)], Json(facets)))
}

/// GET /pomucky/{id}
pub async fn get_pomucka(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<Pomucka>> {
    let pomucka = PomuckaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "pomucka",
            id,
        })?;
    Ok(Json(pomucka))
}

/// PUT /pomucky/{id}
pub async fn update_pomucka(
    State(state): State<AppState>,
    RequireGlobalAdmin(auth): RequireGlobalAdmin,
    PathId(id): PathId,
    ValidJson(input): ValidJson<UpdatePomuckaRequest>,
) -> AppResult<Json<Pomucka>> {
    let update = input.into_update()?;
    let pomucka = PomuckaRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "pomucka",
            id,
        })?;

    tracing::info!(pomucka_id = id, updated_by = auth.caller.user_id, "Catalog entry updated");
    Ok(Json(pomucka))
}

/// DELETE /pomucky/{id}
///
/// Refused while instances of the entry exist. Its images go with it.
pub async fn delete_pomucka(
    State(state): State<AppState>,
    RequireGlobalAdmin(auth): RequireGlobalAdmin,
    PathId(id): PathId,
) -> AppResult<StatusCode> {
    if !PomuckaRepo::exists(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "pomucka",
            id,
        }
        .into());
    }
    if PomuckaRepo::count_instances(&state.pool, id).await? > 0 {
        return Err(CoreError::Validation(POMUCKA_HAS_INSTANCES.into()).into());
    }

    PomuckaRepo::delete(&state.pool, id).await?;
    tracing::info!(pomucka_id = id, deleted_by = auth.caller.user_id, "Catalog entry deleted");
    Ok(StatusCode::NO_CONTENT)
}
