//! Request extractors that report failures in the API's error envelope.
//!
//! - [`ValidJson`] -- JSON body, deserialized then checked with `validator`.
//! - [`ApiQuery`] -- query string, including repeated `key[]=` parameters.
//! - [`PathId`] -- a numeric `{id}` path segment.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use pomucky_core::error::CoreError;
use pomucky_core::types::DbId;
use pomucky_core::validation::{first_field_error, FieldError, ERR_INVALID_TYPE, ERR_REQUIRED};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::error::Category;
use validator::Validate;

use crate::error::AppError;

/// JSON body that has passed its `Validate` rules.
///
/// Every failure is 400 `invalid_body`. A field of the wrong type or a
/// missing field is reported by its path (`rentedBy.identifier`), malformed
/// JSON as `key = "body"` with the parser message in `details`, and a failed
/// rule names the field.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Err(CoreError::InvalidBody(
                FieldError::new("body", ERR_INVALID_TYPE)
                    .with_details("Expected request with `Content-Type: application/json`"),
            )
            .into());
        }
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            CoreError::InvalidBody(
                FieldError::new("body", ERR_INVALID_TYPE).with_details(rejection.body_text()),
            )
        })?;

        let value: T = parse_json(&bytes).map_err(CoreError::InvalidBody)?;
        if let Err(errors) = value.validate() {
            if let Some(field) = first_field_error(&errors) {
                return Err(CoreError::InvalidBody(field).into());
            }
        }
        Ok(ValidJson(value))
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::trim)
        .is_some_and(|mime| mime == "application/json" || mime.ends_with("+json"))
}

/// Deserialize a JSON body, locating data errors by their field path.
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, FieldError> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut de).map_err(body_error)?;
    de.end()
        .map_err(|err| FieldError::new("body", ERR_INVALID_TYPE).with_details(err.to_string()))?;
    Ok(value)
}

fn body_error(err: serde_path_to_error::Error<serde_json::Error>) -> FieldError {
    let path = err.path().to_string();
    let inner = err.into_inner();
    let message = inner.to_string();

    if inner.classify() != Category::Data {
        return FieldError::new("body", ERR_INVALID_TYPE).with_details(message);
    }
    // serde reports a missing field at the enclosing object.
    if let Some(field) = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
    {
        let key = if path == "." {
            field.to_string()
        } else {
            format!("{path}.{field}")
        };
        return FieldError::new(key, ERR_REQUIRED);
    }
    let key = if path == "." { "body".to_string() } else { path };
    FieldError::new(key, ERR_INVALID_TYPE).with_details(message)
}

/// Query string extractor accepting `key[]=a&key[]=b` lists.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum_extra::extract::Query(value) =
            axum_extra::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| CoreError::InvalidQuery(rejection.to_string()))?;
        Ok(ApiQuery(value))
    }
}

/// The `{id}` segment of a route, parsed as a positive id.
///
/// Anything else (`/pomucky/invalid`) is 400 `invalid_id` before the handler
/// runs.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub DbId);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| CoreError::invalid_id())?;
        parse_id(&raw).map(PathId)
    }
}

/// Parse a positive decimal id.
pub fn parse_id(raw: &str) -> Result<DbId, AppError> {
    raw.parse::<DbId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CoreError::invalid_id().into())
}

/// Deserialize a field that distinguishes "absent" from `null`.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`: absent
/// stays `None` through `default`, `null` becomes `Some(None)`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
