use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pomucky_core::error::CoreError;
use pomucky_core::validation::{FieldError, ERR_NOT_FOUND};
use serde::Serialize;

/// Message sent in place of any error that must not reach the client.
const INTERNAL_MESSAGE: &str = "internal";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the JSON error envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `pomucky_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request whose message is a machine-readable reason.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error. The message is logged, never sent.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            key: None,
            err: None,
            details: None,
        }
    }

    fn with_field(mut self, field: &FieldError) -> Self {
        self.key = Some(field.key.clone());
        self.err = Some(field.err.clone());
        self.details = field.details.clone();
        self
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, .. } => {
                    ErrorBody::new(StatusCode::NOT_FOUND, format!("{entity}_not_found"))
                }
                CoreError::MissingReference { key, entity, .. } => ErrorBody::new(
                    StatusCode::NOT_FOUND,
                    format!("{entity}_not_found"),
                )
                .with_field(&FieldError::new(*key, ERR_NOT_FOUND)),
                CoreError::InvalidCredentials => {
                    ErrorBody::new(StatusCode::NOT_FOUND, "user_not_found")
                }
                CoreError::InvalidBody(field) => {
                    ErrorBody::new(StatusCode::BAD_REQUEST, "invalid_body").with_field(field)
                }
                CoreError::Validation(msg) => ErrorBody::new(StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::InvalidQuery(msg) => {
                    let mut body = ErrorBody::new(StatusCode::BAD_REQUEST, "invalid_query");
                    body.details = Some(msg.clone());
                    body
                }
                CoreError::Unauthorized(msg) => {
                    ErrorBody::new(StatusCode::UNAUTHORIZED, msg.clone())
                }
                CoreError::Forbidden(msg) => ErrorBody::new(StatusCode::FORBIDDEN, msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    ErrorBody::internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => ErrorBody::new(StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorBody::internal()
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an error envelope.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map
///   to 400 `duplicate_value` naming the constraint.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorBody {
    match err {
        sqlx::Error::RowNotFound => ErrorBody::new(StatusCode::NOT_FOUND, "not_found"),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    let mut body = ErrorBody::new(StatusCode::BAD_REQUEST, "duplicate_value");
                    body.key = Some(constraint.to_string());
                    return body;
                }
            }
            tracing::error!(error = %db_err, "Database error");
            ErrorBody::internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            ErrorBody::internal()
        }
    }
}
