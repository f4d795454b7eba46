use crate::types::DbId;
use crate::validation::FieldError;

/// Caller is below the role an operation requires.
pub const INSUFFICIENT_ROLE: &str = "insufficient_role";
/// Operation needs a logged-in caller and none was presented.
pub const USER_NOT_LOGGED_IN: &str = "user_not_logged_in";
/// Token failed signature, issuer, audience or expiry checks.
pub const INVALID_TOKEN: &str = "invalid_token";
/// Token verified but its subject no longer exists.
pub const USER_DELETED: &str = "user_deleted";
/// Caller must change their password before doing anything else.
pub const PASSWORD_CHANGE_REQUIRED: &str = "password_change_required";
/// Path id is not a well-formed identifier.
pub const INVALID_ID: &str = "invalid_id";
/// Old password supplied on a password change did not match.
pub const WRONG_PASSWORD: &str = "wrong_password";
/// Forced password change reused the current password.
pub const PASSWORD_NOT_CHANGED: &str = "password_not_changed";
/// New password does not satisfy the length policy.
pub const INVALID_PASSWORD: &str = "invalid_password";
/// Catalog entry cannot be deleted while instances of it exist.
pub const POMUCKA_HAS_INSTANCES: &str = "pomucka_has_instances";

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A request field points at an entity that does not exist.
    #[error("Referenced {entity} with id {id} not found (field {key})")]
    MissingReference {
        key: &'static str,
        entity: &'static str,
        id: DbId,
    },

    /// Name/password pair did not match a user. Deliberately the same
    /// outcome for an unknown name and a wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid body: {0}")]
    InvalidBody(FieldError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn insufficient_role() -> Self {
        Self::Forbidden(INSUFFICIENT_ROLE.to_string())
    }

    pub fn not_logged_in() -> Self {
        Self::Unauthorized(USER_NOT_LOGGED_IN.to_string())
    }

    pub fn invalid_id() -> Self {
        Self::Validation(INVALID_ID.to_string())
    }
}

impl From<FieldError> for CoreError {
    fn from(err: FieldError) -> Self {
        Self::InvalidBody(err)
    }
}
