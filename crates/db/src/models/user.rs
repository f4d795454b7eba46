//! User entity model and DTOs.

use pomucky_core::roles::Role;
use pomucky_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash. Use [`UserResponse`] for anything that leaves
/// the server.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    pub password_hash: String,
    pub force_change_password: bool,
    pub role: i16,
    pub place_id: DbId,
    pub tfa: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Decoded role. `None` only for rows that bypassed the range check.
    pub fn role(&self) -> Option<Role> {
        Role::from_rank(self.role)
    }
}

/// Safe user representation for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    pub force_change_password: bool,
    pub role: i16,
    pub place: DbId,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            display_name: user.display_name.clone(),
            force_change_password: user.force_change_password,
            role: user.role,
            place: user.place_id,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// DTO for creating a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
    pub place_id: DbId,
    pub force_change_password: bool,
}
