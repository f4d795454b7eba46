//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects with 403 `insufficient_role`
//! when the caller ranks below the guard. Since roles are ordered, every
//! guard also admits all higher roles.
//!
//! ```ignore
//! async fn admin_only(RequireGlobalAdmin(user): RequireGlobalAdmin) -> AppResult<Json<()>> {
//!     // user.caller.role >= Role::GlobalAdmin here
//!     Ok(Json(()))
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pomucky_core::access::require_role;
use pomucky_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

macro_rules! role_guard {
    ($(#[$doc:meta])* $name:ident => $role:expr) => {
        $(#[$doc])*
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = AuthUser::from_request_parts(parts, state).await?;
                require_role(&user.caller, $role)?;
                Ok($name(user))
            }
        }
    };
}

role_guard!(
    /// Requires `LocalAdmin` or above.
    RequireLocalAdmin => Role::LocalAdmin
);
role_guard!(
    /// Requires `GlobalAdmin` or above.
    RequireGlobalAdmin => Role::GlobalAdmin
);
