//! Tenant boundary: who may act on which place, user or catalog entry.
//!
//! Every check is a pure function of the [`Caller`] and the ids involved.
//! Existence of referenced places is the caller's job (it needs the store);
//! [`Placement::OtherPlace`] signals when such a lookup is still due.

use crate::auth::Caller;
use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// Fail with `insufficient_role` unless `caller` holds at least `required`.
pub fn require_role(caller: &Caller, required: Role) -> Result<(), CoreError> {
    if caller.has_at_least(required) {
        Ok(())
    } else {
        Err(CoreError::insufficient_role())
    }
}

pub fn can_create_place(caller: &Caller) -> Result<(), CoreError> {
    require_role(caller, Role::GlobalAdmin)
}

/// Self-service edit of the caller's own place. Returns the id of the place
/// that may be edited; there is no way to target another place here.
pub fn can_edit_own_place(caller: &Caller) -> Result<DbId, CoreError> {
    require_role(caller, Role::LocalManager)?;
    Ok(caller.place_id)
}

/// Edit of an arbitrary place: local managers for their own place, global
/// admins for any place.
pub fn can_edit_place(caller: &Caller, place_id: DbId) -> Result<(), CoreError> {
    if caller.belongs_to(place_id) {
        require_role(caller, Role::LocalManager)
    } else {
        require_role(caller, Role::GlobalAdmin)
    }
}

/// Where a newly created user or instance will be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The creator's own place.
    OwnPlace(DbId),
    /// A different place, which the caller must still confirm exists.
    OtherPlace(DbId),
}

impl Placement {
    pub fn place_id(self) -> DbId {
        match self {
            Placement::OwnPlace(id) | Placement::OtherPlace(id) => id,
        }
    }
}

/// Decide whether `caller` may create a user with `target_role` at
/// `target_place` (`None` meaning the caller's own place).
///
/// Nobody can create a user with more privilege than they hold.
pub fn can_create_user_for(
    caller: &Caller,
    target_place: Option<DbId>,
    target_role: Role,
) -> Result<Placement, CoreError> {
    require_role(caller, Role::LocalAdmin)?;

    let placement = match target_place {
        Some(place_id) if !caller.belongs_to(place_id) => {
            require_role(caller, Role::GlobalAdmin)?;
            Placement::OtherPlace(place_id)
        }
        _ => Placement::OwnPlace(caller.place_id),
    };

    if target_role > caller.role {
        return Err(CoreError::insufficient_role());
    }
    Ok(placement)
}

/// Listing the users of a place: own place from local manager up, any other
/// place from global manager up.
pub fn can_list_users_of_place(caller: &Caller, place_id: DbId) -> Result<(), CoreError> {
    if caller.belongs_to(place_id) {
        require_role(caller, Role::LocalManager)
    } else {
        require_role(caller, Role::GlobalManager)
    }
}

pub fn can_list_all_users(caller: &Caller) -> Result<(), CoreError> {
    require_role(caller, Role::GlobalAdmin)
}

/// Reading another user's profile: local admins within their place, global
/// admins anywhere.
pub fn can_view_user(caller: &Caller, user_place: DbId) -> Result<(), CoreError> {
    require_role(caller, Role::LocalAdmin)?;
    if !caller.belongs_to(user_place) {
        require_role(caller, Role::GlobalAdmin)?;
    }
    Ok(())
}

/// Deleting a user follows the same place scoping as reading one.
pub fn can_delete_user(caller: &Caller, user_place: DbId) -> Result<(), CoreError> {
    can_view_user(caller, user_place)
}

/// Creating, editing or removing catalog entries and their images.
pub fn can_manage_catalog(caller: &Caller) -> Result<(), CoreError> {
    require_role(caller, Role::GlobalAdmin)
}
