//! Lifecycle of a physical aid instance and what each caller may see of it.
//!
//! An instance is always held by a place (`currently_at`). It is either in
//! that place's custody or on loan to an outside party ([`Renter`]).
//! Ownership (`owned_by`) is fixed at creation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::access::{require_role, Placement};
use crate::auth::Caller;
use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// External, non-tenant party currently borrowing an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Renter {
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanState {
    InCustody,
    OnLoan(Renter),
}

impl LoanState {
    /// Rebuild the state from the two nullable storage columns. A half-set
    /// pair is treated as in custody; the table constraint forbids it anyway.
    pub fn from_columns(name: Option<String>, identifier: Option<String>) -> Self {
        match (name, identifier) {
            (Some(name), Some(identifier)) => LoanState::OnLoan(Renter { name, identifier }),
            _ => LoanState::InCustody,
        }
    }

    pub fn is_on_loan(&self) -> bool {
        matches!(self, LoanState::OnLoan(_))
    }

    pub fn renter(&self) -> Option<&Renter> {
        match self {
            LoanState::OnLoan(renter) => Some(renter),
            LoanState::InCustody => None,
        }
    }
}

/// Requested change to the loan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoanChange {
    #[default]
    Keep,
    Assign(Renter),
    Clear,
}

impl LoanChange {
    /// Map the wire shape: field absent keeps, `null` clears, object assigns.
    pub fn from_request(field: Option<Option<Renter>>) -> Self {
        match field {
            None => LoanChange::Keep,
            Some(None) => LoanChange::Clear,
            Some(Some(renter)) => LoanChange::Assign(renter),
        }
    }

    /// Resulting loan state once applied to `current`.
    pub fn apply(self, current: LoanState) -> LoanState {
        match self {
            LoanChange::Keep => current,
            LoanChange::Assign(renter) => LoanState::OnLoan(renter),
            LoanChange::Clear => LoanState::InCustody,
        }
    }
}

/// Decide which place a new instance belongs to.
///
/// Staff register instances for their own place. Naming another place
/// requires global manager rank; that place must then be looked up.
pub fn creation_place(caller: &Caller, requested: Option<DbId>) -> Result<Placement, CoreError> {
    match requested {
        Some(place_id) if !caller.belongs_to(place_id) => {
            require_role(caller, Role::GlobalManager)?;
            Ok(Placement::OtherPlace(place_id))
        }
        _ => Ok(Placement::OwnPlace(caller.place_id)),
    }
}

/// Relocation and loan changes: staff of the owning place, staff of the
/// hosting place, or global managers and up.
pub fn can_modify_instance(
    caller: &Caller,
    owned_by: DbId,
    currently_at: DbId,
) -> Result<(), CoreError> {
    if caller.belongs_to(owned_by) || caller.belongs_to(currently_at) {
        return Ok(());
    }
    require_role(caller, Role::GlobalManager)
}

/// Whether the renter's identity may be shown to `caller` for an instance
/// held at `currently_at`. Anonymous callers never see it.
pub fn renter_visible_to(caller: Option<&Caller>, currently_at: DbId) -> bool {
    caller.is_some_and(|c| c.has_at_least(Role::GlobalManager) || c.belongs_to(currently_at))
}

/// The `rentedBy` field as returned to a particular caller: the full renter
/// when visible, otherwise only whether a loan exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RentedByView {
    Renter(Renter),
    OnLoan(bool),
}

impl RentedByView {
    pub fn for_caller(caller: Option<&Caller>, currently_at: DbId, state: &LoanState) -> Self {
        match state.renter() {
            Some(renter) if renter_visible_to(caller, currently_at) => {
                RentedByView::Renter(renter.clone())
            }
            _ => RentedByView::OnLoan(state.is_on_loan()),
        }
    }
}
