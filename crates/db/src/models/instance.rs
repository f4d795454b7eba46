//! Instance model, DTOs and caller-filtered response shapes.
//!
//! Rows never leave the server as-is: every response goes through
//! [`RentedByView::for_caller`] so the renter identity is only shown to the
//! hosting place and global staff.

use std::collections::HashMap;

use pomucky_core::auth::Caller;
use pomucky_core::instance::{LoanChange, LoanState, RentedByView};
use pomucky_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::place::Place;

/// Full row from the `instances` table.
#[derive(Debug, Clone, FromRow)]
pub struct InstanceRow {
    pub id: DbId,
    pub pomucka_id: DbId,
    pub owned_by: DbId,
    pub currently_at: DbId,
    pub rented_by_name: Option<String>,
    pub rented_by_identifier: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl InstanceRow {
    pub fn loan_state(&self) -> LoanState {
        LoanState::from_columns(
            self.rented_by_name.clone(),
            self.rented_by_identifier.clone(),
        )
    }

    pub fn rented_by_for(&self, caller: Option<&Caller>) -> RentedByView {
        RentedByView::for_caller(caller, self.currently_at, &self.loan_state())
    }
}

/// DTO for registering a new instance. Owner and location both start at
/// `place_id`.
#[derive(Debug, Clone, Copy)]
pub struct CreateInstance {
    pub pomucka_id: DbId,
    pub place_id: DbId,
}

/// DTO for relocating an instance and changing its loan in one write.
#[derive(Debug, Clone, Default)]
pub struct UpdateInstance {
    pub currently_at: Option<DbId>,
    pub loan: LoanChange,
}

/// Instance with its places embedded, as returned by the instance endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceView {
    pub id: DbId,
    pub pomucka: DbId,
    pub owned_by: Place,
    pub currently_at: Place,
    pub rented_by: RentedByView,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl InstanceView {
    /// Assemble a view from a row and a lookup of the places it references.
    /// Returns `None` if either place is missing from `places`.
    pub fn assemble(
        row: &InstanceRow,
        places: &HashMap<DbId, Place>,
        caller: Option<&Caller>,
    ) -> Option<Self> {
        Some(Self {
            id: row.id,
            pomucka: row.pomucka_id,
            owned_by: places.get(&row.owned_by)?.clone(),
            currently_at: places.get(&row.currently_at)?.clone(),
            rented_by: row.rented_by_for(caller),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Instance with place ids only, used where the places are listed alongside.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSummary {
    pub id: DbId,
    pub owned_by: DbId,
    pub currently_at: DbId,
    pub rented_by: RentedByView,
}

impl InstanceSummary {
    pub fn for_caller(row: &InstanceRow, caller: Option<&Caller>) -> Self {
        Self {
            id: row.id,
            owned_by: row.owned_by,
            currently_at: row.currently_at,
            rented_by: row.rented_by_for(caller),
        }
    }
}

/// Distinct place ids referenced by `rows`, in first-seen order.
pub fn referenced_places(rows: &[InstanceRow]) -> Vec<DbId> {
    let mut ids = Vec::new();
    for row in rows {
        for id in [row.owned_by, row.currently_at] {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pomucky_core::roles::Role;
    use sqlx::types::Json;

    fn row(owned_by: DbId, currently_at: DbId, on_loan: bool) -> InstanceRow {
        InstanceRow {
            id: 1,
            pomucka_id: 5,
            owned_by,
            currently_at,
            rented_by_name: on_loan.then(|| "Jan".to_string()),
            rented_by_identifier: on_loan.then(|| "Z-1".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn place(id: DbId) -> Place {
        Place {
            id,
            name: format!("Place {id}"),
            description: String::new(),
            website: String::new(),
            contacts: Json(Vec::new()),
            has_banner: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn referenced_places_are_distinct() {
        let rows = [row(1, 2, false), row(2, 2, false), row(1, 3, true)];
        assert_eq!(referenced_places(&rows), vec![1, 2, 3]);
    }

    #[test]
    fn view_embeds_places_and_filters_renter() {
        let places: HashMap<_, _> = [(1, place(1)), (2, place(2))].into_iter().collect();
        let outsider = Caller {
            user_id: 9,
            role: Role::LocalAdmin,
            place_id: 1,
        };

        let view = InstanceView::assemble(&row(1, 2, true), &places, Some(&outsider)).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["ownedBy"]["id"], 1);
        assert_eq!(json["currentlyAt"]["name"], "Place 2");
        assert_eq!(json["rentedBy"], true);
        assert!(json["currentlyAt"].get("banner").is_none());
    }

    #[test]
    fn view_requires_both_places() {
        let places: HashMap<_, _> = [(1, place(1))].into_iter().collect();
        assert!(InstanceView::assemble(&row(1, 2, false), &places, None).is_none());
    }
}
