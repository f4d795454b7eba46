//! Place (tenant) contact records.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{first_field_error, FieldError};

/// One contact person listed on a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Contact {
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub description: String,
}

/// Validate a full replacement contact list, reporting the first offending
/// element as `contacts[i].<field>`.
pub fn validate_contacts(contacts: &[Contact]) -> Result<(), FieldError> {
    for (index, contact) in contacts.iter().enumerate() {
        if let Err(errors) = contact.validate() {
            if let Some(mut err) = first_field_error(&errors) {
                err.key = format!("contacts[{index}].{}", err.key);
                return Err(err);
            }
        }
    }
    Ok(())
}
