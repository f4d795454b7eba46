//! Structured field-level validation errors.
//!
//! Request DTOs derive [`validator::Validate`]; [`first_field_error`] turns the
//! nested `ValidationErrors` tree into a single [`FieldError`] whose `key` is
//! the dotted/indexed path of the offending field (`contacts[1].email`,
//! `rentedBy.name`).

use std::fmt;

use serde::Serialize;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Minimum password length (characters).
pub const MIN_PASSWORD_LENGTH: u64 = 6;
/// Maximum password length (characters).
pub const MAX_PASSWORD_LENGTH: u64 = 72;
/// Minimum user name length.
pub const MIN_NAME_LENGTH: u64 = 2;
/// Maximum user name length.
pub const MAX_NAME_LENGTH: u64 = 256;

/// Error code for a field of the wrong JSON type.
pub const ERR_INVALID_TYPE: &str = "invalid_type";
/// Error code for a missing or empty required field.
pub const ERR_REQUIRED: &str = "required";
/// Error code for a field referencing a missing entity.
pub const ERR_NOT_FOUND: &str = "not_found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Path of the offending field.
    pub key: String,
    /// Short machine-readable reason (`required`, `length`, `email`, ...).
    pub err: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl FieldError {
    pub fn new(key: impl Into<String>, err: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            err: err.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.err)?;
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

/// Flatten a `ValidationErrors` tree and return the first error in key order.
///
/// Returns `None` only for an empty error set.
pub fn first_field_error(errors: &ValidationErrors) -> Option<FieldError> {
    let mut flat = Vec::new();
    collect(errors, "", &mut flat);
    flat.sort_by(|a, b| a.key.cmp(&b.key));
    flat.into_iter().next()
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = join_path(prefix, field);
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(first) = list.first() {
                    let mut err = FieldError::new(path, first.code.to_string());
                    if let Some(message) = &first.message {
                        err = err.with_details(message.to_string());
                    }
                    out.push(err);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    let field = to_camel_case(field);
    if prefix.is_empty() {
        field
    } else {
        format!("{prefix}.{field}")
    }
}

/// Struct fields are snake_case in Rust but camelCase on the wire.
fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Check a new password against the length policy.
pub fn password_length_ok(password: &str) -> bool {
    let len = password.chars().count() as u64;
    (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len)
}
