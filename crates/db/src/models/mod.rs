//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for partial updates
//! - Response shapes where the row must not be serialized as-is

pub mod image;
pub mod instance;
pub mod place;
pub mod pomucka;
pub mod stats;
pub mod user;
