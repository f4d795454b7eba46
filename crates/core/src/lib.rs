//! Domain logic for the assistive-aid catalog and lending service.
//!
//! Nothing in this crate performs I/O. The database and HTTP layers call into
//! it to decide who may do what and to shape what each caller may see.

pub mod access;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod instance;
pub mod media;
pub mod place;
pub mod roles;
pub mod types;
pub mod validation;
