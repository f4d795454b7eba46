//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- Ed25519-signed token issuance and verification.
//! - [`cookie`] -- The `token` cookie that carries it.

pub mod cookie;
pub mod jwt;
pub mod password;
