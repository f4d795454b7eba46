//! Caller identity and the forced-password-change gate.

use crate::roles::Role;
use crate::types::DbId;

/// Token issuer claim.
pub const TOKEN_ISSUER: &str = "urn:pomuckydb:issuer";
/// Token audience claim.
pub const TOKEN_AUDIENCE: &str = "urn:pomuckydb:audience";
/// Name of the cookie carrying the token.
pub const TOKEN_COOKIE: &str = "token";
/// Token lifetime when not overridden by configuration.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 12;

/// Identity of an authenticated caller, reduced to what authorization
/// decisions need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: DbId,
    pub role: Role,
    pub place_id: DbId,
}

impl Caller {
    pub fn has_at_least(&self, required: Role) -> bool {
        self.role.has_at_least(required)
    }

    pub fn belongs_to(&self, place_id: DbId) -> bool {
        self.place_id == place_id
    }
}

/// Routes a user with a pending forced password change may still call:
/// changing their own password, and obtaining or discarding a token.
const PASSWORD_GATE_EXEMPT: &[(&str, &str)] = &[
    ("PUT", "/users/@self"),
    ("PUT", "/token"),
    ("DELETE", "/token"),
];

/// `true` when the request may proceed for a user whose
/// `force_change_password` flag is set.
pub fn exempt_from_password_gate(method: &str, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    PASSWORD_GATE_EXEMPT
        .iter()
        .any(|(m, p)| m.eq_ignore_ascii_case(method) && *p == path)
}
