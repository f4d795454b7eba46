//! Privilege levels.
//!
//! Roles form a total order: a user may always do whatever a lower role may
//! do (a `GlobalManager` is also a `LocalAdmin` and a `LocalManager`). The
//! numeric rank is what is stored in the `users.role` column and what travels
//! over the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum Role {
    Default = 0,
    LocalManager = 1,
    LocalAdmin = 2,
    GlobalManager = 3,
    GlobalAdmin = 4,
    Developer = 5,
}

/// Every role, lowest first.
pub const ALL_ROLES: [Role; 6] = [
    Role::Default,
    Role::LocalManager,
    Role::LocalAdmin,
    Role::GlobalManager,
    Role::GlobalAdmin,
    Role::Developer,
];

impl Role {
    pub fn rank(self) -> i16 {
        self as i16
    }

    /// Look up a role by its stored rank. `None` for ranks outside 0..=5.
    pub fn from_rank(rank: i16) -> Option<Self> {
        ALL_ROLES.iter().copied().find(|r| r.rank() == rank)
    }

    /// `true` when `self` grants at least the permissions of `required`.
    pub fn has_at_least(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

impl From<Role> for i16 {
    fn from(role: Role) -> Self {
        role.rank()
    }
}

impl TryFrom<i16> for Role {
    type Error = String;

    fn try_from(rank: i16) -> Result<Self, Self::Error> {
        Role::from_rank(rank).ok_or_else(|| format!("unknown role rank {rank}"))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Default => "DEFAULT",
            Role::LocalManager => "LOCAL_MANAGER",
            Role::LocalAdmin => "LOCAL_ADMIN",
            Role::GlobalManager => "GLOBAL_MANAGER",
            Role::GlobalAdmin => "GLOBAL_ADMIN",
            Role::Developer => "DEVELOPER",
        };
        f.write_str(name)
    }
}
