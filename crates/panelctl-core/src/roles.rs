//! Role hierarchy for panel accounts.
//!
//! Roles are totally ordered by privilege: `user < admin < superadmin`.
//! The derived `Ord` relies on variant declaration order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Privilege tier of a panel account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End subscriber; self-scoped reads only.
    #[default]
    User,
    /// Operator managing their own accounts.
    Admin,
    /// Full control, including servers and the audit log.
    Superadmin,
}

impl Role {
    /// True when the role carries at least admin privileges.
    pub fn is_privileged(self) -> bool {
        self >= Self::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::Superadmin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Identity of the acting session, as resolved from the remote authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Account id of the caller.
    pub id: u64,
    /// Resolved role of the caller.
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_totally_ordered() {
        assert!(Role::User < Role::Admin);
        assert!(Role::Admin < Role::Superadmin);
        assert!(Role::Superadmin > Role::User);
    }

    #[test]
    fn privileged_threshold_is_admin() {
        assert!(!Role::User.is_privileged());
        assert!(Role::Admin.is_privileged());
        assert!(Role::Superadmin.is_privileged());
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::User, Role::Admin, Role::Superadmin] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn role_deserializes_lowercase() {
        let role: Role = serde_json::from_str("\"superadmin\"").unwrap();
        assert_eq!(role, Role::Superadmin);
    }
}
