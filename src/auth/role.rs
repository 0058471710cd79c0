//! # Roles
//!
//! The role hierarchy is a total order:
//! `viewer(1) < post_admin(2) < super_admin(3)`.
//!
//! A caller is authorized for an operation iff its rank is at least the
//! operation's minimum rank. The comparison is a pure function and does not
//! depend on where credentials are stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};

/// Caller role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Read-only access
    Viewer,
    /// Branch-scoped content editor
    PostAdmin,
    /// Unrestricted; the only role allowed to hard-delete
    SuperAdmin,
}

impl Role {
    /// Numeric rank used for hierarchy comparisons
    pub fn rank(&self) -> u8 {
        match self {
            Role::Viewer => 1,
            Role::PostAdmin => 2,
            Role::SuperAdmin => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::PostAdmin => "post_admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Roles below `super_admin` only ever act on their own branch
    pub fn is_branch_scoped(&self) -> bool {
        *self != Role::SuperAdmin
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "viewer" => Ok(Role::Viewer),
            "post_admin" => Ok(Role::PostAdmin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// `true` iff `role` ranks at or above `required`
pub fn authorize(role: Role, required: Role) -> bool {
    role.rank() >= required.rank()
}

/// Request-scoped identity of a resolved caller
///
/// Never persisted on catalog items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Display name recorded in the audit trail
    pub name: String,

    pub role: Role,

    /// Branch this caller is scoped to (None = no branch)
    pub branch_id: Option<u64>,
}

impl Principal {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
            branch_id: None,
        }
    }

    pub fn with_branch(mut self, branch_id: u64) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    /// Fail with `Forbidden` unless this caller meets `required`
    pub fn require(&self, required: Role) -> AuthResult<()> {
        if authorize(self.role, required) {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                required,
                actual: self.role,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_total_order() {
        assert!(Role::Viewer < Role::PostAdmin);
        assert!(Role::PostAdmin < Role::SuperAdmin);
        assert_eq!(Role::Viewer.rank(), 1);
        assert_eq!(Role::SuperAdmin.rank(), 3);
    }

    #[test]
    fn test_authorize_matrix() {
        let roles = [Role::Viewer, Role::PostAdmin, Role::SuperAdmin];
        for caller in roles {
            for required in roles {
                assert_eq!(authorize(caller, required), caller.rank() >= required.rank());
            }
        }
        assert!(!authorize(Role::PostAdmin, Role::SuperAdmin));
        assert!(authorize(Role::SuperAdmin, Role::PostAdmin));
    }

    #[test]
    fn test_role_parse_and_serde() {
        assert_eq!("post_admin".parse::<Role>().unwrap(), Role::PostAdmin);
        assert!("admin".parse::<Role>().is_err());

        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"super_admin\"");
    }

    #[test]
    fn test_principal_require() {
        let editor = Principal::new("Mona", Role::PostAdmin).with_branch(2);
        assert!(editor.require(Role::PostAdmin).is_ok());
        assert_eq!(
            editor.require(Role::SuperAdmin),
            Err(AuthError::Forbidden {
                required: Role::SuperAdmin,
                actual: Role::PostAdmin
            })
        );
    }
}
