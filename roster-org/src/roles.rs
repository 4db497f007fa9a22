//! Membership roles
//!
//! This module defines the closed role set shared by organization and team
//! memberships, along with its ordering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OrgError;

/// Role held by a user within an organization or a team.
///
/// The set is closed and ordered: `Member < Admin`. The same enumeration is
/// used at both levels of the hierarchy; what a role grants is decided by the
/// authorization policy, not by the role itself.
///
/// On the wire roles are the case-sensitive strings `MEMBER` and `ADMIN`.
/// Any other value is rejected when parsing or deserializing.
///
/// # Examples
///
/// ```
/// use roster_org::Role;
///
/// assert!(Role::Admin > Role::Member);
/// assert_eq!(Role::parse("ADMIN").unwrap(), Role::Admin);
/// assert!(Role::parse("admin").is_err());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular member
    Member = 1,

    /// Administers the organization or team
    Admin = 2,
}

impl Role {
    /// All roles, lowest first.
    pub const ALL: [Role; 2] = [Role::Member, Role::Admin];

    /// Check if this role has admin privileges.
    pub fn is_admin(&self) -> bool {
        *self >= Role::Admin
    }

    /// Check whether this role satisfies a required minimum role.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_org::Role;
    ///
    /// assert!(Role::Admin.satisfies(Role::Member));
    /// assert!(!Role::Member.satisfies(Role::Admin));
    /// ```
    pub fn satisfies(&self, required: Role) -> bool {
        *self >= required
    }

    /// Parse a role from its wire representation.
    ///
    /// Matching is case-sensitive: only `MEMBER` and `ADMIN` are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`OrgError::Validation`] for any other value.
    pub fn parse(s: &str) -> Result<Self, OrgError> {
        match s {
            "MEMBER" => Ok(Self::Member),
            "ADMIN" => Ok(Self::Admin),
            other => Err(OrgError::Validation(format!("unrecognized role '{}'", other))),
        }
    }

    /// Get the wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "MEMBER",
            Self::Admin => "ADMIN",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::Admin => "Admin",
        }
    }
}

impl FromStr for Role {
    type Err = OrgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
