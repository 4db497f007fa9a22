//! Membership domain models
//!
//! This module provides membership entities that link users to organizations
//! and teams. A membership is unique per `(scope, user)` pair; adding the same
//! user again overwrites the role instead of creating a second row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::Role;

/// Organization membership linking a user to an organization.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use roster_org::{OrganizationMembership, Role};
///
/// let org_id = Uuid::now_v7();
/// let user_id = Uuid::now_v7();
/// let membership = OrganizationMembership::new(org_id, user_id, Role::Member);
/// assert_eq!(membership.role, Role::Member);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMembership {
    /// Organization ID
    pub organization_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the organization
    pub role: Role,

    /// When the user joined
    pub joined_at: DateTime<Utc>,

    /// When the role was last changed
    pub updated_at: DateTime<Utc>,
}

impl OrganizationMembership {
    /// Creates a new organization membership.
    ///
    /// # Arguments
    ///
    /// * `organization_id` - The organization ID
    /// * `user_id` - The user ID
    /// * `role` - The user's role in the organization
    pub fn new(organization_id: Uuid, user_id: Uuid, role: Role) -> Self {
        let now = Utc::now();
        Self {
            organization_id,
            user_id,
            role,
            joined_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the role, keeping the original join time.
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }
}

/// Team membership linking a user to a team.
///
/// A team membership may only be created while the user holds a membership
/// in the team's organization; the store enforces this at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMembership {
    /// Team ID
    pub team_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the team
    pub role: Role,

    /// When the user was added
    pub added_at: DateTime<Utc>,

    /// When the role was last changed
    pub updated_at: DateTime<Utc>,
}

impl TeamMembership {
    /// Creates a new team membership.
    ///
    /// # Arguments
    ///
    /// * `team_id` - The team ID
    /// * `user_id` - The user ID
    /// * `role` - The user's role in the team
    pub fn new(team_id: Uuid, user_id: Uuid, role: Role) -> Self {
        let now = Utc::now();
        Self {
            team_id,
            user_id,
            role,
            added_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the role, keeping the original add time.
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }
}

/// Outcome of removing a user from an organization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRemoval {
    /// Whether an organization membership existed and was removed
    pub organization_membership_removed: bool,

    /// Number of team memberships removed by the cascade
    pub team_memberships_removed: usize,

    /// Whether the removed user was the organization's last admin
    pub left_without_admin: bool,
}

impl MemberRemoval {
    /// Check whether the removal changed any state.
    pub fn is_noop(&self) -> bool {
        !self.organization_membership_removed && self.team_memberships_removed == 0
    }
}
