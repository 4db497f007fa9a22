//! # Policy
//!
//! The authorization decision as a pure function of the caller's resolved
//! roles and the access level an operation requires.
//!
//! Organization `ADMIN` dominates every team of the organization: it satisfies
//! team-level requirements whatever the caller's own team role is, including
//! none at all. A team role never grants anything at organization level.

use roster_org::{ResolvedRoles, Role};
use serde::{Deserialize, Serialize};

use crate::operations::AccessLevel;

/// Why a request was denied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    /// No authenticated user
    Unauthenticated,
    /// The caller is not the subject of the operation
    NotSubject,
    /// No organization membership
    OrganizationMemberRequired,
    /// Organization `ADMIN` required
    OrganizationAdminRequired,
    /// Team membership (or organization `ADMIN`) required
    TeamMemberRequired,
    /// Team `ADMIN` (or organization `ADMIN`) required
    TeamAdminRequired,
}

impl DenyReason {
    /// Stable code for API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "UNAUTHENTICATED",
            DenyReason::NotSubject => "NOT_SUBJECT",
            DenyReason::OrganizationMemberRequired => "ORGANIZATION_MEMBER_REQUIRED",
            DenyReason::OrganizationAdminRequired => "ORGANIZATION_ADMIN_REQUIRED",
            DenyReason::TeamMemberRequired => "TEAM_MEMBER_REQUIRED",
            DenyReason::TeamAdminRequired => "TEAM_ADMIN_REQUIRED",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The caller may proceed
    Allow,
    /// The caller may not proceed
    Deny(DenyReason),
}

impl Decision {
    /// Check if the decision allows the request.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

fn require(granted: bool, reason: DenyReason) -> Decision {
    if granted {
        Decision::Allow
    } else {
        Decision::Deny(reason)
    }
}

/// Decide whether resolved roles satisfy an organization-scoped access level.
///
/// `Authenticated` and `Subject` are not role-based; they are always allowed
/// here and must be checked against the request identity by the caller.
///
/// # Example
///
/// ```
/// use roster_org::{ResolvedRoles, Role};
/// use roster_rbac::{evaluate, AccessLevel};
///
/// // An organization admin with no team membership can administer the team.
/// let roles = ResolvedRoles { organization_role: Some(Role::Admin), team_role: None };
/// assert!(evaluate(AccessLevel::TeamAdmin, &roles).is_allowed());
///
/// // A team member cannot.
/// let roles = ResolvedRoles {
///     organization_role: Some(Role::Member),
///     team_role: Some(Role::Member),
/// };
/// assert!(!evaluate(AccessLevel::TeamAdmin, &roles).is_allowed());
/// ```
pub fn evaluate(level: AccessLevel, roles: &ResolvedRoles) -> Decision {
    let org_admin = roles.organization_role == Some(Role::Admin);

    match level {
        AccessLevel::Authenticated | AccessLevel::Subject => Decision::Allow,
        AccessLevel::OrganizationMember => require(
            roles.organization_role.is_some(),
            DenyReason::OrganizationMemberRequired,
        ),
        AccessLevel::OrganizationAdmin => {
            require(org_admin, DenyReason::OrganizationAdminRequired)
        }
        AccessLevel::TeamMember => require(
            org_admin || roles.team_role.is_some(),
            DenyReason::TeamMemberRequired,
        ),
        AccessLevel::TeamAdmin => require(
            org_admin || roles.team_role == Some(Role::Admin),
            DenyReason::TeamAdminRequired,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(org: Option<Role>, team: Option<Role>) -> ResolvedRoles {
        ResolvedRoles {
            organization_role: org,
            team_role: team,
        }
    }

    #[test]
    fn test_organization_levels() {
        let none = roles(None, None);
        let member = roles(Some(Role::Member), None);
        let admin = roles(Some(Role::Admin), None);

        assert_eq!(
            evaluate(AccessLevel::OrganizationMember, &none),
            Decision::Deny(DenyReason::OrganizationMemberRequired)
        );
        assert!(evaluate(AccessLevel::OrganizationMember, &member).is_allowed());
        assert!(evaluate(AccessLevel::OrganizationMember, &admin).is_allowed());

        assert_eq!(
            evaluate(AccessLevel::OrganizationAdmin, &member),
            Decision::Deny(DenyReason::OrganizationAdminRequired)
        );
        assert!(evaluate(AccessLevel::OrganizationAdmin, &admin).is_allowed());
    }

    #[test]
    fn test_team_role_never_grants_organization_access() {
        let team_admin_only = roles(None, Some(Role::Admin));
        assert!(!evaluate(AccessLevel::OrganizationMember, &team_admin_only).is_allowed());

        let team_admin = roles(Some(Role::Member), Some(Role::Admin));
        assert!(!evaluate(AccessLevel::OrganizationAdmin, &team_admin).is_allowed());
    }

    #[test]
    fn test_team_admin_dominance() {
        // organization admin, no team role
        assert!(evaluate(AccessLevel::TeamAdmin, &roles(Some(Role::Admin), None)).is_allowed());
        // organization admin, team member
        assert!(evaluate(
            AccessLevel::TeamAdmin,
            &roles(Some(Role::Admin), Some(Role::Member))
        )
        .is_allowed());
        // team admin
        assert!(evaluate(
            AccessLevel::TeamAdmin,
            &roles(Some(Role::Member), Some(Role::Admin))
        )
        .is_allowed());
        // team member with organization member standing
        assert_eq!(
            evaluate(
                AccessLevel::TeamAdmin,
                &roles(Some(Role::Member), Some(Role::Member))
            ),
            Decision::Deny(DenyReason::TeamAdminRequired)
        );
        // organization member outside the team
        assert!(!evaluate(AccessLevel::TeamAdmin, &roles(Some(Role::Member), None)).is_allowed());
    }

    #[test]
    fn test_team_member_level() {
        assert!(evaluate(AccessLevel::TeamMember, &roles(Some(Role::Admin), None)).is_allowed());
        assert!(evaluate(
            AccessLevel::TeamMember,
            &roles(Some(Role::Member), Some(Role::Member))
        )
        .is_allowed());
        assert_eq!(
            evaluate(AccessLevel::TeamMember, &roles(Some(Role::Member), None)),
            Decision::Deny(DenyReason::TeamMemberRequired)
        );
    }

    #[test]
    fn test_identity_levels_are_not_role_based() {
        let none = roles(None, None);
        assert!(evaluate(AccessLevel::Authenticated, &none).is_allowed());
        assert!(evaluate(AccessLevel::Subject, &none).is_allowed());
    }

    #[test]
    fn test_deny_reason_codes() {
        assert_eq!(
            DenyReason::TeamAdminRequired.as_str(),
            "TEAM_ADMIN_REQUIRED"
        );
        assert_eq!(
            serde_json::to_string(&DenyReason::OrganizationAdminRequired).unwrap(),
            "\"ORGANIZATION_ADMIN_REQUIRED\""
        );
    }
}
