//! # Operations
//!
//! Every operation exposed to collaborators, and the access level each one
//! requires.

use serde::{Deserialize, Serialize};

/// Access level an operation requires from the caller.
///
/// Levels are checked against the caller's resolved roles by
/// [`evaluate`](crate::policy::evaluate):
/// - **Authenticated**: any authenticated caller
/// - **Subject**: the caller must be the user the operation is about
/// - **OrganizationMember**: any organization role
/// - **OrganizationAdmin**: organization `ADMIN`
/// - **TeamMember**: any team role, or organization `ADMIN`
/// - **TeamAdmin**: team `ADMIN`, or organization `ADMIN`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Any authenticated caller.
    Authenticated,

    /// The caller acting on their own user record.
    Subject,

    /// Any member of the target organization.
    OrganizationMember,

    /// An admin of the target organization.
    OrganizationAdmin,

    /// A member of the target team, or an admin of its organization.
    TeamMember,

    /// An admin of the target team, or an admin of its organization.
    TeamAdmin,
}

impl AccessLevel {
    /// Get the string representation of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Authenticated => "authenticated",
            AccessLevel::Subject => "subject",
            AccessLevel::OrganizationMember => "organization_member",
            AccessLevel::OrganizationAdmin => "organization_admin",
            AccessLevel::TeamMember => "team_member",
            AccessLevel::TeamAdmin => "team_admin",
        }
    }

    /// Check if the level is decided from the caller's organization roles.
    pub fn is_organization_scoped(&self) -> bool {
        !matches!(self, AccessLevel::Authenticated | AccessLevel::Subject)
    }

    /// Check if the level needs a team in the target.
    pub fn requires_team(&self) -> bool {
        matches!(self, AccessLevel::TeamMember | AccessLevel::TeamAdmin)
    }
}

/// Operations gated by the authorization gate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// List the organizations a user belongs to.
    ListUserOrganizations,

    /// Create an organization with the caller as founder.
    CreateOrganization,

    /// View an organization with the caller's role.
    ViewOrganization,

    /// List an organization's teams.
    ListTeams,

    /// Create a team.
    CreateTeam,

    /// List an organization's users.
    ListOrganizationUsers,

    /// Add or re-role an organization user.
    AddOrganizationUser,

    /// Remove an organization user, cascading to their teams.
    RemoveOrganizationUser,

    /// View a team with the caller's roles at both levels.
    ViewTeam,

    /// Add or re-role a team user.
    AddTeamUser,

    /// Remove a team user.
    RemoveTeamUser,
}

impl Operation {
    /// Get the access level this operation requires.
    ///
    /// # Example
    ///
    /// ```
    /// use roster_rbac::{AccessLevel, Operation};
    ///
    /// assert_eq!(Operation::CreateTeam.access_level(), AccessLevel::OrganizationAdmin);
    /// assert_eq!(Operation::AddTeamUser.access_level(), AccessLevel::TeamAdmin);
    /// ```
    pub fn access_level(&self) -> AccessLevel {
        match self {
            Operation::ListUserOrganizations => AccessLevel::Subject,
            Operation::CreateOrganization => AccessLevel::Authenticated,
            Operation::ViewOrganization
            | Operation::ListTeams
            | Operation::ListOrganizationUsers => AccessLevel::OrganizationMember,
            Operation::CreateTeam
            | Operation::AddOrganizationUser
            | Operation::RemoveOrganizationUser => AccessLevel::OrganizationAdmin,
            Operation::ViewTeam => AccessLevel::TeamMember,
            Operation::AddTeamUser | Operation::RemoveTeamUser => AccessLevel::TeamAdmin,
        }
    }

    /// Get the string representation of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListUserOrganizations => "list_user_organizations",
            Operation::CreateOrganization => "create_organization",
            Operation::ViewOrganization => "view_organization",
            Operation::ListTeams => "list_teams",
            Operation::CreateTeam => "create_team",
            Operation::ListOrganizationUsers => "list_organization_users",
            Operation::AddOrganizationUser => "add_organization_user",
            Operation::RemoveOrganizationUser => "remove_organization_user",
            Operation::ViewTeam => "view_team",
            Operation::AddTeamUser => "add_team_user",
            Operation::RemoveTeamUser => "remove_team_user",
        }
    }

    /// Get all operations.
    pub fn all() -> Vec<Self> {
        vec![
            Operation::ListUserOrganizations,
            Operation::CreateOrganization,
            Operation::ViewOrganization,
            Operation::ListTeams,
            Operation::CreateTeam,
            Operation::ListOrganizationUsers,
            Operation::AddOrganizationUser,
            Operation::RemoveOrganizationUser,
            Operation::ViewTeam,
            Operation::AddTeamUser,
            Operation::RemoveTeamUser,
        ]
    }

    /// Check if this operation changes state.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Operation::CreateOrganization
                | Operation::CreateTeam
                | Operation::AddOrganizationUser
                | Operation::RemoveOrganizationUser
                | Operation::AddTeamUser
                | Operation::RemoveTeamUser
        )
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_classes() {
        for op in [
            Operation::CreateTeam,
            Operation::AddOrganizationUser,
            Operation::RemoveOrganizationUser,
        ] {
            assert_eq!(op.access_level(), AccessLevel::OrganizationAdmin, "{op}");
        }
        for op in [
            Operation::ListTeams,
            Operation::ListOrganizationUsers,
            Operation::ViewOrganization,
        ] {
            assert_eq!(op.access_level(), AccessLevel::OrganizationMember, "{op}");
        }
        for op in [Operation::AddTeamUser, Operation::RemoveTeamUser] {
            assert_eq!(op.access_level(), AccessLevel::TeamAdmin, "{op}");
        }
    }

    #[test]
    fn test_team_levels_require_team() {
        let team_ops: Vec<_> = Operation::all()
            .into_iter()
            .filter(|op| op.access_level().requires_team())
            .collect();
        assert_eq!(
            team_ops,
            vec![
                Operation::ViewTeam,
                Operation::AddTeamUser,
                Operation::RemoveTeamUser
            ]
        );
    }

    #[test]
    fn test_unscoped_levels() {
        assert!(!AccessLevel::Authenticated.is_organization_scoped());
        assert!(!AccessLevel::Subject.is_organization_scoped());
        assert!(AccessLevel::TeamAdmin.is_organization_scoped());
    }

    #[test]
    fn test_is_write() {
        assert!(Operation::RemoveTeamUser.is_write());
        assert!(!Operation::ViewTeam.is_write());
        assert_eq!(Operation::all().iter().filter(|op| op.is_write()).count(), 6);
    }
}
