//! Storage contracts
//!
//! The catalog, resolver and coordinator talk to storage only through these
//! traits. Every multi-step write is a single call so a backend can run it
//! inside one transaction:
//!
//! - [`HierarchyStore::create_organization_with_admin`] writes the
//!   organization and its founding `ADMIN` membership together.
//! - [`HierarchyStore::remove_organization_member`] removes the organization
//!   membership and every dependent team membership together.
//! - [`HierarchyStore::add_team_member`] checks the organization membership
//!   in the same transaction as the insert, so a team add racing an
//!   organization removal fails instead of leaving an orphaned row.
//!
//! Role resolution is likewise one read, [`HierarchyStore::resolve_roles`],
//! so a reader never sees a team role whose organization membership is
//! already gone.
//!
//! Backends report storage failures as [`OrgError::ConflictInternal`].
//!
//! [`OrgError::ConflictInternal`]: crate::error::OrgError::ConflictInternal

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::LastAdminPolicy;
use crate::error::OrgResult;
use crate::membership::{MemberRemoval, OrganizationMembership, TeamMembership};
use crate::organization::Organization;
use crate::pagination::Page;
use crate::resolver::ResolvedRoles;
use crate::roles::Role;
use crate::team::Team;
use crate::user::User;

/// Error message used when a write would remove the last organization admin.
pub const LAST_ORGANIZATION_ADMIN: &str = "LAST_ORGANIZATION_ADMIN";

/// Lookup contract for the external identity subsystem.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find a user by normalized email.
    async fn find_user_by_email(&self, normalized_email: &str) -> OrgResult<Option<User>>;

    /// Find a user by ID.
    async fn find_user(&self, user_id: Uuid) -> OrgResult<Option<User>>;
}

/// Result of writing an organization membership.
#[derive(Debug, Clone)]
pub struct MembershipWrite {
    /// The membership as stored
    pub membership: OrganizationMembership,

    /// Whether the write demoted the organization's last admin
    pub left_without_admin: bool,
}

/// Durable record of organizations, teams and memberships.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    // === Hierarchy catalog ===

    /// Insert an organization together with its founding membership.
    async fn create_organization_with_admin(
        &self,
        organization: Organization,
        founder: OrganizationMembership,
    ) -> OrgResult<Organization>;

    /// Get an organization by ID.
    async fn get_organization(&self, organization_id: Uuid) -> OrgResult<Option<Organization>>;

    /// Insert a team. Fails with `NotFound` if its organization does not exist.
    async fn insert_team(&self, team: Team) -> OrgResult<Team>;

    /// Get a team by ID.
    async fn get_team(&self, team_id: Uuid) -> OrgResult<Option<Team>>;

    /// List an organization's teams in creation order.
    async fn list_teams(&self, organization_id: Uuid, page: Page) -> OrgResult<Vec<Team>>;

    // === Membership ledger ===

    /// Get a user's organization role.
    async fn organization_role(&self, organization_id: Uuid, user_id: Uuid)
        -> OrgResult<Option<Role>>;

    /// Get a user's team role.
    async fn team_role(&self, team_id: Uuid, user_id: Uuid) -> OrgResult<Option<Role>>;

    /// Get a user's organization role and, when `team_id` is given, team role
    /// from one consistent snapshot.
    ///
    /// Fails with `NotFound` if the organization or team does not exist, and
    /// with `Validation` if the team belongs to another organization.
    async fn resolve_roles(
        &self,
        organization_id: Uuid,
        team_id: Option<Uuid>,
        user_id: Uuid,
    ) -> OrgResult<ResolvedRoles>;

    /// Insert an organization membership, or overwrite the role of an
    /// existing one.
    ///
    /// Demoting the last admin is rejected under [`LastAdminPolicy::Forbid`].
    async fn upsert_organization_member(
        &self,
        membership: OrganizationMembership,
        policy: LastAdminPolicy,
    ) -> OrgResult<MembershipWrite>;

    /// Remove an organization membership and every team membership the user
    /// holds in that organization's teams. Removing a non-member is a no-op.
    ///
    /// Removing the last admin is rejected under [`LastAdminPolicy::Forbid`].
    async fn remove_organization_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        policy: LastAdminPolicy,
    ) -> OrgResult<MemberRemoval>;

    /// Insert a team membership, or overwrite the role of an existing one.
    ///
    /// Fails with `NotFound` if the team does not exist or does not belong to
    /// `organization_id`, and with `OrganizationUserRequired` if the user has
    /// no membership in that organization.
    async fn add_team_member(
        &self,
        organization_id: Uuid,
        membership: TeamMembership,
    ) -> OrgResult<TeamMembership>;

    /// Remove a team membership. Returns whether a row was removed.
    async fn remove_team_member(&self, team_id: Uuid, user_id: Uuid) -> OrgResult<bool>;

    /// List the organizations a user belongs to, in organization creation order.
    async fn list_organizations_for_user(&self, user_id: Uuid, page: Page)
        -> OrgResult<Vec<Organization>>;

    /// List an organization's memberships in join order.
    async fn list_organization_members(
        &self,
        organization_id: Uuid,
        page: Page,
    ) -> OrgResult<Vec<OrganizationMembership>>;
}
