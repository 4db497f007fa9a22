//! Role resolution
//!
//! The resolver gathers facts about a user's standing at the organization and
//! team levels. It never decides whether access is allowed; callers (the
//! authorization gate, informational endpoints) apply their own policy to the
//! roles it reports.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::OrgResult;
use crate::organization::Organization;
use crate::pagination::Page;
use crate::roles::Role;
use crate::store::{HierarchyStore, IdentityStore};
use crate::user::OrganizationUser;

/// A user's roles at both levels of the hierarchy.
///
/// `None` at a level means the user holds no membership there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRoles {
    /// Role in the organization
    pub organization_role: Option<Role>,

    /// Role in the team, when a team was part of the request
    pub team_role: Option<Role>,
}

impl ResolvedRoles {
    /// Roles with no standing at either level.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check whether the user belongs to the organization at all.
    pub fn is_organization_member(&self) -> bool {
        self.organization_role.is_some()
    }

    /// Check whether the user is an organization admin.
    pub fn is_organization_admin(&self) -> bool {
        self.organization_role.is_some_and(|r| r.is_admin())
    }
}

/// Resolves users' roles from the membership ledger.
#[derive(Clone)]
pub struct RoleResolver {
    store: Arc<dyn HierarchyStore>,
    identity: Arc<dyn IdentityStore>,
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver").finish_non_exhaustive()
    }
}

impl RoleResolver {
    /// Create a resolver.
    pub fn new(store: Arc<dyn HierarchyStore>, identity: Arc<dyn IdentityStore>) -> Self {
        Self { store, identity }
    }

    /// Get a user's organization role, if any.
    pub async fn organization_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> OrgResult<Option<Role>> {
        self.store.organization_role(organization_id, user_id).await
    }

    /// Get a user's team role, if any.
    pub async fn team_role(&self, user_id: Uuid, team_id: Uuid) -> OrgResult<Option<Role>> {
        self.store.team_role(team_id, user_id).await
    }

    /// Resolve a user's roles for an organization and, optionally, one of its
    /// teams.
    ///
    /// # Errors
    ///
    /// - [`OrgError::NotFound`] if the organization or team does not exist
    /// - [`OrgError::Validation`] if the team belongs to another organization
    ///
    /// Both roles come from one store read.
    ///
    /// [`OrgError::NotFound`]: crate::error::OrgError::NotFound
    /// [`OrgError::Validation`]: crate::error::OrgError::Validation
    pub async fn resolve(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        team_id: Option<Uuid>,
    ) -> OrgResult<ResolvedRoles> {
        let roles = self
            .store
            .resolve_roles(organization_id, team_id, user_id)
            .await?;
        debug!(%user_id, %organization_id, ?team_id, ?roles, "Resolved roles");
        Ok(roles)
    }

    /// List the organizations a user belongs to.
    pub async fn list_organizations_for_user(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> OrgResult<Vec<Organization>> {
        self.store.list_organizations_for_user(user_id, page).await
    }

    /// List an organization's users with their roles, in join order.
    ///
    /// Memberships whose user is unknown to the identity store are skipped
    /// before the page is applied, so a full page is returned whenever enough
    /// known users exist.
    pub async fn list_users_for_organization(
        &self,
        organization_id: Uuid,
        page: Page,
    ) -> OrgResult<Vec<OrganizationUser>> {
        let memberships = self
            .store
            .list_organization_members(organization_id, Page::all())
            .await?;

        let mut users = Vec::with_capacity(memberships.len());
        for membership in memberships {
            match self.identity.find_user(membership.user_id).await? {
                Some(user) => users.push(OrganizationUser {
                    user,
                    role: membership.role,
                }),
                None => warn!(
                    %organization_id,
                    user_id = %membership.user_id,
                    "Membership references unknown user"
                ),
            }
        }
        Ok(page.apply(users))
    }
}
