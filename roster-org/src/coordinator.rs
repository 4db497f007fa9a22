//! Membership coordinator
//!
//! The mutation surface for memberships. It enforces the hierarchy rules:
//! a team membership requires an organization membership, and removing an
//! organization membership removes the user from every team of that
//! organization.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{LastAdminPolicy, RosterConfig};
use crate::error::{OrgError, OrgResult};
use crate::membership::{MemberRemoval, OrganizationMembership, TeamMembership};
use crate::roles::Role;
use crate::store::{HierarchyStore, IdentityStore};
use crate::user::{normalize_email, User};

/// Adds and removes organization and team members.
#[derive(Clone)]
pub struct MembershipCoordinator {
    store: Arc<dyn HierarchyStore>,
    identity: Arc<dyn IdentityStore>,
    config: RosterConfig,
}

impl std::fmt::Debug for MembershipCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipCoordinator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MembershipCoordinator {
    /// Create a coordinator.
    pub fn new(
        store: Arc<dyn HierarchyStore>,
        identity: Arc<dyn IdentityStore>,
        config: RosterConfig,
    ) -> Self {
        Self {
            store,
            identity,
            config,
        }
    }

    /// Look up a user by email, normalizing it first.
    ///
    /// # Errors
    ///
    /// Returns [`OrgError::UserNotFound`] if no user has that email.
    pub async fn find_user_by_email(&self, email: &str) -> OrgResult<User> {
        let normalized = normalize_email(email);
        self.identity
            .find_user_by_email(&normalized)
            .await?
            .ok_or(OrgError::UserNotFound)
    }

    /// Add a user to an organization, or change their role if they already
    /// belong to it.
    ///
    /// `role` is the wire value (`MEMBER` or `ADMIN`).
    ///
    /// # Errors
    ///
    /// - [`OrgError::Validation`] for an unrecognized role, or when demoting
    ///   the last admin under the `forbid` policy
    /// - [`OrgError::NotFound`] if the organization does not exist
    /// - [`OrgError::UserNotFound`] if no user has that email
    #[instrument(skip(self, email))]
    pub async fn add_organization_user(
        &self,
        organization_id: Uuid,
        email: &str,
        role: &str,
    ) -> OrgResult<OrganizationMembership> {
        let role = Role::parse(role)?;
        self.require_organization(organization_id).await?;
        let user = self.find_user_by_email(email).await?;

        let write = self
            .store
            .upsert_organization_member(
                OrganizationMembership::new(organization_id, user.id, role),
                self.config.last_admin_policy,
            )
            .await
            .map_err(log_internal)?;

        if write.left_without_admin && self.config.last_admin_policy == LastAdminPolicy::Warn {
            warn!(user_id = %user.id, "Organization left without an admin after role change");
        }
        info!(user_id = %user.id, %role, "Set organization membership");
        Ok(write.membership)
    }

    /// Remove a user from an organization and from every team in it.
    ///
    /// Removing a non-member succeeds without changing anything.
    ///
    /// # Errors
    ///
    /// - [`OrgError::NotFound`] if the organization does not exist
    /// - [`OrgError::Validation`] when removing the last admin under the
    ///   `forbid` policy
    #[instrument(skip(self))]
    pub async fn remove_organization_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> OrgResult<MemberRemoval> {
        self.require_organization(organization_id).await?;

        let removal = self
            .store
            .remove_organization_member(organization_id, user_id, self.config.last_admin_policy)
            .await
            .map_err(log_internal)?;

        if removal.is_noop() {
            info!("User was not an organization member, nothing removed");
        } else {
            if removal.left_without_admin
                && self.config.last_admin_policy == LastAdminPolicy::Warn
            {
                warn!("Organization left without an admin after removal");
            }
            info!(
                team_memberships_removed = removal.team_memberships_removed,
                "Removed organization user"
            );
        }
        Ok(removal)
    }

    /// Add a user to a team, or change their team role.
    ///
    /// The user must already belong to the team's organization.
    ///
    /// # Errors
    ///
    /// - [`OrgError::Validation`] for an unrecognized role
    /// - [`OrgError::NotFound`] if the organization or team does not exist, or
    ///   the team belongs to another organization
    /// - [`OrgError::UserNotFound`] if no user has that email
    /// - [`OrgError::OrganizationUserRequired`] if the user is not an
    ///   organization member; no team row is written
    #[instrument(skip(self, email))]
    pub async fn add_team_user(
        &self,
        organization_id: Uuid,
        team_id: Uuid,
        email: &str,
        role: &str,
    ) -> OrgResult<TeamMembership> {
        let role = Role::parse(role)?;
        self.require_organization(organization_id).await?;
        match self.store.get_team(team_id).await? {
            Some(team) if team.belongs_to(organization_id) => {}
            _ => return Err(OrgError::team_not_found(team_id)),
        }
        let user = self.find_user_by_email(email).await?;

        let membership = self
            .store
            .add_team_member(organization_id, TeamMembership::new(team_id, user.id, role))
            .await
            .map_err(log_internal)?;

        info!(user_id = %user.id, %role, "Set team membership");
        Ok(membership)
    }

    /// Remove a user from a team. Their organization membership is untouched.
    ///
    /// Removing a non-member succeeds without changing anything. Returns
    /// whether a membership was removed.
    ///
    /// # Errors
    ///
    /// Returns [`OrgError::NotFound`] if the team does not exist.
    #[instrument(skip(self))]
    pub async fn remove_team_user(&self, team_id: Uuid, user_id: Uuid) -> OrgResult<bool> {
        if self.store.get_team(team_id).await?.is_none() {
            return Err(OrgError::team_not_found(team_id));
        }

        let removed = self
            .store
            .remove_team_member(team_id, user_id)
            .await
            .map_err(log_internal)?;
        if removed {
            info!("Removed team user");
        }
        Ok(removed)
    }

    async fn require_organization(&self, organization_id: Uuid) -> OrgResult<()> {
        match self.store.get_organization(organization_id).await? {
            Some(_) => Ok(()),
            None => Err(OrgError::organization_not_found(organization_id)),
        }
    }
}

fn log_internal(err: OrgError) -> OrgError {
    if err.is_server_error() {
        error!(error = %err, "Membership write failed");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::HierarchyCatalog;
    use crate::memory::{MemoryHierarchyStore, MemoryIdentityStore};
    use crate::organization::Organization;
    use crate::resolver::RoleResolver;
    use crate::team::Team;

    struct Fixture {
        store: Arc<MemoryHierarchyStore>,
        identity: Arc<MemoryIdentityStore>,
        catalog: HierarchyCatalog,
        resolver: RoleResolver,
        coordinator: MembershipCoordinator,
    }

    fn fixture_with(config: RosterConfig) -> Fixture {
        let store = Arc::new(MemoryHierarchyStore::new());
        let identity = Arc::new(MemoryIdentityStore::new());
        Fixture {
            catalog: HierarchyCatalog::new(store.clone(), config.clone()),
            resolver: RoleResolver::new(store.clone(), identity.clone()),
            coordinator: MembershipCoordinator::new(store.clone(), identity.clone(), config),
            store,
            identity,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RosterConfig::default())
    }

    async fn acme(f: &Fixture) -> (Organization, Team, User) {
        let founder = f.identity.register_user("founder@acme.com").await.unwrap();
        let org = f.catalog.create_organization(founder.id, "Acme").await.unwrap();
        let team = f.catalog.create_team(org.id, "Eng").await.unwrap();
        (org, team, founder)
    }

    #[tokio::test]
    async fn test_add_organization_user_normalizes_email() {
        let f = fixture();
        let (org, _, _) = acme(&f).await;
        let user = f.identity.register_user("user@example.com").await.unwrap();

        let membership = f
            .coordinator
            .add_organization_user(org.id, "User@Example.com", "MEMBER")
            .await
            .unwrap();
        assert_eq!(membership.user_id, user.id);

        let found = f.coordinator.find_user_by_email("user@example.com").await.unwrap();
        assert_eq!(
            f.resolver.organization_role(found.id, org.id).await.unwrap(),
            Some(Role::Member)
        );
    }

    #[tokio::test]
    async fn test_add_organization_user_errors() {
        let f = fixture();
        let (org, _, _) = acme(&f).await;
        f.identity.register_user("known@x.com").await.unwrap();

        let err = f
            .coordinator
            .add_organization_user(org.id, "nobody@x.com", "MEMBER")
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::UserNotFound));
        assert_eq!(err.error_code(), "USER_NOT_FOUND");

        let err = f
            .coordinator
            .add_organization_user(org.id, "known@x.com", "OWNER")
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::Validation(_)));

        let err = f
            .coordinator
            .add_organization_user(Uuid::now_v7(), "known@x.com", "MEMBER")
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_role_overwrite_leaves_single_row() {
        let f = fixture();
        let (org, _, _) = acme(&f).await;
        let user = f.identity.register_user("u@x.com").await.unwrap();

        f.coordinator
            .add_organization_user(org.id, "u@x.com", "ADMIN")
            .await
            .unwrap();
        f.coordinator
            .add_organization_user(org.id, "u@x.com", "MEMBER")
            .await
            .unwrap();

        assert_eq!(f.store.organization_membership_count(user.id).await, 1);
        assert_eq!(
            f.resolver.organization_role(user.id, org.id).await.unwrap(),
            Some(Role::Member)
        );
    }

    #[tokio::test]
    async fn test_add_team_user_requires_organization_membership() {
        let f = fixture();
        let (org, team, _) = acme(&f).await;
        let user = f.identity.register_user("u2@x.com").await.unwrap();

        let err = f
            .coordinator
            .add_team_user(org.id, team.id, "u2@x.com", "MEMBER")
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::OrganizationUserRequired));
        assert_eq!(f.resolver.team_role(user.id, team.id).await.unwrap(), None);

        f.coordinator
            .add_organization_user(org.id, "u2@x.com", "MEMBER")
            .await
            .unwrap();
        let membership = f
            .coordinator
            .add_team_user(org.id, team.id, "U2@x.com", "ADMIN")
            .await
            .unwrap();
        assert_eq!(membership.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_add_team_user_rejects_missing_or_foreign_team() {
        let f = fixture();
        let (org, _, founder) = acme(&f).await;
        let other = f.catalog.create_organization(founder.id, "Other").await.unwrap();
        let foreign = f.catalog.create_team(other.id, "Ops").await.unwrap();

        let err = f
            .coordinator
            .add_team_user(org.id, foreign.id, "founder@acme.com", "MEMBER")
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::NotFound(_)));

        let err = f
            .coordinator
            .add_team_user(org.id, Uuid::now_v7(), "founder@acme.com", "MEMBER")
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_organization_user_cascades() {
        let f = fixture();
        let (org, t1, _) = acme(&f).await;
        let t2 = f.catalog.create_team(org.id, "Design").await.unwrap();
        let user = f.identity.register_user("u@x.com").await.unwrap();

        f.coordinator
            .add_organization_user(org.id, "u@x.com", "MEMBER")
            .await
            .unwrap();
        for team in [&t1, &t2] {
            f.coordinator
                .add_team_user(org.id, team.id, "u@x.com", "MEMBER")
                .await
                .unwrap();
        }

        let removal = f
            .coordinator
            .remove_organization_user(org.id, user.id)
            .await
            .unwrap();
        assert_eq!(removal.team_memberships_removed, 2);
        assert_eq!(f.resolver.organization_role(user.id, org.id).await.unwrap(), None);
        assert_eq!(f.resolver.team_role(user.id, t1.id).await.unwrap(), None);
        assert_eq!(f.resolver.team_role(user.id, t2.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_organization_non_member_is_noop() {
        let f = fixture();
        let (org, _, founder) = acme(&f).await;

        let removal = f
            .coordinator
            .remove_organization_user(org.id, Uuid::now_v7())
            .await
            .unwrap();
        assert!(removal.is_noop());
        assert_eq!(
            f.resolver.organization_role(founder.id, org.id).await.unwrap(),
            Some(Role::Admin)
        );
    }

    #[tokio::test]
    async fn test_remove_team_user_keeps_organization_membership() {
        let f = fixture();
        let (org, team, _) = acme(&f).await;
        let user = f.identity.register_user("u@x.com").await.unwrap();
        f.coordinator
            .add_organization_user(org.id, "u@x.com", "MEMBER")
            .await
            .unwrap();
        f.coordinator
            .add_team_user(org.id, team.id, "u@x.com", "MEMBER")
            .await
            .unwrap();

        assert!(f.coordinator.remove_team_user(team.id, user.id).await.unwrap());
        assert!(!f.coordinator.remove_team_user(team.id, user.id).await.unwrap());
        assert_eq!(
            f.resolver.organization_role(user.id, org.id).await.unwrap(),
            Some(Role::Member)
        );
        assert!(matches!(
            f.coordinator.remove_team_user(Uuid::now_v7(), user.id).await,
            Err(OrgError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_last_admin_policies() {
        let f = fixture();
        let (org, _, founder) = acme(&f).await;

        let err = f
            .coordinator
            .remove_organization_user(org.id, founder.id)
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::Validation(_)));
        let err = f
            .coordinator
            .add_organization_user(org.id, "founder@acme.com", "MEMBER")
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::Validation(_)));

        // a second admin makes both operations legal
        f.identity.register_user("second@acme.com").await.unwrap();
        f.coordinator
            .add_organization_user(org.id, "second@acme.com", "ADMIN")
            .await
            .unwrap();
        f.coordinator
            .remove_organization_user(org.id, founder.id)
            .await
            .unwrap();

        let f = fixture_with(RosterConfig::default().with_last_admin_policy(LastAdminPolicy::Allow));
        let (org, _, founder) = acme(&f).await;
        f.coordinator
            .remove_organization_user(org.id, founder.id)
            .await
            .unwrap();
        assert_eq!(f.store.organization_membership_count(founder.id).await, 0);
    }
}
