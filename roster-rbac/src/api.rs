//! # Organization API
//!
//! The operation surface collaborators call. Each method authorizes the
//! request through the [`AuthorizationGate`] and only then delegates to the
//! catalog, resolver or coordinator in `roster-org`.

use std::sync::Arc;

use roster_org::{
    HierarchyCatalog, HierarchyStore, IdentityStore, MemberRemoval, MembershipCoordinator,
    OrgError, OrgResult, Organization, OrganizationMembership, OrganizationUser,
    OrganizationView, Page, RoleResolver, RosterConfig, Team, TeamMembership, TeamView,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::gate::{AuthorizationGate, AuthorizedContext, RequestContext, Target};
use crate::operations::Operation;

/// Gated organization and team operations.
#[derive(Debug, Clone)]
pub struct OrganizationApi {
    catalog: Arc<HierarchyCatalog>,
    resolver: Arc<RoleResolver>,
    coordinator: Arc<MembershipCoordinator>,
    gate: AuthorizationGate,
}

impl OrganizationApi {
    /// Build the API and its services over the given stores.
    pub fn new(
        store: Arc<dyn HierarchyStore>,
        identity: Arc<dyn IdentityStore>,
        config: RosterConfig,
    ) -> Self {
        let resolver = Arc::new(RoleResolver::new(store.clone(), identity.clone()));
        Self {
            catalog: Arc::new(HierarchyCatalog::new(store.clone(), config.clone())),
            coordinator: Arc::new(MembershipCoordinator::new(store, identity, config)),
            gate: AuthorizationGate::new(resolver.clone()),
            resolver,
        }
    }

    /// The gate every operation passes through.
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    /// The underlying role resolver.
    pub fn resolver(&self) -> &RoleResolver {
        &self.resolver
    }

    /// List the organizations a user belongs to. Callers may only list their
    /// own.
    pub async fn list_user_organizations(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        page: Page,
    ) -> OrgResult<Vec<Organization>> {
        self.gate
            .authorize(ctx, Operation::ListUserOrganizations, Target::User(user_id))
            .await?;
        self.resolver.list_organizations_for_user(user_id, page).await
    }

    /// Create an organization with the caller as its first admin.
    #[instrument(skip(self, ctx, name), fields(request_id = ?ctx.request_id))]
    pub async fn create_organization(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> OrgResult<Organization> {
        let auth = self
            .gate
            .authorize(ctx, Operation::CreateOrganization, Target::None)
            .await?;
        self.catalog.create_organization(auth.user_id, name).await
    }

    /// Get an organization together with the caller's role in it.
    pub async fn get_organization(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
    ) -> OrgResult<OrganizationView> {
        let auth = self
            .gate
            .authorize(
                ctx,
                Operation::ViewOrganization,
                Target::Organization(organization_id),
            )
            .await?;
        let organization = self.catalog.get_organization(organization_id).await?;
        Ok(OrganizationView {
            organization,
            role: granted_role(&auth)?,
        })
    }

    /// List an organization's teams in creation order.
    pub async fn list_teams(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        page: Page,
    ) -> OrgResult<Vec<Team>> {
        self.gate
            .authorize(ctx, Operation::ListTeams, Target::Organization(organization_id))
            .await?;
        self.catalog.list_teams(organization_id, page).await
    }

    /// Create a team. Requires organization `ADMIN`.
    #[instrument(skip(self, ctx, name), fields(request_id = ?ctx.request_id))]
    pub async fn create_team(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        name: &str,
    ) -> OrgResult<Team> {
        self.gate
            .authorize(ctx, Operation::CreateTeam, Target::Organization(organization_id))
            .await?;
        self.catalog.create_team(organization_id, name).await
    }

    /// List an organization's users with their roles, in join order.
    pub async fn list_organization_users(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        page: Page,
    ) -> OrgResult<Vec<OrganizationUser>> {
        self.gate
            .authorize(
                ctx,
                Operation::ListOrganizationUsers,
                Target::Organization(organization_id),
            )
            .await?;
        self.resolver
            .list_users_for_organization(organization_id, page)
            .await
    }

    /// Add a user to the organization by email, or change their role.
    #[instrument(skip(self, ctx, email), fields(request_id = ?ctx.request_id))]
    pub async fn add_organization_user(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        email: &str,
        role: &str,
    ) -> OrgResult<OrganizationMembership> {
        let auth = self
            .gate
            .authorize(
                ctx,
                Operation::AddOrganizationUser,
                Target::Organization(organization_id),
            )
            .await?;
        let membership = self
            .coordinator
            .add_organization_user(organization_id, email, role)
            .await?;
        info!(actor = %auth.user_id, user_id = %membership.user_id, "Organization user set");
        Ok(membership)
    }

    /// Remove a user from the organization and all of its teams.
    #[instrument(skip(self, ctx), fields(request_id = ?ctx.request_id))]
    pub async fn remove_organization_user(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> OrgResult<MemberRemoval> {
        let auth = self
            .gate
            .authorize(
                ctx,
                Operation::RemoveOrganizationUser,
                Target::Organization(organization_id),
            )
            .await?;
        let removal = self
            .coordinator
            .remove_organization_user(organization_id, user_id)
            .await?;
        info!(actor = %auth.user_id, "Organization user removed");
        Ok(removal)
    }

    /// Get a team with its organization and the caller's role at both levels.
    pub async fn get_team(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        team_id: Uuid,
    ) -> OrgResult<TeamView> {
        let auth = self
            .gate
            .authorize(
                ctx,
                Operation::ViewTeam,
                Target::Team {
                    organization_id,
                    team_id,
                },
            )
            .await?;
        let organization = self.catalog.get_organization(organization_id).await?;
        let team = self.catalog.get_team_in(organization_id, team_id).await?;
        Ok(TeamView {
            organization,
            team,
            organization_role: auth.roles.organization_role,
            team_role: auth.roles.team_role,
        })
    }

    /// Add an organization member to a team by email, or change their team
    /// role.
    #[instrument(skip(self, ctx, email), fields(request_id = ?ctx.request_id))]
    pub async fn add_team_user(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        team_id: Uuid,
        email: &str,
        role: &str,
    ) -> OrgResult<TeamMembership> {
        let auth = self
            .gate
            .authorize(
                ctx,
                Operation::AddTeamUser,
                Target::Team {
                    organization_id,
                    team_id,
                },
            )
            .await?;
        let membership = self
            .coordinator
            .add_team_user(organization_id, team_id, email, role)
            .await?;
        info!(actor = %auth.user_id, user_id = %membership.user_id, "Team user set");
        Ok(membership)
    }

    /// Remove a user from a team. Returns whether a membership was removed.
    #[instrument(skip(self, ctx), fields(request_id = ?ctx.request_id))]
    pub async fn remove_team_user(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        team_id: Uuid,
        user_id: Uuid,
    ) -> OrgResult<bool> {
        self.gate
            .authorize(
                ctx,
                Operation::RemoveTeamUser,
                Target::Team {
                    organization_id,
                    team_id,
                },
            )
            .await?;
        self.coordinator.remove_team_user(team_id, user_id).await
    }
}

fn granted_role(auth: &AuthorizedContext) -> OrgResult<roster_org::Role> {
    auth.roles.organization_role.ok_or_else(|| {
        OrgError::ConflictInternal("granted request has no organization role".to_string())
    })
}
