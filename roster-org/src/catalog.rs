//! Hierarchy catalog
//!
//! Creates and looks up organizations and the teams they contain.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::RosterConfig;
use crate::error::{OrgError, OrgResult};
use crate::membership::OrganizationMembership;
use crate::organization::{validate_name, Organization};
use crate::pagination::Page;
use crate::roles::Role;
use crate::store::HierarchyStore;
use crate::team::Team;

/// Organization and team catalog.
#[derive(Clone)]
pub struct HierarchyCatalog {
    store: Arc<dyn HierarchyStore>,
    config: RosterConfig,
}

impl std::fmt::Debug for HierarchyCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyCatalog")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HierarchyCatalog {
    /// Create a catalog over a store.
    pub fn new(store: Arc<dyn HierarchyStore>, config: RosterConfig) -> Self {
        Self { store, config }
    }

    /// Create an organization with `founder` as its first `ADMIN`.
    ///
    /// The organization row and the founding membership are written together.
    ///
    /// # Errors
    ///
    /// Returns [`OrgError::Validation`] for an empty or over-long name.
    #[instrument(skip(self, name))]
    pub async fn create_organization(&self, founder: Uuid, name: &str) -> OrgResult<Organization> {
        let name = validate_name(name, self.config.max_name_length)?;
        let organization = Organization::new(name, founder);
        let membership = OrganizationMembership::new(organization.id, founder, Role::Admin);

        let organization = self
            .store
            .create_organization_with_admin(organization, membership)
            .await?;

        info!(organization_id = %organization.id, "Created organization");
        Ok(organization)
    }

    /// Get an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns [`OrgError::NotFound`] if it does not exist.
    pub async fn get_organization(&self, organization_id: Uuid) -> OrgResult<Organization> {
        debug!(%organization_id, "Fetching organization");
        self.store
            .get_organization(organization_id)
            .await?
            .ok_or_else(|| OrgError::organization_not_found(organization_id))
    }

    /// Create a team inside an organization.
    ///
    /// # Errors
    ///
    /// Returns [`OrgError::NotFound`] if the organization does not exist and
    /// [`OrgError::Validation`] for an empty or over-long name.
    #[instrument(skip(self, name))]
    pub async fn create_team(&self, organization_id: Uuid, name: &str) -> OrgResult<Team> {
        self.get_organization(organization_id).await?;
        let name = validate_name(name, self.config.max_name_length)?;

        let team = self.store.insert_team(Team::new(organization_id, name)).await?;

        info!(team_id = %team.id, "Created team");
        Ok(team)
    }

    /// List an organization's teams in creation order.
    ///
    /// An organization without teams yields an empty list.
    pub async fn list_teams(&self, organization_id: Uuid, page: Page) -> OrgResult<Vec<Team>> {
        debug!(%organization_id, ?page, "Listing teams");
        self.store.list_teams(organization_id, page).await
    }

    /// Get a team by ID.
    ///
    /// # Errors
    ///
    /// Returns [`OrgError::NotFound`] if it does not exist.
    pub async fn get_team(&self, team_id: Uuid) -> OrgResult<Team> {
        debug!(%team_id, "Fetching team");
        self.store
            .get_team(team_id)
            .await?
            .ok_or_else(|| OrgError::team_not_found(team_id))
    }

    /// Get a team and check that it belongs to `organization_id`.
    ///
    /// A team of another organization is reported as not found.
    pub async fn get_team_in(&self, organization_id: Uuid, team_id: Uuid) -> OrgResult<Team> {
        let team = self.get_team(team_id).await?;
        if !team.belongs_to(organization_id) {
            return Err(OrgError::team_not_found(team_id));
        }
        Ok(team)
    }
}
