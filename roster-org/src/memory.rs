//! In-memory storage backends
//!
//! [`MemoryHierarchyStore`] keeps the whole hierarchy behind a single
//! `RwLock`, so every multi-step write runs under one write guard and readers
//! never observe a half-applied cascade. It is suitable for single-process
//! applications and testing.
//!
//! [`MemoryIdentityStore`] is a minimal user directory implementing
//! [`IdentityStore`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::LastAdminPolicy;
use crate::error::{OrgError, OrgResult};
use crate::membership::{MemberRemoval, OrganizationMembership, TeamMembership};
use crate::organization::Organization;
use crate::pagination::Page;
use crate::resolver::ResolvedRoles;
use crate::roles::Role;
use crate::store::{HierarchyStore, IdentityStore, MembershipWrite, LAST_ORGANIZATION_ADMIN};
use crate::team::Team;
use crate::user::{normalize_email, User};

/// A stored row with its insertion sequence number.
#[derive(Debug, Clone)]
struct Row<T> {
    seq: u64,
    value: T,
}

#[derive(Debug, Default)]
struct State {
    next_seq: u64,
    organizations: HashMap<Uuid, Row<Organization>>,
    teams: HashMap<Uuid, Row<Team>>,
    organization_members: HashMap<(Uuid, Uuid), Row<OrganizationMembership>>,
    team_members: HashMap<(Uuid, Uuid), Row<TeamMembership>>,
}

impl State {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn admin_count(&self, organization_id: Uuid) -> usize {
        self.organization_members
            .values()
            .filter(|row| row.value.organization_id == organization_id && row.value.role.is_admin())
            .count()
    }

    /// Whether changing `user_id`'s role to `new_role` (or removing it, for
    /// `None`) would leave the organization without an admin.
    fn would_orphan(&self, organization_id: Uuid, user_id: Uuid, new_role: Option<Role>) -> bool {
        let current = self
            .organization_members
            .get(&(organization_id, user_id))
            .map(|row| row.value.role);
        let losing_admin = current == Some(Role::Admin) && new_role != Some(Role::Admin);
        losing_admin && self.admin_count(organization_id) == 1
    }
}

fn sorted<T: Clone>(mut rows: Vec<&Row<T>>, page: Page) -> Vec<T> {
    rows.sort_by_key(|row| row.seq);
    page.apply(rows.into_iter().map(|row| row.value.clone()))
}

/// In-memory hierarchy store.
#[derive(Clone, Default)]
pub struct MemoryHierarchyStore {
    state: Arc<RwLock<State>>,
}

impl std::fmt::Debug for MemoryHierarchyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHierarchyStore").finish_non_exhaustive()
    }
}

impl MemoryHierarchyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of organization memberships held by a user, across all organizations.
    pub async fn organization_membership_count(&self, user_id: Uuid) -> usize {
        let state = self.state.read().await;
        state
            .organization_members
            .keys()
            .filter(|(_, uid)| *uid == user_id)
            .count()
    }

    /// Number of team memberships held by a user, across all teams.
    pub async fn team_membership_count(&self, user_id: Uuid) -> usize {
        let state = self.state.read().await;
        state.team_members.keys().filter(|(_, uid)| *uid == user_id).count()
    }

    /// Team memberships whose user has no membership in the team's organization.
    pub async fn orphaned_team_memberships(&self) -> Vec<TeamMembership> {
        let state = self.state.read().await;
        state
            .team_members
            .values()
            .filter(|row| {
                let org_id = state
                    .teams
                    .get(&row.value.team_id)
                    .map(|team| team.value.organization_id());
                match org_id {
                    Some(org_id) => !state
                        .organization_members
                        .contains_key(&(org_id, row.value.user_id)),
                    None => true,
                }
            })
            .map(|row| row.value.clone())
            .collect()
    }
}

#[async_trait]
impl HierarchyStore for MemoryHierarchyStore {
    async fn create_organization_with_admin(
        &self,
        organization: Organization,
        founder: OrganizationMembership,
    ) -> OrgResult<Organization> {
        if founder.organization_id != organization.id || founder.role != Role::Admin {
            return Err(OrgError::ConflictInternal(
                "founding membership does not match organization".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        if state.organizations.contains_key(&organization.id) {
            return Err(OrgError::ConflictInternal(format!(
                "organization id {} already in use",
                organization.id
            )));
        }

        let org_seq = state.next_seq();
        let member_seq = state.next_seq();
        state.organizations.insert(
            organization.id,
            Row {
                seq: org_seq,
                value: organization.clone(),
            },
        );
        state.organization_members.insert(
            (founder.organization_id, founder.user_id),
            Row {
                seq: member_seq,
                value: founder,
            },
        );
        Ok(organization)
    }

    async fn get_organization(&self, organization_id: Uuid) -> OrgResult<Option<Organization>> {
        let state = self.state.read().await;
        Ok(state
            .organizations
            .get(&organization_id)
            .map(|row| row.value.clone()))
    }

    async fn insert_team(&self, team: Team) -> OrgResult<Team> {
        let mut state = self.state.write().await;
        if !state.organizations.contains_key(&team.organization_id()) {
            return Err(OrgError::organization_not_found(team.organization_id()));
        }
        if state.teams.contains_key(&team.id) {
            return Err(OrgError::ConflictInternal(format!(
                "team id {} already in use",
                team.id
            )));
        }

        let seq = state.next_seq();
        state.teams.insert(
            team.id,
            Row {
                seq,
                value: team.clone(),
            },
        );
        Ok(team)
    }

    async fn get_team(&self, team_id: Uuid) -> OrgResult<Option<Team>> {
        let state = self.state.read().await;
        Ok(state.teams.get(&team_id).map(|row| row.value.clone()))
    }

    async fn list_teams(&self, organization_id: Uuid, page: Page) -> OrgResult<Vec<Team>> {
        let state = self.state.read().await;
        let rows = state
            .teams
            .values()
            .filter(|row| row.value.belongs_to(organization_id))
            .collect();
        Ok(sorted(rows, page))
    }

    async fn organization_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> OrgResult<Option<Role>> {
        let state = self.state.read().await;
        Ok(state
            .organization_members
            .get(&(organization_id, user_id))
            .map(|row| row.value.role))
    }

    async fn team_role(&self, team_id: Uuid, user_id: Uuid) -> OrgResult<Option<Role>> {
        let state = self.state.read().await;
        Ok(state
            .team_members
            .get(&(team_id, user_id))
            .map(|row| row.value.role))
    }

    async fn resolve_roles(
        &self,
        organization_id: Uuid,
        team_id: Option<Uuid>,
        user_id: Uuid,
    ) -> OrgResult<ResolvedRoles> {
        let state = self.state.read().await;
        if !state.organizations.contains_key(&organization_id) {
            return Err(OrgError::organization_not_found(organization_id));
        }

        let team_role = match team_id {
            Some(team_id) => {
                let team = state
                    .teams
                    .get(&team_id)
                    .ok_or_else(|| OrgError::team_not_found(team_id))?;
                if !team.value.belongs_to(organization_id) {
                    return Err(OrgError::Validation(format!(
                        "team {} does not belong to organization {}",
                        team_id, organization_id
                    )));
                }
                state
                    .team_members
                    .get(&(team_id, user_id))
                    .map(|row| row.value.role)
            }
            None => None,
        };

        Ok(ResolvedRoles {
            organization_role: state
                .organization_members
                .get(&(organization_id, user_id))
                .map(|row| row.value.role),
            team_role,
        })
    }

    async fn upsert_organization_member(
        &self,
        membership: OrganizationMembership,
        policy: LastAdminPolicy,
    ) -> OrgResult<MembershipWrite> {
        let mut state = self.state.write().await;
        let key = (membership.organization_id, membership.user_id);

        if !state.organizations.contains_key(&membership.organization_id) {
            return Err(OrgError::organization_not_found(membership.organization_id));
        }

        let left_without_admin = state.would_orphan(key.0, key.1, Some(membership.role));
        if left_without_admin && policy == LastAdminPolicy::Forbid {
            return Err(OrgError::Validation(LAST_ORGANIZATION_ADMIN.to_string()));
        }

        let stored = match state.organization_members.get_mut(&key) {
            Some(row) => {
                row.value.set_role(membership.role);
                row.value.clone()
            }
            None => {
                let seq = state.next_seq();
                state.organization_members.insert(
                    key,
                    Row {
                        seq,
                        value: membership.clone(),
                    },
                );
                membership
            }
        };

        Ok(MembershipWrite {
            membership: stored,
            left_without_admin,
        })
    }

    async fn remove_organization_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        policy: LastAdminPolicy,
    ) -> OrgResult<MemberRemoval> {
        let mut state = self.state.write().await;

        let left_without_admin = state.would_orphan(organization_id, user_id, None);
        if left_without_admin && policy == LastAdminPolicy::Forbid {
            return Err(OrgError::Validation(LAST_ORGANIZATION_ADMIN.to_string()));
        }

        let organization_membership_removed = state
            .organization_members
            .remove(&(organization_id, user_id))
            .is_some();

        let team_ids: Vec<Uuid> = state
            .teams
            .values()
            .filter(|row| row.value.belongs_to(organization_id))
            .map(|row| row.value.id)
            .collect();
        let before = state.team_members.len();
        state
            .team_members
            .retain(|(team_id, uid), _| !(*uid == user_id && team_ids.contains(team_id)));
        let team_memberships_removed = before - state.team_members.len();

        Ok(MemberRemoval {
            organization_membership_removed,
            team_memberships_removed,
            left_without_admin,
        })
    }

    async fn add_team_member(
        &self,
        organization_id: Uuid,
        membership: TeamMembership,
    ) -> OrgResult<TeamMembership> {
        let mut state = self.state.write().await;

        match state.teams.get(&membership.team_id) {
            Some(row) if row.value.belongs_to(organization_id) => {}
            _ => return Err(OrgError::team_not_found(membership.team_id)),
        }
        if !state
            .organization_members
            .contains_key(&(organization_id, membership.user_id))
        {
            return Err(OrgError::OrganizationUserRequired);
        }

        let key = (membership.team_id, membership.user_id);
        let stored = match state.team_members.get_mut(&key) {
            Some(row) => {
                row.value.set_role(membership.role);
                row.value.clone()
            }
            None => {
                let seq = state.next_seq();
                state.team_members.insert(
                    key,
                    Row {
                        seq,
                        value: membership.clone(),
                    },
                );
                membership
            }
        };
        Ok(stored)
    }

    async fn remove_team_member(&self, team_id: Uuid, user_id: Uuid) -> OrgResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.team_members.remove(&(team_id, user_id)).is_some())
    }

    async fn list_organizations_for_user(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> OrgResult<Vec<Organization>> {
        let state = self.state.read().await;
        let mut rows = Vec::new();
        for (org_id, uid) in state.organization_members.keys() {
            if *uid != user_id {
                continue;
            }
            let row = state.organizations.get(org_id).ok_or_else(|| {
                OrgError::ConflictInternal(format!(
                    "membership references missing organization {}",
                    org_id
                ))
            })?;
            rows.push(row);
        }
        Ok(sorted(rows, page))
    }

    async fn list_organization_members(
        &self,
        organization_id: Uuid,
        page: Page,
    ) -> OrgResult<Vec<OrganizationMembership>> {
        let state = self.state.read().await;
        let rows = state
            .organization_members
            .values()
            .filter(|row| row.value.organization_id == organization_id)
            .collect();
        Ok(sorted(rows, page))
    }
}

/// In-memory user directory.
#[derive(Clone, Default)]
pub struct MemoryIdentityStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl std::fmt::Debug for MemoryIdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIdentityStore").finish_non_exhaustive()
    }
}

impl MemoryIdentityStore {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user under an email.
    ///
    /// # Errors
    ///
    /// Returns [`OrgError::Validation`] if the email is empty or already
    /// registered (case-insensitively).
    pub async fn register_user(&self, email: &str) -> OrgResult<User> {
        self.insert_user(User::new(email)).await
    }

    /// Insert a prepared user record.
    pub async fn insert_user(&self, mut user: User) -> OrgResult<User> {
        user.email = normalize_email(&user.email);
        if user.email.is_empty() {
            return Err(OrgError::Validation("email must not be empty".to_string()));
        }

        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(OrgError::Validation(format!(
                "email {} is already registered",
                user.email
            )));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_user_by_email(&self, normalized_email: &str) -> OrgResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == normalized_email).cloned())
    }

    async fn find_user(&self, user_id: Uuid) -> OrgResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }
}
