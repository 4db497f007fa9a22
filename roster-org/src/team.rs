//! Team domain models
//!
//! Teams group users inside exactly one organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::organization::Organization;
use crate::roles::Role;

/// A team nested inside an organization.
///
/// The owning organization is fixed at construction and only exposed through
/// [`Team::organization_id`]; a team cannot be moved between organizations.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use roster_org::Team;
///
/// let org_id = Uuid::now_v7();
/// let team = Team::new(org_id, "Engineering");
/// assert_eq!(team.organization_id(), org_id);
/// assert!(team.belongs_to(org_id));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Unique identifier for the team
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Owning organization
    organization_id: Uuid,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// When the team was last updated
    pub updated_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new team inside an organization.
    ///
    /// # Arguments
    ///
    /// * `organization_id` - The owning organization
    /// * `name` - Team name
    pub fn new(organization_id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            organization_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// The organization this team belongs to.
    pub fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    /// Check whether this team belongs to the given organization.
    pub fn belongs_to(&self, organization_id: Uuid) -> bool {
        self.organization_id == organization_id
    }
}

/// A team together with its organization and the caller's role at both levels.
///
/// Either role may be absent: an organization admin can view a team they are
/// not a member of, in which case `team_role` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    /// The owning organization
    pub organization: Organization,

    /// The team
    pub team: Team,

    /// Caller's organization role
    pub organization_role: Option<Role>,

    /// Caller's team role
    pub team_role: Option<Role>,
}
