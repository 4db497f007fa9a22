//! Organization domain models
//!
//! This module provides the Organization entity, the top-level tenant that
//! groups teams and members.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OrgError, OrgResult};
use crate::roles::Role;

/// An organization represents a tenant in the multi-tenant system.
///
/// Users can belong to multiple organizations with different roles.
/// Organizations are created once and never hard-deleted by this crate.
///
/// # Architecture
///
/// ```text
/// Organization
///   ├─ Members (via OrganizationMembership)
///   └─ Teams
///        └─ Members (via TeamMembership)
/// ```
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use roster_org::Organization;
///
/// let founder_id = Uuid::now_v7();
/// let org = Organization::new("Acme Corp", founder_id);
/// assert_eq!(org.name, "Acme Corp");
/// assert_eq!(org.created_by, founder_id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Unique identifier for the organization
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Founding user, granted `ADMIN` at creation
    pub created_by: Uuid,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Creates a new organization.
    ///
    /// The name is stored as given; use [`validate_name`] first when it comes
    /// from user input.
    ///
    /// # Arguments
    ///
    /// * `name` - The organization name
    /// * `created_by` - The founding user
    pub fn new(name: impl Into<String>, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An organization together with the caller's role in it.
///
/// Returned by "get organization" so a client can decide whether to show
/// administrative controls without a second round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationView {
    /// The organization
    pub organization: Organization,

    /// Caller's role in the organization
    pub role: Role,
}

/// Validate and normalize an organization or team display name.
///
/// Surrounding whitespace is trimmed. The result must be non-empty and at
/// most `max_len` characters long.
///
/// # Errors
///
/// Returns [`OrgError::Validation`] for an empty or over-long name.
///
/// # Examples
///
/// ```
/// use roster_org::organization::validate_name;
///
/// assert_eq!(validate_name("  Acme  ", 64).unwrap(), "Acme");
/// assert!(validate_name("   ", 64).is_err());
/// ```
pub fn validate_name(name: &str, max_len: usize) -> OrgResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(OrgError::Validation("name must not be empty".to_string()));
    }
    if trimmed.chars().count() > max_len {
        return Err(OrgError::Validation(format!(
            "name must be at most {} characters",
            max_len
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_creation() {
        let founder_id = Uuid::now_v7();
        let org = Organization::new("Acme Corp", founder_id);

        assert_eq!(org.name, "Acme Corp");
        assert_eq!(org.created_by, founder_id);
        assert_eq!(org.created_at, org.updated_at);
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("Eng", 10).unwrap(), "Eng");
        assert!(matches!(validate_name("", 10), Err(OrgError::Validation(_))));
        assert!(matches!(
            validate_name("abcdefghijk", 10),
            Err(OrgError::Validation(_))
        ));
        // length is counted in characters, not bytes
        assert!(validate_name("ééééé", 5).is_ok());
    }

    #[test]
    fn test_organization_view_serialization() {
        let org = Organization::new("Acme", Uuid::now_v7());
        let view = OrganizationView {
            organization: org,
            role: Role::Admin,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["role"], "ADMIN");
        assert_eq!(json["organization"]["name"], "Acme");
        assert!(json["organization"]["createdAt"].is_string());
    }
}
