//! User references
//!
//! Users are owned by an external identity subsystem. This crate only holds
//! the fields it needs to address them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::Role;

/// A user known to the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Email address, always stored normalized
    pub email: String,

    /// Optional display name
    pub name: Option<String>,

    /// When the user was registered
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a user record with a normalized email.
    pub fn new(email: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            email: normalize_email(email),
            name: None,
            created_at: Utc::now(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A user together with their role in an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationUser {
    /// The user
    #[serde(flatten)]
    pub user: User,

    /// Organization role
    pub role: Role,
}

/// Normalize an email for lookup and storage.
///
/// Emails are unique case-insensitively, so every lookup goes through this.
///
/// # Examples
///
/// ```
/// use roster_org::user::normalize_email;
///
/// assert_eq!(normalize_email(" User@Example.com "), "user@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
