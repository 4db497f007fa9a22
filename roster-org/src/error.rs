//! Error types for organization and membership operations
//!
//! Every operation in this crate returns an [`OrgResult`]. Errors carry a
//! stable code so that a transport binding can map them without inspecting
//! messages.

use thiserror::Error;

/// Broad error class, used by callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input
    Validation,
    /// A referenced organization, team or user does not exist
    NotFound,
    /// The caller lacks the required standing
    Unauthorized,
    /// Storage failure during a write
    ConflictInternal,
}

/// Organization and membership error types.
#[derive(Debug, Error)]
pub enum OrgError {
    /// Malformed input (empty name, unrecognized role, mismatched team)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced organization or team does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// No user is registered under the given email
    #[error("USER_NOT_FOUND")]
    UserNotFound,

    /// Caller lacks the required role
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Team membership requested for a user outside the organization
    #[error("ORGANIZATION_USER_REQUIRED")]
    OrganizationUserRequired,

    /// Storage-layer failure during a multi-step write
    #[error("Internal conflict: {0}")]
    ConflictInternal(String),
}

/// Result type for organization and membership operations.
pub type OrgResult<T> = Result<T, OrgError>;

impl OrgError {
    /// Shorthand for a not-found organization.
    pub fn organization_not_found(id: impl std::fmt::Display) -> Self {
        OrgError::NotFound(format!("organization {}", id))
    }

    /// Shorthand for a not-found team.
    pub fn team_not_found(id: impl std::fmt::Display) -> Self {
        OrgError::NotFound(format!("team {}", id))
    }

    /// Get the error class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrgError::Validation(_) => ErrorKind::Validation,
            OrgError::NotFound(_) | OrgError::UserNotFound => ErrorKind::NotFound,
            OrgError::Unauthorized(_) | OrgError::OrganizationUserRequired => {
                ErrorKind::Unauthorized
            }
            OrgError::ConflictInternal(_) => ErrorKind::ConflictInternal,
        }
    }

    /// Check if this error should be logged at error level.
    ///
    /// Client errors are expected and are not logged as errors.
    pub fn is_server_error(&self) -> bool {
        self.kind() == ErrorKind::ConflictInternal
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Unauthorized => 401,
            ErrorKind::ConflictInternal => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            OrgError::Validation(_) => "VALIDATION_ERROR",
            OrgError::NotFound(_) => "NOT_FOUND",
            OrgError::UserNotFound => "USER_NOT_FOUND",
            OrgError::Unauthorized(_) => "UNAUTHORIZED",
            OrgError::OrganizationUserRequired => "ORGANIZATION_USER_REQUIRED",
            OrgError::ConflictInternal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message that is safe to return to the caller.
    ///
    /// Internal failures are reported without detail.
    pub fn public_message(&self) -> String {
        match self {
            OrgError::ConflictInternal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_errors_keep_their_class() {
        assert_eq!(OrgError::UserNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(OrgError::UserNotFound.error_code(), "USER_NOT_FOUND");
        assert_eq!(
            OrgError::OrganizationUserRequired.kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            OrgError::OrganizationUserRequired.error_code(),
            "ORGANIZATION_USER_REQUIRED"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(OrgError::Validation("x".into()).status_code(), 400);
        assert_eq!(OrgError::team_not_found("t").status_code(), 404);
        assert_eq!(OrgError::UserNotFound.status_code(), 404);
        assert_eq!(OrgError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(OrgError::ConflictInternal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_internal_detail_is_not_public() {
        let err = OrgError::ConflictInternal("cascade aborted after 2 rows".into());
        assert!(err.is_server_error());
        assert_eq!(err.public_message(), "internal error");

        let err = OrgError::Validation("name must not be empty".into());
        assert!(!err.is_server_error());
        assert!(err.public_message().contains("name must not be empty"));
    }
}
