//! # Authorization Gate
//!
//! Every gated operation passes through [`AuthorizationGate`] before any
//! state is touched. A request moves through these states:
//!
//! ```text
//! Unauthenticated ──(no user)──────────────→ Rejected
//!        │
//!   (user present)
//!        ↓
//!    Resolving ──(policy allows)──→ Granted(roles)
//!        └──────(policy denies)───→ Denied(reason)
//! ```
//!
//! Roles are resolved fresh for every request. Nothing is cached between
//! requests, so a role change is visible to the very next call.

use std::sync::Arc;

use roster_org::{OrgError, OrgResult, ResolvedRoles, RoleResolver};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::operations::{AccessLevel, Operation};
use crate::policy::{evaluate, Decision, DenyReason};

/// Identity attached to an incoming request by the authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Authenticated user, if any
    pub user_id: Option<Uuid>,

    /// Correlation ID for logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Context for an authenticated user.
    pub fn authenticated(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            request_id: None,
        }
    }

    /// Context with no authenticated user.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Attach a correlation ID.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// What an operation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Nothing beyond the caller
    None,
    /// A user record
    User(Uuid),
    /// An organization
    Organization(Uuid),
    /// A team, addressed through its organization
    Team {
        /// Owning organization
        organization_id: Uuid,
        /// Team
        team_id: Uuid,
    },
}

impl Target {
    /// Organization addressed by the target, if any.
    pub fn organization_id(&self) -> Option<Uuid> {
        match self {
            Target::Organization(id) => Some(*id),
            Target::Team {
                organization_id, ..
            } => Some(*organization_id),
            Target::None | Target::User(_) => None,
        }
    }

    /// Team addressed by the target, if any.
    pub fn team_id(&self) -> Option<Uuid> {
        match self {
            Target::Team { team_id, .. } => Some(*team_id),
            _ => None,
        }
    }
}

/// Where a request stands in the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Request received; identity not yet checked
    Unauthenticated,
    /// Identity present; roles being resolved
    Resolving,
    /// Policy allowed the request with these roles
    Granted(ResolvedRoles),
    /// Policy denied the request
    Denied(DenyReason),
    /// No authenticated user
    Rejected,
}

impl GateState {
    /// Check if the state is final.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GateState::Granted(_) | GateState::Denied(_) | GateState::Rejected
        )
    }

    /// Convert a terminal state into the roles to proceed with, or the error
    /// to return.
    pub fn into_result(self) -> OrgResult<ResolvedRoles> {
        match self {
            GateState::Granted(roles) => Ok(roles),
            GateState::Denied(reason) => Err(OrgError::Unauthorized(reason.as_str().to_string())),
            GateState::Rejected => Err(OrgError::Unauthorized(
                DenyReason::Unauthenticated.as_str().to_string(),
            )),
            GateState::Unauthenticated | GateState::Resolving => Err(OrgError::ConflictInternal(
                "authorization did not complete".to_string(),
            )),
        }
    }
}

/// A request that passed the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedContext {
    /// Authenticated caller
    pub user_id: Uuid,

    /// Operation that was authorized
    pub operation: Operation,

    /// Organization the operation targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,

    /// Team the operation targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,

    /// Caller's roles, resolved for this request
    pub roles: ResolvedRoles,

    /// Correlation ID carried from the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Decides whether a request may run an operation against a target.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    resolver: Arc<RoleResolver>,
}

impl AuthorizationGate {
    /// Create a gate backed by a role resolver.
    pub fn new(resolver: Arc<RoleResolver>) -> Self {
        Self { resolver }
    }

    /// Run the request through the gate and return its terminal state.
    ///
    /// An anonymous request is rejected before its target is looked at.
    ///
    /// # Errors
    ///
    /// - [`OrgError::Validation`] if the target does not fit the operation, or
    ///   names a team of another organization
    /// - [`OrgError::NotFound`] if the targeted organization or team does not
    ///   exist
    pub async fn decide(
        &self,
        ctx: &RequestContext,
        operation: Operation,
        target: Target,
    ) -> OrgResult<GateState> {
        let Some(user_id) = ctx.user_id else {
            debug!(%operation, request_id = ?ctx.request_id, "Rejected anonymous request");
            return Ok(GateState::Rejected);
        };

        let level = operation.access_level();
        check_target(operation, level, &target)?;
        debug!(%operation, %user_id, state = ?GateState::Resolving, "Resolving caller roles");

        let roles = match (level, target) {
            (AccessLevel::Subject, Target::User(subject)) if subject != user_id => {
                return Ok(self.deny(ctx, operation, user_id, DenyReason::NotSubject));
            }
            (AccessLevel::Authenticated | AccessLevel::Subject, _) => ResolvedRoles::none(),
            (_, target) => match target.organization_id() {
                Some(organization_id) => {
                    self.resolver
                        .resolve(user_id, organization_id, target.team_id())
                        .await?
                }
                None => ResolvedRoles::none(),
            },
        };

        Ok(match evaluate(level, &roles) {
            Decision::Allow => {
                debug!(%operation, %user_id, ?roles, request_id = ?ctx.request_id, "Granted");
                GateState::Granted(roles)
            }
            Decision::Deny(reason) => self.deny(ctx, operation, user_id, reason),
        })
    }

    /// Authorize a request, failing unless the gate grants it.
    ///
    /// # Errors
    ///
    /// Everything [`decide`](Self::decide) returns, plus
    /// [`OrgError::Unauthorized`] carrying the denial code when the request
    /// is rejected or denied.
    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        operation: Operation,
        target: Target,
    ) -> OrgResult<AuthorizedContext> {
        let roles = self.decide(ctx, operation, target).await?.into_result()?;
        let user_id = ctx.user_id.ok_or_else(|| {
            OrgError::ConflictInternal("granted request has no user".to_string())
        })?;

        Ok(AuthorizedContext {
            user_id,
            operation,
            organization_id: target.organization_id(),
            team_id: target.team_id(),
            roles,
            request_id: ctx.request_id.clone(),
        })
    }

    fn deny(
        &self,
        ctx: &RequestContext,
        operation: Operation,
        user_id: Uuid,
        reason: DenyReason,
    ) -> GateState {
        warn!(%operation, %user_id, %reason, request_id = ?ctx.request_id, "Denied");
        GateState::Denied(reason)
    }
}

fn check_target(operation: Operation, level: AccessLevel, target: &Target) -> OrgResult<()> {
    let fits = match level {
        AccessLevel::Authenticated => true,
        AccessLevel::Subject => matches!(target, Target::User(_)),
        AccessLevel::OrganizationMember | AccessLevel::OrganizationAdmin => {
            matches!(target, Target::Organization(_))
        }
        AccessLevel::TeamMember | AccessLevel::TeamAdmin => matches!(target, Target::Team { .. }),
    };
    if fits {
        Ok(())
    } else {
        Err(OrgError::Validation(format!(
            "{} cannot target {:?}",
            operation, target
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_org::{
        HierarchyCatalog, MembershipCoordinator, MemoryHierarchyStore, MemoryIdentityStore,
        Organization, RosterConfig, Team,
    };

    struct Fixture {
        gate: AuthorizationGate,
        coordinator: MembershipCoordinator,
        catalog: HierarchyCatalog,
        identity: Arc<MemoryIdentityStore>,
        admin: Uuid,
        org: Organization,
        team: Team,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryHierarchyStore::new());
        let identity = Arc::new(MemoryIdentityStore::new());
        let config = RosterConfig::default();
        let catalog = HierarchyCatalog::new(store.clone(), config.clone());
        let coordinator = MembershipCoordinator::new(store.clone(), identity.clone(), config);
        let resolver = Arc::new(RoleResolver::new(store, identity.clone()));

        let admin = identity.register_user("admin@acme.com").await.unwrap().id;
        let org = catalog.create_organization(admin, "Acme").await.unwrap();
        let team = catalog.create_team(org.id, "Eng").await.unwrap();

        Fixture {
            gate: AuthorizationGate::new(resolver),
            coordinator,
            catalog,
            identity,
            admin,
            org,
            team,
        }
    }

    impl Fixture {
        async fn member(&self, email: &str) -> Uuid {
            let user = self.identity.register_user(email).await.unwrap();
            self.coordinator
                .add_organization_user(self.org.id, email, "MEMBER")
                .await
                .unwrap();
            user.id
        }

        fn team_target(&self) -> Target {
            Target::Team {
                organization_id: self.org.id,
                team_id: self.team.id,
            }
        }
    }

    #[tokio::test]
    async fn test_anonymous_is_rejected() {
        let f = fixture().await;
        let state = f
            .gate
            .decide(
                &RequestContext::anonymous(),
                Operation::ListTeams,
                Target::Organization(f.org.id),
            )
            .await
            .unwrap();
        assert_eq!(state, GateState::Rejected);

        let err = state.into_result().unwrap_err();
        assert!(matches!(err, OrgError::Unauthorized(ref code) if code == "UNAUTHENTICATED"));
    }

    #[tokio::test]
    async fn test_member_denied_admin_operation() {
        let f = fixture().await;
        let member = f.member("m@acme.com").await;

        let state = f
            .gate
            .decide(
                &RequestContext::authenticated(member),
                Operation::CreateTeam,
                Target::Organization(f.org.id),
            )
            .await
            .unwrap();
        assert_eq!(
            state,
            GateState::Denied(DenyReason::OrganizationAdminRequired)
        );
    }

    #[tokio::test]
    async fn test_org_admin_granted_team_admin_without_team_role() {
        let f = fixture().await;
        let ctx = f
            .gate
            .authorize(
                &RequestContext::authenticated(f.admin).with_request_id("req-1"),
                Operation::AddTeamUser,
                f.team_target(),
            )
            .await
            .unwrap();

        assert_eq!(ctx.user_id, f.admin);
        assert_eq!(ctx.team_id, Some(f.team.id));
        assert_eq!(ctx.roles.team_role, None);
        assert!(ctx.roles.is_organization_admin());
        assert_eq!(ctx.request_id.as_deref(), Some("req-1"));
    }

    #[tokio::test]
    async fn test_role_change_visible_to_next_request() {
        let f = fixture().await;
        let member = f.member("m@acme.com").await;
        let ctx = RequestContext::authenticated(member);
        let target = Target::Organization(f.org.id);

        assert!(f
            .gate
            .authorize(&ctx, Operation::CreateTeam, target)
            .await
            .is_err());

        f.coordinator
            .add_organization_user(f.org.id, "m@acme.com", "ADMIN")
            .await
            .unwrap();

        assert!(f
            .gate
            .authorize(&ctx, Operation::CreateTeam, target)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_subject_must_be_caller() {
        let f = fixture().await;
        let other = f.member("m@acme.com").await;
        let ctx = RequestContext::authenticated(f.admin);

        let own = f
            .gate
            .decide(&ctx, Operation::ListUserOrganizations, Target::User(f.admin))
            .await
            .unwrap();
        assert!(matches!(own, GateState::Granted(_)));

        let theirs = f
            .gate
            .decide(&ctx, Operation::ListUserOrganizations, Target::User(other))
            .await
            .unwrap();
        assert_eq!(theirs, GateState::Denied(DenyReason::NotSubject));
    }

    #[tokio::test]
    async fn test_mismatched_target_is_validation_error() {
        let f = fixture().await;
        let ctx = RequestContext::authenticated(f.admin);

        let err = f
            .gate
            .decide(&ctx, Operation::AddTeamUser, Target::Organization(f.org.id))
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::Validation(_)));
    }

    #[tokio::test]
    async fn test_anonymous_rejected_before_target_check() {
        let f = fixture().await;
        let state = f
            .gate
            .decide(
                &RequestContext::anonymous(),
                Operation::AddTeamUser,
                Target::Organization(f.org.id),
            )
            .await
            .unwrap();
        assert_eq!(state, GateState::Rejected);
    }

    #[tokio::test]
    async fn test_team_of_other_organization() {
        let f = fixture().await;
        let other = f.catalog.create_organization(f.admin, "Other").await.unwrap();

        let err = f
            .gate
            .decide(
                &RequestContext::authenticated(f.admin),
                Operation::ViewTeam,
                Target::Team {
                    organization_id: other.id,
                    team_id: f.team.id,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_organization_is_not_found() {
        let f = fixture().await;
        let err = f
            .gate
            .decide(
                &RequestContext::authenticated(f.admin),
                Operation::ListTeams,
                Target::Organization(Uuid::now_v7()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::NotFound(_)));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!GateState::Unauthenticated.is_terminal());
        assert!(!GateState::Resolving.is_terminal());
        assert!(GateState::Rejected.is_terminal());
        assert!(GateState::Granted(ResolvedRoles::none()).is_terminal());
    }
}
