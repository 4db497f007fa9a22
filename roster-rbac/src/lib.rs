//! # Roster RBAC (Role-Based Access Control)
//!
//! This crate gates the operations of `roster-org` behind hierarchical role
//! checks.
//!
//! ## Overview
//!
//! The roster-rbac crate handles:
//! - **Operations**: Every gated operation and the access level it requires
//! - **Policy**: A pure decision over the caller's resolved roles
//! - **Gate**: Per-request identity check, role resolution and decision
//! - **API**: The gated operation surface handed to collaborators
//!
//! ## Access Levels
//!
//! ```text
//! OrganizationAdmin  create team, add/remove organization users
//! OrganizationMember view organization, list teams, list users
//! TeamAdmin          add/remove team users  (team ADMIN or organization ADMIN)
//! TeamMember         view team              (any team role or organization ADMIN)
//! Subject            list a user's organizations (the user themself)
//! Authenticated      create organization
//! ```
//!
//! Organization `ADMIN` dominates every team in its organization. A team
//! role never grants organization-level access.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use roster_org::{MemoryHierarchyStore, MemoryIdentityStore, Page, RosterConfig};
//! use roster_rbac::{OrganizationApi, RequestContext};
//!
//! async fn example() -> roster_org::OrgResult<()> {
//!     let identity = Arc::new(MemoryIdentityStore::new());
//!     let api = OrganizationApi::new(
//!         Arc::new(MemoryHierarchyStore::new()),
//!         identity.clone(),
//!         RosterConfig::from_env(),
//!     );
//!
//!     let founder = identity.register_user("founder@acme.com").await?;
//!     let ctx = RequestContext::authenticated(founder.id);
//!
//!     let org = api.create_organization(&ctx, "Acme").await?;
//!     let team = api.create_team(&ctx, org.id, "Engineering").await?;
//!     let teams = api.list_teams(&ctx, org.id, Page::all()).await?;
//!     assert_eq!(teams[0].id, team.id);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod gate;
pub mod operations;
pub mod policy;

// Re-export main types for convenience
pub use api::OrganizationApi;
pub use gate::{AuthorizationGate, AuthorizedContext, GateState, RequestContext, Target};
pub use operations::{AccessLevel, Operation};
pub use policy::{evaluate, Decision, DenyReason};
