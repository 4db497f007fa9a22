//! # Roster Organization Management
//!
//! This crate provides multi-tenant organization management: organizations,
//! the teams nested inside them, and role-based membership of users at both
//! levels.
//!
//! ## Overview
//!
//! The roster-org crate handles:
//! - **Organizations**: Top-level tenants, created with a founding admin
//! - **Teams**: Groups of users inside exactly one organization
//! - **Memberships**: User-organization and user-team role assignments
//! - **Roles**: The closed `MEMBER < ADMIN` role set
//! - **Resolution**: Reporting a user's roles at both levels
//! - **Coordination**: Adding and removing members while keeping the
//!   hierarchy consistent
//!
//! ## Architecture
//!
//! ```text
//! User
//!   └─ OrganizationMembership ─→ Organization
//!                                   └─ Teams
//!                                        └─ TeamMembership (requires the
//!                                           OrganizationMembership above)
//! ```
//!
//! Removing an organization membership removes the user's team memberships
//! in that organization in the same store operation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use roster_org::{
//!     HierarchyCatalog, MembershipCoordinator, MemoryHierarchyStore, MemoryIdentityStore,
//!     RoleResolver, RosterConfig,
//! };
//!
//! async fn example() -> roster_org::OrgResult<()> {
//!     let store = Arc::new(MemoryHierarchyStore::new());
//!     let identity = Arc::new(MemoryIdentityStore::new());
//!     let config = RosterConfig::from_env();
//!
//!     let catalog = HierarchyCatalog::new(store.clone(), config.clone());
//!     let coordinator = MembershipCoordinator::new(store.clone(), identity.clone(), config);
//!     let resolver = RoleResolver::new(store, identity.clone());
//!
//!     let founder = identity.register_user("founder@acme.com").await?;
//!     identity.register_user("dev@acme.com").await?;
//!
//!     let org = catalog.create_organization(founder.id, "Acme").await?;
//!     let team = catalog.create_team(org.id, "Engineering").await?;
//!
//!     coordinator.add_organization_user(org.id, "dev@acme.com", "MEMBER").await?;
//!     coordinator.add_team_user(org.id, team.id, "dev@acme.com", "MEMBER").await?;
//!
//!     let roles = resolver.resolve(founder.id, org.id, Some(team.id)).await?;
//!     assert!(roles.is_organization_admin());
//!     Ok(())
//! }
//! ```
//!
//! ## Storage
//!
//! Services talk to storage through [`HierarchyStore`] and
//! [`IdentityStore`]. The `memory` feature (enabled by default) provides
//! in-memory implementations for single-process use and tests.

pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod membership;
#[cfg(feature = "memory")]
pub mod memory;
pub mod organization;
pub mod pagination;
pub mod resolver;
pub mod roles;
pub mod store;
pub mod team;
pub mod user;

// Re-export main types for convenience
pub use catalog::HierarchyCatalog;
pub use config::{ConfigError, LastAdminPolicy, RosterConfig};
pub use coordinator::MembershipCoordinator;
pub use error::{ErrorKind, OrgError, OrgResult};
pub use membership::{MemberRemoval, OrganizationMembership, TeamMembership};
#[cfg(feature = "memory")]
pub use memory::{MemoryHierarchyStore, MemoryIdentityStore};
pub use organization::{Organization, OrganizationView};
pub use pagination::Page;
pub use resolver::{ResolvedRoles, RoleResolver};
pub use roles::Role;
pub use store::{HierarchyStore, IdentityStore, MembershipWrite};
pub use team::{Team, TeamView};
pub use user::{OrganizationUser, User};
