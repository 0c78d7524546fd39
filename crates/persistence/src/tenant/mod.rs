//! Multi-tenancy support for the persistence layer.
//!
//! Every stored record belongs to exactly one tenant, and every storage
//! operation carries a [`TenantContext`] naming the tenant partition and the
//! authenticated principal acting inside it. Tenant-level configuration,
//! including the controlled vocabularies of the type registry, lives in
//! [`TenantSettings`].

mod context;
mod id;
mod settings;

pub use context::TenantContext;
pub use id::TenantId;
pub use settings::{TenantSettings, TypeEntry};
