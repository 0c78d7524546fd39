//! Axum extractors for the REST API.

mod context;
mod pagination;

pub use context::{RequestContext, TENANT_HEADER, resolve_tenant};
pub use pagination::Pagination;
