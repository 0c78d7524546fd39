//! # Lectern Persistence
//!
//! Storage layer for the Lectern metadata repository: tenant-partitioned
//! records (groups, persons, works, memberships, users), per-tenant
//! controlled vocabularies, an identifier sequencer, role and relation based
//! authorization, and atomic bulk import with cursor-paged export.
//!
//! The crate is organized around a few seams:
//!
//! - [`core`] — the backend traits ([`core::RecordStorage`],
//!   [`core::SequenceStore`], [`core::BulkStore`], [`core::Backend`]).
//! - [`backends`] — implementations; SQLite ships by default.
//! - [`access`] — [`access::RecordService`], the authorize/validate/persist
//!   pipeline everything above this crate calls into.
//! - [`auth`] — principals, roles, and the decision engine.
//! - [`tenant`] — tenant ids, settings, and the per-request context.
//! - [`services`] — the capability registry (cache, audit log).

#![warn(missing_docs)]

pub mod access;
pub mod auth;
pub mod backends;
pub mod core;
pub mod error;
pub mod sequence;
pub mod services;
pub mod tenant;
pub mod types;
pub mod validate;

pub use access::RecordService;
pub use error::{StorageError, StorageResult};
