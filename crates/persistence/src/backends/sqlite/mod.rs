//! SQLite storage backend.
//!
//! Records are stored as JSON documents alongside a handful of extracted
//! columns (`name`, `scope`, relation references, validity dates) that the
//! listing, paging, and relation queries run against. Identifier sequences
//! live in their own table and are only ever touched inside immediate-mode
//! transactions.

mod backend;
mod bulk;
mod schema;
mod sequence;
mod storage;

pub use backend::{SqliteBackend, SqliteBackendConfig};
