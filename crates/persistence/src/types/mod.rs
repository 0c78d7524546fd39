//! Shared data types for the persistence layer.

mod pagination;
mod record;
mod search;

pub use pagination::{BulkCursor, BulkPage};
pub use record::{merge_content, RecordKind, Scope, StoredRecord};
pub use search::{Listing, SearchQuery};
