//! Listing and search parameter types.

use super::record::StoredRecord;

/// Parameters of an offset-paged listing.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Substring match against the derived record name.
    pub query: Option<String>,
    /// Restrict to records whose parent reference equals this id.
    pub filter_parent: Option<i64>,
    /// Number of matching records to skip.
    pub offset: usize,
    /// Maximum number of records to return.
    pub limit: usize,
}

impl SearchQuery {
    /// Creates a query returning the first `limit` records.
    pub fn first(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }
}

/// The result of a listing: one page plus the total match count.
#[derive(Debug)]
pub struct Listing {
    /// Records of the requested page, in `(name, id)` order.
    pub records: Vec<StoredRecord>,
    /// Total number of matching records, ignoring offset and limit.
    pub total: u64,
}
