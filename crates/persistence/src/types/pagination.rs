//! Bulk paging cursor and page types.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

use super::record::StoredRecord;

/// An opaque keyset cursor over the `(name, id)` ordering.
///
/// The cursor names the last record of the previous page; the next page
/// starts strictly after it. Because the position is a key rather than an
/// offset, records inserted before the cursor do not shift later pages.
///
/// The wire form is base64url-encoded JSON with no padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCursor {
    /// Sort name of the last record returned.
    pub name: String,
    /// Id of the last record returned (tie-breaker for equal names).
    pub id: i64,
}

impl BulkCursor {
    /// Creates a cursor positioned after the given record.
    pub fn after(record: &StoredRecord) -> Self {
        Self {
            name: record.name().to_string(),
            id: record.id,
        }
    }

    /// Encodes the cursor to its wire form.
    pub fn encode(&self) -> String {
        // Serialization of two plain fields cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decodes a cursor from its wire form.
    pub fn decode(encoded: &str) -> Result<Self, SearchError> {
        let invalid = || SearchError::InvalidCursor {
            cursor: encoded.to_string(),
        };
        let bytes = URL_SAFE_NO_PAD.decode(encoded).map_err(|_| invalid())?;
        serde_json::from_slice(&bytes).map_err(|_| invalid())
    }
}

/// One page of a bulk export.
#[derive(Debug)]
pub struct BulkPage {
    /// The records of this page, in `(name, id)` order.
    pub records: Vec<StoredRecord>,
    /// Count of matching records after this page, at call time.
    pub remaining: u64,
    /// The limit the page was produced with.
    pub limit: usize,
    /// Cursor for the next page; `None` on the terminal page.
    pub cursor: Option<BulkCursor>,
}
