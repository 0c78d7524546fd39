//! HTTP handlers for the REST API.

pub mod bulk;
pub mod client;
pub mod health;
pub mod ids;
pub mod login;
pub mod records;

use lectern_persistence::error::StorageError;
use lectern_persistence::types::RecordKind;

use crate::error::RestError;

/// Parses the `{kind}` path segment. Unknown kinds are 404s: the route
/// space only exists for registered record kinds.
pub(crate) fn parse_kind(raw: &str) -> Result<RecordKind, RestError> {
    raw.parse::<RecordKind>()
        .map_err(|e| RestError::from(StorageError::from(e)))
}
