//! Error types for the persistence layer.
//!
//! [`StorageError`] is the umbrella every storage operation returns; each
//! variant wraps a category-specific enum so callers can match on the
//! category without losing the detail. The REST layer maps these categories
//! onto HTTP statuses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Umbrella error for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Record-level failures: missing, duplicate, unknown kind.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Tenant resolution and isolation failures.
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Authorization failures.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Record validation failures.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Identifier sequence failures.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// Listing and paging parameter failures.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Server configuration failures.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transaction failures, typically lock contention.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Backend infrastructure failures.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors addressing individual records.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// No record with this kind and id exists in the tenant partition.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Record kind name.
        kind: String,
        /// Requested record id.
        id: i64,
    },

    /// A record with this id already exists.
    #[error("{kind} {id} already exists")]
    AlreadyExists {
        /// Record kind name.
        kind: String,
        /// Conflicting record id.
        id: i64,
    },

    /// The kind name does not belong to any registered record kind.
    #[error("unknown record kind: {kind}")]
    UnknownKind {
        /// The unrecognized kind name.
        kind: String,
    },
}

/// Errors in tenant resolution.
#[derive(Error, Debug)]
pub enum TenantError {
    /// The tenant is not registered.
    #[error("unknown tenant: {tenant}")]
    InvalidTenant {
        /// The unrecognized tenant id.
        tenant: String,
    },

    /// The value does not satisfy the tenant id slug format.
    #[error("malformed tenant id: {value}")]
    MalformedId {
        /// The rejected value.
        value: String,
    },

    /// A record body references a record in another tenant's partition.
    #[error("cross-tenant reference in field {field}")]
    CrossTenantReference {
        /// The offending field.
        field: String,
    },
}

/// Authorization failures.
#[derive(Error, Debug)]
pub enum AccessError {
    /// The principal holds no role or relation granting the action.
    #[error("not allowed to {action} {kind} records")]
    Forbidden {
        /// The attempted action.
        action: String,
        /// The record kind acted on.
        kind: String,
    },

    /// No authenticated principal.
    #[error("authentication required")]
    Unauthenticated,
}

/// One field-level validation failure, in the shape error bodies carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDetail {
    /// The offending field.
    pub name: String,
    /// Where the field was found: body, querystring, header, path.
    pub location: String,
    /// Human-readable description of the failure.
    pub description: String,
}

impl ValidationDetail {
    /// Creates a detail for a body field.
    pub fn body(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: "body".to_string(),
            description: description.into(),
        }
    }
}

/// Record validation failures.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// One or more fields failed validation.
    #[error("record validation failed")]
    InvalidRecord {
        /// Every field failure, collected in one pass.
        details: Vec<ValidationDetail>,
    },

    /// The record body is not a JSON object.
    #[error("record body must be a JSON object")]
    NotAnObject,
}

/// Identifier sequence failures.
#[derive(Error, Debug)]
pub enum SequenceError {
    /// Moving the sequence at or below the high-water mark could re-issue
    /// an existing id.
    #[error("next_id {requested} is not above the highest observed id {highest_observed}")]
    BelowHighWater {
        /// The requested next id.
        requested: i64,
        /// The sequence's high-water mark.
        highest_observed: i64,
    },

    /// Record ids are strictly positive.
    #[error("record id must be positive, got {value}")]
    NonPositiveId {
        /// The rejected id.
        value: i64,
    },
}

/// Listing and paging parameter failures.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The cursor is not a cursor this server produced.
    #[error("invalid cursor: {cursor}")]
    InvalidCursor {
        /// The rejected cursor string.
        cursor: String,
    },

    /// The page size is out of range.
    #[error("invalid limit: {limit}")]
    InvalidLimit {
        /// The rejected limit.
        limit: usize,
    },

    /// A query parameter could not be interpreted.
    #[error("invalid parameter {parameter}: {message}")]
    InvalidParameter {
        /// The offending parameter name.
        parameter: String,
        /// Why it was rejected.
        message: String,
    },
}

/// Server configuration failures. These are faults in the deployment, not
/// in the request, and surface as internal errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No vocabulary with this category name exists for the tenant.
    #[error("unknown vocabulary category: {category}")]
    UnknownCategory {
        /// The unrecognized category name.
        category: String,
    },

    /// No capability factory is registered for this URI scheme.
    #[error("unknown capability scheme: {scheme}")]
    UnknownScheme {
        /// The unrecognized scheme.
        scheme: String,
    },

    /// The capability URI has no scheme.
    #[error("malformed capability uri: {uri}")]
    MalformedUri {
        /// The rejected URI.
        uri: String,
    },
}

/// Transaction failures.
#[derive(Error, Debug)]
pub enum TransactionError {
    /// The database is locked by a concurrent writer.
    #[error("transaction busy: {message}")]
    Busy {
        /// Backend-provided detail.
        message: String,
    },
}

/// Backend infrastructure failures.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Could not obtain a connection.
    #[error("{backend_name} connection failed: {message}")]
    ConnectionFailed {
        /// The backend implementation name.
        backend_name: String,
        /// Backend-provided detail.
        message: String,
    },

    /// Stored content could not be serialized or deserialized.
    #[error("serialization failed: {message}")]
    Serialization {
        /// Serializer-provided detail.
        message: String,
    },

    /// Any other backend failure.
    #[error("{backend_name} backend error: {message}")]
    Internal {
        /// The backend implementation name.
        backend_name: String,
        /// Backend-provided detail.
        message: String,
    },
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::DatabaseBusy
                    || code.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StorageError::Transaction(TransactionError::Busy {
                    message: err.to_string(),
                })
            }
            _ => StorageError::Backend(BackendError::Internal {
                backend_name: "sqlite".to_string(),
                message: err.to_string(),
            }),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for StorageError {
    fn from(err: r2d2::Error) -> Self {
        StorageError::Backend(BackendError::ConnectionFailed {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
        })
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::Serialization {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wrapping() {
        let err: StorageError = ResourceError::NotFound {
            kind: "group".to_string(),
            id: 7,
        }
        .into();
        assert!(matches!(err, StorageError::Resource(_)));
        assert_eq!(err.to_string(), "group 7 not found");
    }

    #[test]
    fn test_validation_detail_body() {
        let detail = ValidationDetail::body("type", "type is required");
        assert_eq!(detail.location, "body");
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "type");
    }

    #[test]
    fn test_below_high_water_names_both_sides() {
        let err = SequenceError::BelowHighWater {
            requested: 3,
            highest_observed: 9,
        };
        let message = err.to_string();
        assert!(message.contains('3') && message.contains('9'));
    }
}
