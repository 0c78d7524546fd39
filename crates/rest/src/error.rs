//! HTTP error mapping.
//!
//! Every error leaving the API has the same body shape:
//!
//! ```json
//! {"status": "error", "errors": [{"name": "...", "location": "...", "description": "..."}]}
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use lectern_persistence::error::{
    AccessError, ConfigError, ResourceError, SearchError, SequenceError, StorageError,
    TenantError, ValidationDetail, ValidationError,
};

/// Errors returned by the REST layer.
#[derive(Error, Debug)]
pub enum RestError {
    /// The addressed record or route does not exist.
    #[error("not found: {description}")]
    NotFound {
        /// Human-readable description for the error body.
        description: String,
    },

    /// Missing or invalid authentication.
    #[error("unauthorized: {description}")]
    Unauthorized {
        /// Human-readable description for the error body.
        description: String,
    },

    /// The principal may not perform the operation.
    #[error("forbidden: {description}")]
    Forbidden {
        /// Human-readable description for the error body.
        description: String,
    },

    /// A single malformed field.
    #[error("bad request: {name}: {description}")]
    BadRequest {
        /// Field name for the error body.
        name: String,
        /// Where the field was found: body, querystring, header.
        location: String,
        /// Human-readable description.
        description: String,
    },

    /// One or more record validation failures.
    #[error("validation failed")]
    Validation(Vec<ValidationDetail>),

    /// Unexpected server-side failure. The description is logged, not sent.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RestError {
    /// Shorthand for a single bad request field in the body.
    pub fn bad_request(
        name: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        RestError::BadRequest {
            name: name.into(),
            location: location.into(),
            description: description.into(),
        }
    }

    /// Shorthand for a 401.
    pub fn unauthorized(description: impl Into<String>) -> Self {
        RestError::Unauthorized {
            description: description.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RestError::BadRequest { .. } | RestError::Validation(_) => StatusCode::BAD_REQUEST,
            RestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Vec<ValidationDetail> {
        match self {
            RestError::NotFound { description } => {
                vec![ValidationDetail {
                    name: "id".to_string(),
                    location: "path".to_string(),
                    description: description.clone(),
                }]
            }
            RestError::Unauthorized { description } => {
                vec![ValidationDetail {
                    name: "authorization".to_string(),
                    location: "header".to_string(),
                    description: description.clone(),
                }]
            }
            RestError::Forbidden { description } => {
                vec![ValidationDetail {
                    name: "permission".to_string(),
                    location: "request".to_string(),
                    description: description.clone(),
                }]
            }
            RestError::BadRequest {
                name,
                location,
                description,
            } => vec![ValidationDetail {
                name: name.clone(),
                location: location.clone(),
                description: description.clone(),
            }],
            RestError::Validation(details) => details.clone(),
            RestError::Internal(_) => {
                vec![ValidationDetail {
                    name: "server".to_string(),
                    location: "request".to_string(),
                    description: "internal server error".to_string(),
                }]
            }
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        if let RestError::Internal(message) = &self {
            tracing::error!(error = %message, "request failed");
        }
        let body = json!({
            "status": "error",
            "errors": self.details(),
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Resource(e) => match e {
                ResourceError::NotFound { .. } | ResourceError::UnknownKind { .. } => {
                    RestError::NotFound {
                        description: e.to_string(),
                    }
                }
                ResourceError::AlreadyExists { .. } => {
                    RestError::bad_request("id", "body", e.to_string())
                }
            },
            StorageError::Access(e) => match e {
                AccessError::Forbidden { .. } => RestError::Forbidden {
                    description: e.to_string(),
                },
                AccessError::Unauthenticated => RestError::unauthorized(e.to_string()),
            },
            StorageError::Validation(e) => match e {
                ValidationError::InvalidRecord { details } => RestError::Validation(details),
                ValidationError::NotAnObject => {
                    RestError::bad_request("body", "body", e.to_string())
                }
            },
            StorageError::Sequence(e) => match e {
                SequenceError::BelowHighWater { .. } => {
                    RestError::bad_request("next_id", "body", e.to_string())
                }
                SequenceError::NonPositiveId { .. } => {
                    RestError::bad_request("id", "body", e.to_string())
                }
            },
            StorageError::Search(e) => match e {
                SearchError::InvalidCursor { .. } => {
                    RestError::bad_request("cursor", "querystring", e.to_string())
                }
                SearchError::InvalidLimit { .. } => {
                    RestError::bad_request("limit", "querystring", e.to_string())
                }
                SearchError::InvalidParameter { ref parameter, .. } => {
                    RestError::bad_request(parameter.clone(), "querystring", e.to_string())
                }
            },
            StorageError::Tenant(e) => match e {
                TenantError::InvalidTenant { .. } | TenantError::MalformedId { .. } => {
                    RestError::bad_request("X-Tenant-ID", "header", e.to_string())
                }
                TenantError::CrossTenantReference { .. } => {
                    RestError::bad_request("body", "body", e.to_string())
                }
            },
            StorageError::Config(e) => match e {
                // A typo'd vocabulary category is a server misconfiguration.
                ConfigError::UnknownCategory { .. }
                | ConfigError::UnknownScheme { .. }
                | ConfigError::MalformedUri { .. } => RestError::Internal(e.to_string()),
            },
            StorageError::Transaction(e) => RestError::Internal(e.to_string()),
            StorageError::Backend(e) => RestError::Internal(e.to_string()),
        }
    }
}
