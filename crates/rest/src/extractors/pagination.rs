//! Pagination extractor.
//!
//! Extracts `offset` and `limit` query parameters for offset-paged listings.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::error::RestError;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 1000;

/// Axum extractor for listing pagination parameters.
#[derive(Debug, Clone)]
pub struct Pagination {
    limit: usize,
    offset: usize,
}

/// Query parameters for pagination.
#[derive(Debug, Deserialize)]
struct PaginationQuery {
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Pagination {
    /// Creates a Pagination, capping the limit.
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset,
        }
    }

    /// Returns the page size.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the offset.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PaginationQuery>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                RestError::bad_request("offset", "querystring", "invalid pagination parameters")
            })?;

        Ok(Pagination::new(
            query.limit.unwrap_or(DEFAULT_LIMIT),
            query.offset.unwrap_or(0),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_capped_at_max() {
        let pagination = Pagination::new(5000, 0);
        assert_eq!(pagination.limit(), MAX_LIMIT);
    }

    #[test]
    fn test_zero_limit_raised_to_one() {
        let pagination = Pagination::new(0, 0);
        assert_eq!(pagination.limit(), 1);
    }

    #[test]
    fn test_defaults() {
        let pagination = Pagination::default();
        assert_eq!(pagination.limit(), DEFAULT_LIMIT);
        assert_eq!(pagination.offset(), 0);
    }
}
