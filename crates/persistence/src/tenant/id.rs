//! Tenant identifier type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TenantError;

/// A validated tenant identifier.
///
/// Tenant ids are short slugs used as partition keys: ASCII alphanumerics,
/// `-`, and `_`, at most 64 characters, never empty.
///
/// # Example
///
/// ```rust
/// use lectern_persistence::tenant::TenantId;
///
/// let tenant: TenantId = "unseen-university".parse().unwrap();
/// assert_eq!(tenant.as_str(), "unseen-university");
/// assert!("bad tenant!".parse::<TenantId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Maximum length of a tenant id in bytes.
    pub const MAX_LEN: usize = 64;

    /// Creates a tenant id, validating the slug format.
    pub fn new(value: impl Into<String>) -> Result<Self, TenantError> {
        let value = value.into();
        if value.is_empty()
            || value.len() > Self::MAX_LEN
            || !value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(TenantError::MalformedId { value });
        }
        Ok(Self(value))
    }

    /// Returns the tenant id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TenantId {
    type Err = TenantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TenantId {
    type Error = TenantError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}
