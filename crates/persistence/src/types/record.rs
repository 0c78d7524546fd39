//! Stored records and record kinds.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ResourceError;
use crate::tenant::TenantId;

/// The record kinds the repository stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// An organisational unit (faculty, department, ...).
    Group,
    /// A researcher or author.
    Person,
    /// A scholarly output (article, book, dataset, ...).
    Work,
    /// A person's affiliation with a group, optionally time-bounded.
    Membership,
    /// A login account.
    User,
}

impl RecordKind {
    /// All kinds, in route order.
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Group,
        RecordKind::Person,
        RecordKind::Work,
        RecordKind::Membership,
        RecordKind::User,
    ];

    /// Returns the lowercase name used in routes and storage.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Group => "group",
            RecordKind::Person => "person",
            RecordKind::Work => "work",
            RecordKind::Membership => "membership",
            RecordKind::User => "user",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ResourceError::UnknownKind {
                kind: s.to_string(),
            })
    }
}

/// Visibility scope of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Visible to every principal of the tenant.
    Public,
    /// Visible to editors and above, and to relation-granted principals.
    Private,
}

impl Scope {
    /// Returns the lowercase name stored in record content.
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Public => "public",
            Scope::Private => "private",
        }
    }

    /// Parses the stored form.
    pub fn parse(s: &str) -> Option<Scope> {
        match s {
            "public" => Some(Scope::Public),
            "private" => Some(Scope::Private),
            _ => None,
        }
    }
}

/// A record as held by the storage layer.
///
/// The full document lives in `content` (a JSON object that always carries
/// `id`, `name`, and `scope` after normalization); the remaining fields are
/// the envelope the backend extracts for keying and ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Owning tenant partition.
    pub tenant_id: TenantId,
    /// Record kind.
    pub kind: RecordKind,
    /// Tenant-scoped identifier.
    pub id: i64,
    /// The record document.
    pub content: Value,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last modification timestamp.
    pub modified: DateTime<Utc>,
}

impl StoredRecord {
    /// Returns the derived sort name from the content.
    pub fn name(&self) -> &str {
        self.content
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Returns the record scope, defaulting to public.
    pub fn scope(&self) -> Scope {
        self.content
            .get("scope")
            .and_then(Value::as_str)
            .and_then(Scope::parse)
            .unwrap_or(Scope::Public)
    }

    /// Returns a string field of the content, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.content.get(name).and_then(Value::as_str)
    }

    /// Returns an integer field of the content, if present.
    pub fn int_field(&self, name: &str) -> Option<i64> {
        self.content.get(name).and_then(Value::as_i64)
    }
}

/// Merges a partial update into the current content.
///
/// Keys present in `update` replace the stored value; keys absent from
/// `update` are preserved. An explicit empty list therefore clears a
/// collection, while omitting it leaves the collection untouched.
pub fn merge_content(current: &Value, update: Value) -> Value {
    let mut merged = current.clone();
    if let (Some(base), Some(patch)) = (merged.as_object_mut(), update.as_object()) {
        for (key, value) in patch {
            base.insert(key.clone(), value.clone());
        }
    }
    merged
}
