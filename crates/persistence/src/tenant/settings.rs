//! Tenant settings and the type registry.
//!
//! Each tenant carries a set of controlled vocabularies (the type registry):
//! ordered lists of `{id, label}` entries keyed by category. Validation
//! consults these vocabularies, and the client configuration endpoint exports
//! them so user interfaces can render pick lists in the configured order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One entry in a controlled vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    /// Stable identifier stored in records.
    pub id: String,
    /// Human-readable label for display.
    pub label: String,
}

impl TypeEntry {
    /// Creates an entry from an id and a label.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Per-tenant repository configuration.
///
/// Holds display settings and the tenant's vocabularies. Lookups preserve the
/// insertion order of entries within a category, which is the order clients
/// are expected to present them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSettings {
    /// Repository title shown to clients.
    pub title: String,
    /// Optional UI theme identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Controlled vocabularies keyed by category name.
    pub vocabularies: BTreeMap<String, Vec<TypeEntry>>,
}

impl TenantSettings {
    /// Creates settings with the given title and the default vocabulary set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            theme: None,
            vocabularies: default_vocabularies(),
        }
    }

    /// Returns the ordered entries of a vocabulary category.
    ///
    /// Unknown categories are a configuration error, not an empty list: a
    /// typo in a category name should fail loudly.
    pub fn type_config(&self, category: &str) -> Result<&[TypeEntry], ConfigError> {
        self.vocabularies
            .get(category)
            .map(|entries| entries.as_slice())
            .ok_or_else(|| ConfigError::UnknownCategory {
                category: category.to_string(),
            })
    }

    /// Returns true when `value` is a member of the named category.
    pub fn contains(&self, category: &str, value: &str) -> Result<bool, ConfigError> {
        Ok(self.type_config(category)?.iter().any(|e| e.id == value))
    }

    /// Formats the allowed ids of a category for error messages.
    pub fn allowed_values(&self, category: &str) -> Result<String, ConfigError> {
        let ids: Vec<&str> = self
            .type_config(category)?
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        Ok(ids.join(", "))
    }

    /// Replaces one vocabulary category.
    pub fn set_vocabulary(&mut self, category: impl Into<String>, entries: Vec<TypeEntry>) {
        self.vocabularies.insert(category.into(), entries);
    }
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self::new("Lectern Repository")
    }
}

/// The vocabulary set a fresh tenant starts with.
fn default_vocabularies() -> BTreeMap<String, Vec<TypeEntry>> {
    let mut vocabularies = BTreeMap::new();
    vocabularies.insert(
        "group_type".to_string(),
        vec![
            TypeEntry::new("organisation", "Organisation"),
            TypeEntry::new("institute", "Institute"),
            TypeEntry::new("faculty", "Faculty"),
            TypeEntry::new("department", "Department"),
        ],
    );
    vocabularies.insert(
        "group_account_type".to_string(),
        vec![
            TypeEntry::new("email", "Email"),
            TypeEntry::new("website", "Website"),
            TypeEntry::new("local", "Local Identifier"),
        ],
    );
    vocabularies.insert(
        "person_account_type".to_string(),
        vec![
            TypeEntry::new("email", "Email"),
            TypeEntry::new("orcid", "ORCID"),
            TypeEntry::new("local", "Local Identifier"),
        ],
    );
    vocabularies.insert(
        "work_type".to_string(),
        vec![
            TypeEntry::new("article", "Article"),
            TypeEntry::new("book", "Book"),
            TypeEntry::new("bookChapter", "Book Chapter"),
            TypeEntry::new("report", "Report"),
            TypeEntry::new("dataset", "Dataset"),
        ],
    );
    vocabularies.insert(
        "contributor_role".to_string(),
        vec![
            TypeEntry::new("author", "Author"),
            TypeEntry::new("editor", "Editor"),
            TypeEntry::new("translator", "Translator"),
        ],
    );
    vocabularies.insert(
        "position_type".to_string(),
        vec![
            TypeEntry::new("academic", "Academic Staff"),
            TypeEntry::new("support", "Support Staff"),
            TypeEntry::new("phd", "PhD Candidate"),
        ],
    );
    vocabularies
}
