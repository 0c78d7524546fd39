//! The record storage trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::auth::Visibility;
use crate::error::StorageResult;
use crate::tenant::TenantId;
use crate::types::{Listing, RecordKind, SearchQuery, StoredRecord};

/// Which side of a membership a relation query counts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationSide {
    /// Count memberships per group id.
    Group,
    /// Count memberships per person id.
    Person,
}

/// CRUD and listing operations over stored records.
///
/// All operations are tenant-partitioned: a record is addressed by
/// `(tenant, kind, id)` and no call ever crosses tenants. Implementations
/// must keep the identifier sequence consistent with writes — creating a
/// record with an explicit id observes that id in the same transaction.
///
/// # Example
///
/// ```rust,ignore
/// use lectern_persistence::core::RecordStorage;
/// use lectern_persistence::types::RecordKind;
/// use serde_json::json;
///
/// let record = storage
///     .create(&tenant, RecordKind::Group, json!({"name": "Corp."}))
///     .await?;
/// assert_eq!(record.id, 1);
/// ```
#[async_trait]
pub trait RecordStorage: Send + Sync + 'static {
    /// Creates a record, minting an id when the content carries none.
    ///
    /// Fails with [`crate::error::ResourceError::AlreadyExists`] when the
    /// content names an id that is already taken.
    async fn create(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        content: Value,
    ) -> StorageResult<StoredRecord>;

    /// Reads a record by id. `Ok(None)` when it does not exist.
    async fn read(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        id: i64,
    ) -> StorageResult<Option<StoredRecord>>;

    /// Replaces the content of an existing record.
    async fn replace(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        id: i64,
        content: Value,
    ) -> StorageResult<StoredRecord>;

    /// Deletes a record by id.
    async fn delete(&self, tenant: &TenantId, kind: RecordKind, id: i64) -> StorageResult<()>;

    /// Lists records with offset paging, a name filter, and the caller's
    /// visibility applied.
    async fn search(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        query: &SearchQuery,
        visibility: &Visibility,
    ) -> StorageResult<Listing>;

    /// Counts memberships per related record id, for snippet projections.
    async fn membership_counts(
        &self,
        tenant: &TenantId,
        side: RelationSide,
        ids: &[i64],
    ) -> StorageResult<HashMap<i64, u64>>;

    /// Group ids of memberships of `person_id` that are active on `date`.
    async fn active_membership_groups(
        &self,
        tenant: &TenantId,
        person_id: i64,
        date: NaiveDate,
    ) -> StorageResult<Vec<i64>>;

    /// Looks up a user record by its login name.
    async fn find_user(
        &self,
        tenant: &TenantId,
        userid: &str,
    ) -> StorageResult<Option<StoredRecord>>;
}
