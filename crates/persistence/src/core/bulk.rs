//! Bulk import/export traits.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageResult;
use crate::tenant::TenantId;
use crate::types::{BulkCursor, BulkPage, RecordKind};

/// Result of a bulk upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BulkOutcome {
    /// Records that did not exist before the batch.
    pub inserted: usize,
    /// Records whose content was replaced.
    pub updated: usize,
}

/// Atomic bulk writes and cursor-paged exports.
#[async_trait]
pub trait BulkStore: Send + Sync + 'static {
    /// Upserts a batch of normalized records in one transaction.
    ///
    /// Either every record of the batch is applied or none is. Records
    /// without an id get one minted inside the same transaction.
    async fn bulk_upsert(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        records: Vec<Value>,
    ) -> StorageResult<BulkOutcome>;

    /// Returns one page of the `(name, id)` ordered export.
    ///
    /// `remaining` counts records strictly after the returned page at call
    /// time, so a concurrent insert behind the cursor never disturbs the
    /// pages still to come.
    async fn bulk_page(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        cursor: Option<BulkCursor>,
        limit: usize,
    ) -> StorageResult<BulkPage>;
}
