//! The identifier sequence trait.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::sequence::IdSequence;
use crate::tenant::TenantId;
use crate::types::RecordKind;

/// Persistent identifier sequences, one per `(tenant, kind)`.
///
/// `mint_id` and `set_next_id` must run inside a write transaction so that
/// two concurrent mints can never return the same id.
#[async_trait]
pub trait SequenceStore: Send + Sync + 'static {
    /// Returns the current sequence state without modifying it.
    async fn peek_sequence(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
    ) -> StorageResult<IdSequence>;

    /// Mints one id and returns the state after minting.
    ///
    /// The minted id is `current_id` of the state *before* the call, which
    /// is `highest_observed_id` of the returned state.
    async fn mint_id(&self, tenant: &TenantId, kind: RecordKind) -> StorageResult<IdSequence>;

    /// Moves the sequence so the next mint returns `next_id`.
    async fn set_next_id(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        next_id: i64,
    ) -> StorageResult<IdSequence>;
}
