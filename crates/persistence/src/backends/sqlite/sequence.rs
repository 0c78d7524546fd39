//! Identifier sequences in SQLite.

use async_trait::async_trait;
use rusqlite::{Connection, TransactionBehavior, params};

use crate::core::SequenceStore;
use crate::error::StorageResult;
use crate::sequence::IdSequence;
use crate::tenant::TenantId;
use crate::types::RecordKind;

use super::backend::SqliteBackend;

/// Loads the sequence row, creating it lazily at its initial state.
///
/// Must be called inside a write transaction: the caller mutates the value
/// and writes it back with [`store_sequence`] before committing.
pub(crate) fn load_sequence(
    conn: &Connection,
    tenant: &TenantId,
    kind: RecordKind,
) -> StorageResult<IdSequence> {
    conn.execute(
        "INSERT OR IGNORE INTO sequences (tenant_id, kind, current_id, highest_observed_id)
         VALUES (?1, ?2, 1, 0)",
        params![tenant.as_str(), kind.as_str()],
    )?;
    let sequence = conn.query_row(
        "SELECT current_id, highest_observed_id FROM sequences
         WHERE tenant_id = ?1 AND kind = ?2",
        params![tenant.as_str(), kind.as_str()],
        |row| Ok(IdSequence::from_parts(row.get(0)?, row.get(1)?)),
    )?;
    Ok(sequence)
}

/// Writes a sequence value back to its row.
pub(crate) fn store_sequence(
    conn: &Connection,
    tenant: &TenantId,
    kind: RecordKind,
    sequence: IdSequence,
) -> StorageResult<()> {
    conn.execute(
        "UPDATE sequences SET current_id = ?3, highest_observed_id = ?4
         WHERE tenant_id = ?1 AND kind = ?2",
        params![
            tenant.as_str(),
            kind.as_str(),
            sequence.current_id,
            sequence.highest_observed_id
        ],
    )?;
    Ok(())
}

#[async_trait]
impl SequenceStore for SqliteBackend {
    async fn peek_sequence(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
    ) -> StorageResult<IdSequence> {
        let conn = self.get_connection()?;
        let row = conn
            .query_row(
                "SELECT current_id, highest_observed_id FROM sequences
                 WHERE tenant_id = ?1 AND kind = ?2",
                params![tenant.as_str(), kind.as_str()],
                |row| Ok(IdSequence::from_parts(row.get(0)?, row.get(1)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(row.unwrap_or_default())
    }

    async fn mint_id(&self, tenant: &TenantId, kind: RecordKind) -> StorageResult<IdSequence> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut sequence = load_sequence(&tx, tenant, kind)?;
        sequence.advance();
        store_sequence(&tx, tenant, kind, sequence)?;
        tx.commit()?;
        Ok(sequence)
    }

    async fn set_next_id(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        next_id: i64,
    ) -> StorageResult<IdSequence> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut sequence = load_sequence(&tx, tenant, kind)?;
        sequence.try_set_next(next_id)?;
        store_sequence(&tx, tenant, kind, sequence)?;
        tx.commit()?;
        Ok(sequence)
    }
}
