//! Atomic bulk upserts and cursor-paged exports.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{TransactionBehavior, params};
use serde_json::Value;

use crate::core::{BulkOutcome, BulkStore};
use crate::error::{SequenceError, StorageResult, ValidationError};
use crate::tenant::TenantId;
use crate::types::{BulkCursor, BulkPage, RecordKind, StoredRecord};

use super::backend::SqliteBackend;
use super::sequence::{load_sequence, store_sequence};
use super::storage::{row_exists, write_row};

#[async_trait]
impl BulkStore for SqliteBackend {
    async fn bulk_upsert(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        records: Vec<Value>,
    ) -> StorageResult<BulkOutcome> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut sequence = load_sequence(&tx, tenant, kind)?;
        let mut outcome = BulkOutcome {
            inserted: 0,
            updated: 0,
        };
        let now = Utc::now();

        for mut content in records {
            if !content.is_object() {
                return Err(ValidationError::NotAnObject.into());
            }

            let (id, exists) = match content.get("id").and_then(Value::as_i64) {
                Some(id) => {
                    if id <= 0 {
                        return Err(SequenceError::NonPositiveId { value: id }.into());
                    }
                    sequence.observe(id);
                    (id, row_exists(&tx, tenant, kind, id)?)
                }
                None => (sequence.advance(), false),
            };

            if let Some(body) = content.as_object_mut() {
                body.insert("id".to_string(), Value::from(id));
            }

            // Keep the original creation time across upserts.
            let created = tx
                .query_row(
                    "SELECT created FROM records
                     WHERE tenant_id = ?1 AND kind = ?2 AND id = ?3",
                    params![tenant.as_str(), kind.as_str(), id],
                    |row| row.get::<_, String>(0),
                )
                .ok()
                .and_then(|raw| chrono::DateTime::parse_from_rfc3339(&raw).ok())
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or(now);

            let record = StoredRecord {
                tenant_id: tenant.clone(),
                kind,
                id,
                content,
                created,
                modified: now,
            };
            write_row(&tx, &record, true)?;

            if exists {
                outcome.updated += 1;
            } else {
                outcome.inserted += 1;
            }
        }

        store_sequence(&tx, tenant, kind, sequence)?;
        tx.commit()?;

        tracing::debug!(
            tenant = %tenant,
            kind = %kind,
            inserted = outcome.inserted,
            updated = outcome.updated,
            "bulk upsert applied"
        );
        Ok(outcome)
    }

    async fn bulk_page(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        cursor: Option<BulkCursor>,
        limit: usize,
    ) -> StorageResult<BulkPage> {
        let conn = self.get_connection()?;
        let position = cursor.unwrap_or(BulkCursor {
            name: String::new(),
            id: 0,
        });

        let mut stmt = conn.prepare(
            "SELECT id, content, created, modified FROM records
             WHERE tenant_id = ?1 AND kind = ?2
               AND (name > ?3 OR (name = ?3 AND id > ?4))
             ORDER BY name, id LIMIT ?5",
        )?;
        let rows = stmt.query_map(
            params![
                tenant.as_str(),
                kind.as_str(),
                position.name,
                position.id,
                limit as i64
            ],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )?;

        let mut records = Vec::new();
        for row in rows {
            let (id, content, created, modified) = row?;
            records.push(super::storage::to_record(
                tenant, kind, id, content, created, modified,
            )?);
        }

        // Count what is left after this page, as of now. The cursor is only
        // handed out while something remains, so the terminal page always
        // carries a null cursor.
        let (remaining, next_cursor) = match records.last() {
            Some(last) => {
                let after = BulkCursor::after(last);
                let remaining: u64 = conn.query_row(
                    "SELECT COUNT(*) FROM records
                     WHERE tenant_id = ?1 AND kind = ?2
                       AND (name > ?3 OR (name = ?3 AND id > ?4))",
                    params![tenant.as_str(), kind.as_str(), after.name, after.id],
                    |row| row.get(0),
                )?;
                if remaining > 0 {
                    (remaining, Some(after))
                } else {
                    (0, None)
                }
            }
            None => (0, None),
        };

        Ok(BulkPage {
            records,
            remaining,
            limit,
            cursor: next_cursor,
        })
    }
}
