//! Record CRUD and listing for the SQLite backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::ToSql;
use rusqlite::{Connection, TransactionBehavior, params, params_from_iter};
use serde_json::Value;

use crate::auth::Visibility;
use crate::core::{RecordStorage, RelationSide};
use crate::error::{ResourceError, SequenceError, StorageResult};
use crate::tenant::TenantId;
use crate::types::{Listing, RecordKind, SearchQuery, StoredRecord};

use super::backend::{SqliteBackend, internal};
use super::sequence::{load_sequence, store_sequence};

/// The extracted columns stored next to the JSON document.
pub(crate) struct Envelope {
    pub name: String,
    pub scope: String,
    pub ref_group: Option<i64>,
    pub ref_person: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Pulls the filterable columns out of a record body.
pub(crate) fn envelope(kind: RecordKind, content: &Value) -> Envelope {
    let text = |field: &str| content.get(field).and_then(Value::as_str).map(String::from);
    let number = |field: &str| content.get(field).and_then(Value::as_i64);

    let (ref_group, ref_person, start_date, end_date) = match kind {
        RecordKind::Membership => (
            number("group_id"),
            number("person_id"),
            text("start_date"),
            text("end_date"),
        ),
        RecordKind::Group => (number("parent_id"), None, None, None),
        _ => (None, None, None, None),
    };

    Envelope {
        name: text("name").unwrap_or_default(),
        scope: text("scope").unwrap_or_else(|| "public".to_string()),
        ref_group,
        ref_person,
        start_date,
        end_date,
    }
}

/// Writes one record row; `replace` switches between insert and upsert.
pub(crate) fn write_row(
    conn: &Connection,
    record: &StoredRecord,
    replace: bool,
) -> StorageResult<()> {
    let env = envelope(record.kind, &record.content);
    let content = serde_json::to_string(&record.content)?;
    let sql = if replace {
        "INSERT OR REPLACE INTO records
         (tenant_id, kind, id, name, scope, ref_group, ref_person, start_date, end_date,
          content, created, modified)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
    } else {
        "INSERT INTO records
         (tenant_id, kind, id, name, scope, ref_group, ref_person, start_date, end_date,
          content, created, modified)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
    };
    conn.execute(
        sql,
        params![
            record.tenant_id.as_str(),
            record.kind.as_str(),
            record.id,
            env.name,
            env.scope,
            env.ref_group,
            env.ref_person,
            env.start_date,
            env.end_date,
            content,
            record.created.to_rfc3339(),
            record.modified.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Checks whether a record row exists.
pub(crate) fn row_exists(
    conn: &Connection,
    tenant: &TenantId,
    kind: RecordKind,
    id: i64,
) -> StorageResult<bool> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM records WHERE tenant_id = ?1 AND kind = ?2 AND id = ?3",
            params![tenant.as_str(), kind.as_str(), id],
            |_| Ok(()),
        )
        .map(|_| true)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(false),
            other => Err(other),
        })?;
    Ok(exists)
}

/// Rebuilds a [`StoredRecord`] from the raw row columns.
pub(crate) fn to_record(
    tenant: &TenantId,
    kind: RecordKind,
    id: i64,
    content: String,
    created: String,
    modified: String,
) -> StorageResult<StoredRecord> {
    let parse_time = |raw: &str| -> StorageResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| internal(format!("bad timestamp in row {kind}/{id}: {e}")))
    };
    Ok(StoredRecord {
        tenant_id: tenant.clone(),
        kind,
        id,
        content: serde_json::from_str(&content)?,
        created: parse_time(&created)?,
        modified: parse_time(&modified)?,
    })
}

/// Appends the visibility filter to a WHERE clause.
///
/// Relation grants only ever name group records, so for other kinds a
/// restricted principal sees public records only.
fn visibility_clause(kind: RecordKind, visibility: &Visibility, sql: &mut String) {
    match visibility {
        Visibility::All => {}
        Visibility::Restricted { group_ids } => {
            if kind == RecordKind::Group && !group_ids.is_empty() {
                let ids: Vec<String> = group_ids.iter().map(i64::to_string).collect();
                sql.push_str(&format!(
                    " AND (scope = 'public' OR id IN ({}))",
                    ids.join(", ")
                ));
            } else {
                sql.push_str(" AND scope = 'public'");
            }
        }
    }
}

#[async_trait]
impl RecordStorage for SqliteBackend {
    async fn create(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        mut content: Value,
    ) -> StorageResult<StoredRecord> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut sequence = load_sequence(&tx, tenant, kind)?;
        let id = match content.get("id").and_then(Value::as_i64) {
            Some(id) => {
                if id <= 0 {
                    return Err(SequenceError::NonPositiveId { value: id }.into());
                }
                if row_exists(&tx, tenant, kind, id)? {
                    return Err(ResourceError::AlreadyExists {
                        kind: kind.to_string(),
                        id,
                    }
                    .into());
                }
                sequence.observe(id);
                id
            }
            None => sequence.advance(),
        };

        if let Some(body) = content.as_object_mut() {
            body.insert("id".to_string(), Value::from(id));
        }

        let now = Utc::now();
        let record = StoredRecord {
            tenant_id: tenant.clone(),
            kind,
            id,
            content,
            created: now,
            modified: now,
        };
        write_row(&tx, &record, false)?;
        store_sequence(&tx, tenant, kind, sequence)?;
        tx.commit()?;

        tracing::debug!(tenant = %tenant, kind = %kind, id, "created record");
        Ok(record)
    }

    async fn read(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        id: i64,
    ) -> StorageResult<Option<StoredRecord>> {
        let conn = self.get_connection()?;
        let row = conn
            .query_row(
                "SELECT content, created, modified FROM records
                 WHERE tenant_id = ?1 AND kind = ?2 AND id = ?3",
                params![tenant.as_str(), kind.as_str(), id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        match row {
            Some((content, created, modified)) => {
                Ok(Some(to_record(tenant, kind, id, content, created, modified)?))
            }
            None => Ok(None),
        }
    }

    async fn replace(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        id: i64,
        mut content: Value,
    ) -> StorageResult<StoredRecord> {
        let conn = self.get_connection()?;

        if let Some(body) = content.as_object_mut() {
            body.insert("id".to_string(), Value::from(id));
        }

        let env = envelope(kind, &content);
        let now = Utc::now();
        let changed = conn.execute(
            "UPDATE records SET name = ?4, scope = ?5, ref_group = ?6, ref_person = ?7,
                 start_date = ?8, end_date = ?9, content = ?10, modified = ?11
             WHERE tenant_id = ?1 AND kind = ?2 AND id = ?3",
            params![
                tenant.as_str(),
                kind.as_str(),
                id,
                env.name,
                env.scope,
                env.ref_group,
                env.ref_person,
                env.start_date,
                env.end_date,
                serde_json::to_string(&content)?,
                now.to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(ResourceError::NotFound {
                kind: kind.to_string(),
                id,
            }
            .into());
        }

        let created: String = conn.query_row(
            "SELECT created FROM records WHERE tenant_id = ?1 AND kind = ?2 AND id = ?3",
            params![tenant.as_str(), kind.as_str(), id],
            |row| row.get(0),
        )?;

        to_record(tenant, kind, id, serde_json::to_string(&content)?, created, now.to_rfc3339())
    }

    async fn delete(&self, tenant: &TenantId, kind: RecordKind, id: i64) -> StorageResult<()> {
        let conn = self.get_connection()?;
        let changed = conn.execute(
            "DELETE FROM records WHERE tenant_id = ?1 AND kind = ?2 AND id = ?3",
            params![tenant.as_str(), kind.as_str(), id],
        )?;
        if changed == 0 {
            return Err(ResourceError::NotFound {
                kind: kind.to_string(),
                id,
            }
            .into());
        }
        tracing::debug!(tenant = %tenant, kind = %kind, id, "deleted record");
        Ok(())
    }

    async fn search(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        query: &SearchQuery,
        visibility: &Visibility,
    ) -> StorageResult<Listing> {
        let conn = self.get_connection()?;

        let mut filter = String::from("tenant_id = ?1 AND kind = ?2");
        let mut bindings: Vec<Box<dyn ToSql>> = vec![
            Box::new(tenant.as_str().to_string()),
            Box::new(kind.as_str().to_string()),
        ];

        if let Some(text) = &query.query {
            bindings.push(Box::new(format!("%{text}%")));
            filter.push_str(&format!(" AND name LIKE ?{}", bindings.len()));
        }
        if let Some(parent) = query.filter_parent {
            bindings.push(Box::new(parent));
            filter.push_str(&format!(" AND ref_group = ?{}", bindings.len()));
        }
        visibility_clause(kind, visibility, &mut filter);

        let total: u64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM records WHERE {filter}"),
            params_from_iter(bindings.iter().map(|b| b.as_ref())),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT id, content, created, modified FROM records WHERE {filter}
             ORDER BY name, id LIMIT ?{} OFFSET ?{}",
            bindings.len() + 1,
            bindings.len() + 2
        );
        bindings.push(Box::new(query.limit as i64));
        bindings.push(Box::new(query.offset as i64));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params_from_iter(bindings.iter().map(|b| b.as_ref())),
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
            records.push(to_record(tenant, kind, id, content, created, modified)?);
        }

        Ok(Listing { records, total })
    }

    async fn membership_counts(
        &self,
        tenant: &TenantId,
        side: RelationSide,
        ids: &[i64],
    ) -> StorageResult<HashMap<i64, u64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.get_connection()?;
        let column = match side {
            RelationSide::Group => "ref_group",
            RelationSide::Person => "ref_person",
        };
        let id_list: Vec<String> = ids.iter().map(i64::to_string).collect();
        let sql = format!(
            "SELECT {column}, COUNT(*) FROM records
             WHERE tenant_id = ?1 AND kind = 'membership' AND {column} IN ({})
             GROUP BY {column}",
            id_list.join(", ")
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![tenant.as_str()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, u64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (id, count) = row?;
            counts.insert(id, count);
        }
        Ok(counts)
    }

    async fn active_membership_groups(
        &self,
        tenant: &TenantId,
        person_id: i64,
        date: NaiveDate,
    ) -> StorageResult<Vec<i64>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT ref_group FROM records
             WHERE tenant_id = ?1 AND kind = 'membership' AND ref_person = ?2
               AND ref_group IS NOT NULL
               AND (start_date IS NULL OR start_date <= ?3)
               AND (end_date IS NULL OR end_date >= ?3)
             ORDER BY ref_group",
        )?;
        let day = date.format("%Y-%m-%d").to_string();
        let rows = stmt.query_map(params![tenant.as_str(), person_id, day], |row| {
            row.get::<_, i64>(0)
        })?;

        let mut groups = Vec::new();
        for row in rows {
            groups.push(row?);
        }
        Ok(groups)
    }

    async fn find_user(
        &self,
        tenant: &TenantId,
        userid: &str,
    ) -> StorageResult<Option<StoredRecord>> {
        let conn = self.get_connection()?;
        let row = conn
            .query_row(
                "SELECT id, content, created, modified FROM records
                 WHERE tenant_id = ?1 AND kind = 'user' AND name = ?2",
                params![tenant.as_str(), userid],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        match row {
            Some((id, content, created, modified)) => Ok(Some(to_record(
                tenant,
                RecordKind::User,
                id,
                content,
                created,
                modified,
            )?)),
            None => Ok(None),
        }
    }
}
