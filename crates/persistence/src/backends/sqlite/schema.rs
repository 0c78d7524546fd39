//! SQLite schema definition.

use rusqlite::Connection;

use crate::error::StorageResult;

use super::backend::internal;

/// Schema version, stored in `PRAGMA user_version`.
const SCHEMA_VERSION: i64 = 1;

/// Creates the tables and indexes if they do not exist yet.
pub fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            tenant_id   TEXT    NOT NULL,
            kind        TEXT    NOT NULL,
            id          INTEGER NOT NULL,
            name        TEXT    NOT NULL DEFAULT '',
            scope       TEXT    NOT NULL DEFAULT 'public',
            ref_group   INTEGER,
            ref_person  INTEGER,
            start_date  TEXT,
            end_date    TEXT,
            content     TEXT    NOT NULL,
            created     TEXT    NOT NULL,
            modified    TEXT    NOT NULL,
            PRIMARY KEY (tenant_id, kind, id)
        );

        CREATE INDEX IF NOT EXISTS idx_records_order
            ON records (tenant_id, kind, name, id);

        CREATE INDEX IF NOT EXISTS idx_records_ref_group
            ON records (tenant_id, kind, ref_group);

        CREATE INDEX IF NOT EXISTS idx_records_ref_person
            ON records (tenant_id, kind, ref_person);

        CREATE TABLE IF NOT EXISTS sequences (
            tenant_id           TEXT    NOT NULL,
            kind                TEXT    NOT NULL,
            current_id          INTEGER NOT NULL,
            highest_observed_id INTEGER NOT NULL,
            PRIMARY KEY (tenant_id, kind)
        );
        "#,
    )
    .map_err(|e| internal(format!("failed to initialize schema: {e}")))?;

    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| internal(format!("failed to read schema version: {e}")))?;
    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(|e| internal(format!("failed to set schema version: {e}")))?;
    }

    Ok(())
}
