//! Integration tests for bulk import and cursor-paged export.

use lectern_persistence::backends::sqlite::SqliteBackend;
use lectern_persistence::core::{BulkStore, RecordStorage};
use lectern_persistence::tenant::TenantId;
use lectern_persistence::types::{BulkCursor, RecordKind};
use serde_json::json;

fn backend() -> SqliteBackend {
    let backend = SqliteBackend::in_memory().unwrap();
    backend.init_schema().unwrap();
    backend
}

fn tenant() -> TenantId {
    TenantId::new("test").unwrap()
}

#[tokio::test]
async fn test_bulk_upsert_counts_inserts_and_updates() {
    let backend = backend();
    let tenant = tenant();

    let outcome = backend
        .bulk_upsert(
            &tenant,
            RecordKind::Group,
            vec![
                json!({"id": 1, "name": "One"}),
                json!({"id": 2, "name": "Two"}),
            ],
        )
        .await
        .unwrap();
    assert_eq!(outcome.inserted, 2);
    assert_eq!(outcome.updated, 0);

    let outcome = backend
        .bulk_upsert(
            &tenant,
            RecordKind::Group,
            vec![
                json!({"id": 2, "name": "Two v2"}),
                json!({"name": "Minted"}),
            ],
        )
        .await
        .unwrap();
    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.updated, 1);

    // The minted record landed above the highest explicit id.
    let minted = backend
        .read(&tenant, RecordKind::Group, 3)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(minted.name(), "Minted");
}

#[tokio::test]
async fn test_export_walks_all_pages() {
    let backend = backend();
    let tenant = tenant();

    let records = (0..25)
        .map(|i| json!({"name": format!("group-{i:02}")}))
        .collect();
    backend
        .bulk_upsert(&tenant, RecordKind::Group, records)
        .await
        .unwrap();

    let mut seen = Vec::new();
    let mut cursor: Option<BulkCursor> = None;
    loop {
        let page = backend
            .bulk_page(&tenant, RecordKind::Group, cursor.clone(), 10)
            .await
            .unwrap();
        assert!(page.records.len() <= 10);
        seen.extend(page.records.iter().map(|r| r.name().to_string()));
        match page.cursor {
            Some(next) => {
                assert!(page.remaining > 0);
                cursor = Some(next);
            }
            None => {
                assert_eq!(page.remaining, 0);
                break;
            }
        }
    }

    assert_eq!(seen.len(), 25);
    let mut sorted = seen.clone();
    sorted.sort();
    assert_eq!(seen, sorted, "export must be name-ordered");
}

#[tokio::test]
async fn test_export_single_page_has_null_cursor() {
    let backend = backend();
    let tenant = tenant();
    backend
        .bulk_upsert(
            &tenant,
            RecordKind::Group,
            vec![json!({"name": "Only"}), json!({"name": "Two"})],
        )
        .await
        .unwrap();

    let page = backend
        .bulk_page(&tenant, RecordKind::Group, None, 100)
        .await
        .unwrap();
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.remaining, 0);
    assert!(page.cursor.is_none());
}

#[tokio::test]
async fn test_insert_behind_cursor_does_not_shift_pages() {
    let backend = backend();
    let tenant = tenant();

    let records = (0..6).map(|i| json!({"name": format!("m-{i}")})).collect();
    backend
        .bulk_upsert(&tenant, RecordKind::Group, records)
        .await
        .unwrap();

    let first = backend
        .bulk_page(&tenant, RecordKind::Group, None, 3)
        .await
        .unwrap();
    let first_names: Vec<String> = first.records.iter().map(|r| r.name().into()).collect();
    assert_eq!(first_names, vec!["m-0", "m-1", "m-2"]);

    // Insert a record that sorts before the cursor position.
    backend
        .create(&tenant, RecordKind::Group, json!({"name": "a-before"}))
        .await
        .unwrap();

    let second = backend
        .bulk_page(&tenant, RecordKind::Group, first.cursor, 10)
        .await
        .unwrap();
    let second_names: Vec<String> = second.records.iter().map(|r| r.name().into()).collect();
    assert_eq!(
        second_names,
        vec!["m-3", "m-4", "m-5"],
        "early insert must not repeat or skip records"
    );
}

#[tokio::test]
async fn test_failed_batch_leaves_nothing_behind() {
    let backend = backend();
    let tenant = tenant();

    let err = backend
        .bulk_upsert(
            &tenant,
            RecordKind::Group,
            vec![json!({"name": "Good"}), json!("not an object")],
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("JSON object"));

    let page = backend
        .bulk_page(&tenant, RecordKind::Group, None, 10)
        .await
        .unwrap();
    assert!(page.records.is_empty(), "atomic batch must roll back fully");
}
