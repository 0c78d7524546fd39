//! Integration tests for record storage on the SQLite backend.

use std::sync::Arc;

use lectern_persistence::auth::Visibility;
use lectern_persistence::backends::sqlite::SqliteBackend;
use lectern_persistence::core::{RecordStorage, RelationSide};
use lectern_persistence::error::{ResourceError, StorageError};
use lectern_persistence::tenant::TenantId;
use lectern_persistence::types::{RecordKind, SearchQuery};
use serde_json::json;

fn backend() -> SqliteBackend {
    let backend = SqliteBackend::in_memory().unwrap();
    backend.init_schema().unwrap();
    backend
}

fn tenant(name: &str) -> TenantId {
    TenantId::new(name).unwrap()
}

#[tokio::test]
async fn test_create_mints_sequential_ids() {
    let backend = backend();
    let tenant = tenant("test");

    let first = backend
        .create(&tenant, RecordKind::Group, json!({"name": "Alpha"}))
        .await
        .unwrap();
    let second = backend
        .create(&tenant, RecordKind::Group, json!({"name": "Beta"}))
        .await
        .unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(first.content["id"], 1);
}

#[tokio::test]
async fn test_explicit_id_respected_and_observed() {
    let backend = backend();
    let tenant = tenant("test");

    let rec = backend
        .create(&tenant, RecordKind::Group, json!({"id": 10, "name": "Corp"}))
        .await
        .unwrap();
    assert_eq!(rec.id, 10);

    // The next minted id must land above the explicit one.
    let next = backend
        .create(&tenant, RecordKind::Group, json!({"name": "After"}))
        .await
        .unwrap();
    assert_eq!(next.id, 11);
}

#[tokio::test]
async fn test_duplicate_explicit_id_rejected() {
    let backend = backend();
    let tenant = tenant("test");

    backend
        .create(&tenant, RecordKind::Group, json!({"id": 5, "name": "A"}))
        .await
        .unwrap();
    let err = backend
        .create(&tenant, RecordKind::Group, json!({"id": 5, "name": "B"}))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Resource(ResourceError::AlreadyExists { .. })
    ));
}

#[tokio::test]
async fn test_read_update_delete_round_trip() {
    let backend = backend();
    let tenant = tenant("test");

    let rec = backend
        .create(&tenant, RecordKind::Person, json!({"name": "Doe, J."}))
        .await
        .unwrap();

    let loaded = backend
        .read(&tenant, RecordKind::Person, rec.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.name(), "Doe, J.");

    let updated = backend
        .replace(
            &tenant,
            RecordKind::Person,
            rec.id,
            json!({"name": "Doe, Jane"}),
        )
        .await
        .unwrap();
    assert_eq!(updated.name(), "Doe, Jane");
    assert_eq!(updated.created, loaded.created);

    backend
        .delete(&tenant, RecordKind::Person, rec.id)
        .await
        .unwrap();
    assert!(
        backend
            .read(&tenant, RecordKind::Person, rec.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_replace_missing_is_not_found() {
    let backend = backend();
    let err = backend
        .replace(&tenant("test"), RecordKind::Group, 99, json!({"name": "Ghost"}))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Resource(ResourceError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_missing_is_not_found() {
    let backend = backend();
    let err = backend
        .delete(&tenant("test"), RecordKind::Group, 99)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Resource(ResourceError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let backend = backend();
    let tenant_a = tenant("aleph");
    let tenant_b = tenant("beth");

    let rec = backend
        .create(&tenant_a, RecordKind::Group, json!({"name": "Secret"}))
        .await
        .unwrap();

    assert!(
        backend
            .read(&tenant_b, RecordKind::Group, rec.id)
            .await
            .unwrap()
            .is_none()
    );

    // Ids mint independently per tenant.
    let other = backend
        .create(&tenant_b, RecordKind::Group, json!({"name": "Parallel"}))
        .await
        .unwrap();
    assert_eq!(other.id, 1);
}

#[tokio::test]
async fn test_search_orders_and_filters() {
    let backend = backend();
    let tenant = tenant("test");

    for name in ["Zebra", "Aardvark", "Mole"] {
        backend
            .create(&tenant, RecordKind::Group, json!({"name": name}))
            .await
            .unwrap();
    }

    let listing = backend
        .search(
            &tenant,
            RecordKind::Group,
            &SearchQuery::first(10),
            &Visibility::All,
        )
        .await
        .unwrap();
    assert_eq!(listing.total, 3);
    let names: Vec<&str> = listing.records.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Aardvark", "Mole", "Zebra"]);

    let filtered = backend
        .search(
            &tenant,
            RecordKind::Group,
            &SearchQuery {
                query: Some("ole".to_string()),
                ..SearchQuery::first(10)
            },
            &Visibility::All,
        )
        .await
        .unwrap();
    assert_eq!(filtered.total, 1);
    assert_eq!(filtered.records[0].name(), "Mole");
}

#[tokio::test]
async fn test_restricted_visibility_hides_private_records() {
    let backend = backend();
    let tenant = tenant("test");

    backend
        .create(
            &tenant,
            RecordKind::Group,
            json!({"name": "Open", "scope": "public"}),
        )
        .await
        .unwrap();
    let hidden = backend
        .create(
            &tenant,
            RecordKind::Group,
            json!({"name": "Hidden", "scope": "private"}),
        )
        .await
        .unwrap();

    let restricted = backend
        .search(
            &tenant,
            RecordKind::Group,
            &SearchQuery::first(10),
            &Visibility::Restricted { group_ids: vec![] },
        )
        .await
        .unwrap();
    assert_eq!(restricted.total, 1);
    assert_eq!(restricted.records[0].name(), "Open");

    // A relation grant makes the private group visible again.
    let granted = backend
        .search(
            &tenant,
            RecordKind::Group,
            &SearchQuery::first(10),
            &Visibility::Restricted {
                group_ids: vec![hidden.id],
            },
        )
        .await
        .unwrap();
    assert_eq!(granted.total, 2);
}

#[tokio::test]
async fn test_membership_counts_and_active_groups() {
    let backend = backend();
    let tenant = tenant("test");

    for (person, group, start, end) in [
        (1, 10, None, None),
        (1, 11, Some("2000-01-01"), Some("2001-01-01")),
        (2, 10, None, None),
    ] {
        let mut body = json!({"person_id": person, "group_id": group});
        if let Some(start) = start {
            body["start_date"] = start.into();
        }
        if let Some(end) = end {
            body["end_date"] = end.into();
        }
        backend
            .create(&tenant, RecordKind::Membership, body)
            .await
            .unwrap();
    }

    let counts = backend
        .membership_counts(&tenant, RelationSide::Group, &[10, 11])
        .await
        .unwrap();
    assert_eq!(counts.get(&10), Some(&2));
    assert_eq!(counts.get(&11), Some(&1));

    // The 2000-2001 membership is long expired.
    let today = chrono::Utc::now().date_naive();
    let active = backend
        .active_membership_groups(&tenant, 1, today)
        .await
        .unwrap();
    assert_eq!(active, vec![10]);
}

#[tokio::test]
async fn test_concurrent_creates_mint_unique_ids() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(SqliteBackend::open(dir.path().join("lectern.db")).unwrap());
    backend.init_schema().unwrap();
    let tenant = tenant("test");

    let mut handles = Vec::new();
    for task in 0..8 {
        let backend = Arc::clone(&backend);
        let tenant = tenant.clone();
        handles.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for i in 0..20 {
                let rec = backend
                    .create(
                        &tenant,
                        RecordKind::Work,
                        json!({"name": format!("w-{task}-{i}")}),
                    )
                    .await
                    .unwrap();
                ids.push(rec.id);
            }
            ids
        }));
    }

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.await.unwrap());
    }
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), 160, "minted ids must be unique");
}
