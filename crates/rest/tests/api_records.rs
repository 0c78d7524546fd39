//! Record CRUD endpoint tests.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use lectern_persistence::auth::{Principal, PrincipalToken, Role};

use common::{Harness, first_error};

#[tokio::test]
async fn test_create_group_mints_an_id() {
    let harness = Harness::new();
    let token = harness.token_for(Role::Editor);

    let response = harness
        .post(
            "/api/v1/group/records",
            &token,
            json!({"international_name": "Unseen University", "type": "organisation"}),
        )
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["id"], 1);
    assert_eq!(body["international_name"], "Unseen University");
    assert_eq!(body["scope"], "public");
}

#[tokio::test]
async fn test_invalid_group_type_is_a_validation_error() {
    let harness = Harness::new();
    let token = harness.token_for(Role::Editor);

    let response = harness
        .post(
            "/api/v1/group/records",
            &token,
            json!({"international_name": "X", "type": "foobar"}),
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
    let error = first_error(&body);
    assert_eq!(error["name"], "type");
    assert_eq!(error["location"], "body");
    assert!(
        error["description"]
            .as_str()
            .unwrap()
            .starts_with("\"foobar\" is not one of"),
        "unexpected description: {}",
        error["description"]
    );
}

#[tokio::test]
async fn test_unknown_kind_is_404() {
    let harness = Harness::new();
    let token = harness.token_for(Role::Editor);

    let response = harness.get("/api/v1/widget/records", &token).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_token_is_401() {
    let harness = Harness::new();

    let response = harness
        .server
        .get("/api/v1/group/records")
        .add_header(common::X_TENANT_ID, harness.tenant_header())
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(first_error(&body)["name"], "authorization");
}

#[tokio::test]
async fn test_viewer_may_not_create() {
    let harness = Harness::new();
    let token = harness.token_for(Role::Viewer);

    let response = harness
        .post(
            "/api/v1/group/records",
            &token,
            json!({"international_name": "X", "type": "organisation"}),
        )
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_partial_update_preserves_omitted_fields() {
    let harness = Harness::new();
    let token = harness.token_for(Role::Editor);

    let created: Value = harness
        .post(
            "/api/v1/group/records",
            &token,
            json!({
                "international_name": "Library",
                "type": "institute",
                "accounts": [{"type": "email", "value": "ook@uu.example"}],
            }),
        )
        .await
        .json();
    let id = created["id"].as_i64().unwrap();

    // Omitting accounts keeps them.
    let updated: Value = harness
        .put(
            &format!("/api/v1/group/records/{id}"),
            &token,
            json!({"international_name": "Great Library"}),
        )
        .await
        .json();
    assert_eq!(updated["international_name"], "Great Library");
    assert_eq!(updated["accounts"][0]["value"], "ook@uu.example");

    // An explicit empty list clears them.
    let cleared: Value = harness
        .put(
            &format!("/api/v1/group/records/{id}"),
            &token,
            json!({"accounts": []}),
        )
        .await
        .json();
    assert_eq!(cleared["accounts"], json!([]));
}

#[tokio::test]
async fn test_non_object_update_body_is_400() {
    let harness = Harness::new();
    let token = harness.token_for(Role::Editor);

    let created: Value = harness
        .post(
            "/api/v1/group/records",
            &token,
            json!({"international_name": "Solid", "type": "organisation"}),
        )
        .await
        .json();
    let id = created["id"].as_i64().unwrap();

    let response = harness
        .put(
            &format!("/api/v1/group/records/{id}"),
            &token,
            json!(["not", "an", "object"]),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(first_error(&body)["location"], "body");
}

#[tokio::test]
async fn test_group_owner_may_edit_but_not_delete() {
    let harness = Harness::new();
    let editor = harness.token_for(Role::Editor);

    let created: Value = harness
        .post(
            "/api/v1/group/records",
            &editor,
            json!({"international_name": "Owned Dept", "type": "department"}),
        )
        .await
        .json();
    let id = created["id"].as_i64().unwrap();

    let owner = harness.token_for_principal(&Principal::new(
        "owner-user",
        vec![
            PrincipalToken::Role(Role::Owner),
            PrincipalToken::GroupOwner(id),
        ],
    ));

    let response = harness
        .put(
            &format!("/api/v1/group/records/{id}"),
            &owner,
            json!({"international_name": "Owned Department"}),
        )
        .await;
    response.assert_status_ok();

    let response = harness
        .delete(&format!("/api/v1/group/records/{id}"), &owner)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_requires_manager_and_removes_the_record() {
    let harness = Harness::new();
    let editor = harness.token_for(Role::Editor);
    let manager = harness.token_for(Role::Manager);

    let created: Value = harness
        .post(
            "/api/v1/group/records",
            &editor,
            json!({"international_name": "Doomed", "type": "organisation"}),
        )
        .await
        .json();
    let id = created["id"].as_i64().unwrap();

    harness
        .delete(&format!("/api/v1/group/records/{id}"), &editor)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    harness
        .delete(&format!("/api/v1/group/records/{id}"), &manager)
        .await
        .assert_status_ok();

    harness
        .get(&format!("/api/v1/group/records/{id}"), &manager)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_and_snippets() {
    let harness = Harness::new();
    let token = harness.token_for(Role::Editor);

    for name in ["Botany", "Alchemy"] {
        harness
            .post(
                "/api/v1/group/records",
                &token,
                json!({"international_name": name, "type": "department"}),
            )
            .await
            .assert_status(StatusCode::CREATED);
    }

    let body: Value = harness.get("/api/v1/group/records", &token).await.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["total"], 2);
    // Listings come back in name order.
    assert_eq!(body["records"][0]["international_name"], "Alchemy");

    let body: Value = harness
        .get("/api/v1/group/records?format=snippet", &token)
        .await
        .json();
    // The compact projection comes back under its own key.
    assert!(body.get("records").is_none());
    let snippet = &body["snippets"][0];
    assert_eq!(snippet["name"], "Alchemy");
    assert_eq!(snippet["type"], "department");
    assert_eq!(snippet["members"], 0);
}

#[tokio::test]
async fn test_search_route_aliases_listing() {
    let harness = Harness::new();
    let token = harness.token_for(Role::Editor);

    for name in ["Post-Mortem Communications", "Applied Astrology"] {
        harness
            .post(
                "/api/v1/group/records",
                &token,
                json!({"international_name": name, "type": "department"}),
            )
            .await
            .assert_status(StatusCode::CREATED);
    }

    let body: Value = harness
        .get("/api/v1/group/search?query=Astrology", &token)
        .await
        .json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["records"][0]["international_name"], "Applied Astrology");

    let body: Value = harness
        .get("/api/v1/group/search?format=snippet", &token)
        .await
        .json();
    assert_eq!(body["snippets"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_group_snippet_counts_members() {
    let harness = Harness::new();
    let token = harness.token_for(Role::Editor);

    let group: Value = harness
        .post(
            "/api/v1/group/records",
            &token,
            json!({"international_name": "High Energy Magic", "type": "institute"}),
        )
        .await
        .json();
    let person: Value = harness
        .post(
            "/api/v1/person/records",
            &token,
            json!({"family_name": "Stibbons", "given_name": "Ponder"}),
        )
        .await
        .json();
    harness
        .post(
            "/api/v1/membership/records",
            &token,
            json!({"person_id": person["id"], "group_id": group["id"]}),
        )
        .await
        .assert_status(StatusCode::CREATED);

    let body: Value = harness
        .get("/api/v1/group/records?format=snippet", &token)
        .await
        .json();
    assert_eq!(body["snippets"][0]["members"], 1);

    let body: Value = harness
        .get("/api/v1/person/records?format=snippet", &token)
        .await
        .json();
    assert_eq!(body["snippets"][0]["memberships"], 1);
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    use lectern_persistence::tenant::{TenantId, TenantSettings};

    let harness = Harness::new();
    let token = harness.token_for(Role::Editor);

    let created: Value = harness
        .post(
            "/api/v1/group/records",
            &token,
            json!({"international_name": "Local Only", "type": "organisation"}),
        )
        .await
        .json();
    let id = created["id"].as_i64().unwrap();

    harness.state.register_tenant(
        TenantId::new("other-tenant").unwrap(),
        TenantSettings::new("Other Repository"),
    );

    // The same id does not exist in the other tenant's partition.
    let response = harness
        .server
        .get(&format!("/api/v1/group/records/{id}"))
        .add_header(
            common::X_TENANT_ID,
            axum::http::HeaderValue::from_static("other-tenant"),
        )
        .add_header(common::AUTHORIZATION, common::bearer(&token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_private_records_hidden_without_a_relation() {
    let harness = Harness::new();
    let editor = harness.token_for(Role::Editor);

    let created: Value = harness
        .post(
            "/api/v1/group/records",
            &editor,
            json!({
                "international_name": "Inner Circle",
                "type": "institute",
                "scope": "private",
            }),
        )
        .await
        .json();
    let id = created["id"].as_i64().unwrap();

    let viewer = harness.token_for(Role::Viewer);
    harness
        .get(&format!("/api/v1/group/records/{id}"), &viewer)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    let listing: Value = harness.get("/api/v1/group/records", &viewer).await.json();
    assert_eq!(listing["total"], 0);

    let member = harness.token_for_principal(&Principal::new(
        "member-user",
        vec![
            PrincipalToken::Role(Role::Viewer),
            PrincipalToken::GroupMember(id),
        ],
    ));
    harness
        .get(&format!("/api/v1/group/records/{id}"), &member)
        .await
        .assert_status_ok();
    let listing: Value = harness.get("/api/v1/group/records", &member).await.json();
    assert_eq!(listing["total"], 1);
}
