//! Login, client configuration, and health endpoint tests.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use lectern_persistence::auth::Role;

use common::{AUTHORIZATION, Harness, X_TENANT_ID, first_error};

async fn seed_user(harness: &Harness, userid: &str, password: &str, level: u8) {
    let admin = harness.token_for(Role::Admin);
    harness
        .post(
            "/api/v1/user/records",
            &admin,
            json!({
                "userid": userid,
                "credentials": password,
                "user_group": level,
            }),
        )
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_login_issues_a_working_token() {
    let harness = Harness::new();
    seed_user(&harness, "rincewind", "luggage42", 60).await;

    let response = harness
        .server
        .post("/api/v1/auth/login")
        .add_header(X_TENANT_ID, harness.tenant_header())
        .json(&json!({"user": "rincewind", "password": "luggage42"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    let token = body["token"].as_str().unwrap().to_string();

    // The session carries editor rights (level 60).
    harness
        .post(
            "/api/v1/group/records",
            &token,
            json!({"international_name": "New Group", "type": "organisation"}),
        )
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_401() {
    let harness = Harness::new();
    seed_user(&harness, "rincewind", "luggage42", 60).await;

    let response = harness
        .server
        .post("/api/v1/auth/login")
        .add_header(X_TENANT_ID, harness.tenant_header())
        .json(&json!({"user": "rincewind", "password": "wrong"}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_unknown_user_is_401() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/api/v1/auth/login")
        .add_header(X_TENANT_ID, harness.tenant_header())
        .json(&json!({"user": "nobody", "password": "whatever"}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_client_config_is_public() {
    let harness = Harness::new();

    let response = harness
        .server
        .get("/api/v1/client")
        .add_header(X_TENANT_ID, harness.tenant_header())
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["repository"]["title"], "Lectern Repository");
    assert!(body["vocabularies"]["group_type"].is_array());

    let user_groups = body["user_groups"].as_array().unwrap();
    assert_eq!(user_groups.len(), 5);
    assert_eq!(user_groups[0], json!({"id": 10, "label": "viewer"}));
    assert_eq!(user_groups[4], json!({"id": 100, "label": "admin"}));
}

#[tokio::test]
async fn test_settings_change_invalidates_the_cached_client_view() {
    use lectern_persistence::tenant::{TenantId, TenantSettings};

    let harness = Harness::new();

    // Prime the cache.
    let body: Value = harness
        .server
        .get("/api/v1/client")
        .add_header(X_TENANT_ID, harness.tenant_header())
        .await
        .json();
    assert_eq!(body["repository"]["title"], "Lectern Repository");

    let tenant = TenantId::new(&harness.config.default_tenant).unwrap();
    harness
        .state
        .register_tenant(tenant, TenantSettings::new("Renamed Repository"));

    let body: Value = harness
        .server
        .get("/api/v1/client")
        .add_header(X_TENANT_ID, harness.tenant_header())
        .await
        .json();
    assert_eq!(body["repository"]["title"], "Renamed Repository");
}

#[tokio::test]
async fn test_unknown_tenant_is_rejected() {
    let harness = Harness::new();
    let token = harness.token_for(Role::Viewer);

    let response = harness
        .server
        .get("/api/v1/group/records")
        .add_header(X_TENANT_ID, axum::http::HeaderValue::from_static("no-such-tenant"))
        .add_header(AUTHORIZATION, common::bearer(&token))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(first_error(&body)["location"], "header");
}

#[tokio::test]
async fn test_missing_tenant_header_uses_the_default() {
    let harness = Harness::new();
    let token = harness.token_for(Role::Viewer);

    let response = harness
        .server
        .get("/api/v1/group/records")
        .add_header(AUTHORIZATION, common::bearer(&token))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_health_needs_no_credentials() {
    let harness = Harness::new();

    let response = harness.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "sqlite");
}
