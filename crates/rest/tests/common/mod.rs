//! Shared harness for REST API tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestResponse, TestServer};
use serde_json::Value;

use lectern_persistence::RecordService;
use lectern_persistence::auth::{Principal, Role};
use lectern_persistence::backends::sqlite::SqliteBackend;
use lectern_persistence::services::ServiceRegistry;
use lectern_persistence::tenant::TenantId;
use lectern_rest::auth::TokenService;
use lectern_rest::{AppState, ServerConfig, TenantRegistry, build_router};

pub const X_TENANT_ID: HeaderName = HeaderName::from_static("x-tenant-id");
pub const AUTHORIZATION: HeaderName = HeaderName::from_static("authorization");

/// A running test server plus the token service used to mint sessions.
pub struct Harness {
    pub server: TestServer,
    pub tokens: Arc<TokenService>,
    pub config: ServerConfig,
    pub state: AppState<SqliteBackend>,
}

impl Harness {
    /// Spins up the API over a fresh in-memory database.
    pub fn new() -> Self {
        let config = ServerConfig::for_testing();

        let backend = SqliteBackend::in_memory().expect("create backend");
        backend.init_schema().expect("init schema");

        let registry = ServiceRegistry::with_defaults();
        let cache = registry.resolve_cache(&config.cache_uri).expect("cache");
        let audit = registry.resolve_audit(&config.audit_uri).expect("audit");

        let secret = config.jwt_secret.as_deref().expect("test secret");
        let tokens = Arc::new(TokenService::new(secret, config.token_ttl).expect("tokens"));

        let tenant = TenantId::new(&config.default_tenant).expect("tenant id");
        let tenants = Arc::new(TenantRegistry::new(tenant));

        let service = Arc::new(RecordService::new(Arc::new(backend), audit));
        let state = AppState::new(
            service,
            tenants,
            Arc::clone(&tokens),
            cache,
            config.clone(),
        );

        let server =
            TestServer::new(build_router(state.clone(), &config)).expect("test server");
        Self {
            server,
            tokens,
            config,
            state,
        }
    }

    /// Issues a session token for a single-role test user.
    pub fn token_for(&self, role: Role) -> String {
        self.token_for_principal(&Principal::with_role("test-user", role))
    }

    /// Issues a session token for an arbitrary principal.
    pub fn token_for_principal(&self, principal: &Principal) -> String {
        self.tokens.issue(principal).expect("issue token")
    }

    pub async fn get(&self, path: &str, token: &str) -> TestResponse {
        self.server
            .get(path)
            .add_header(X_TENANT_ID, self.tenant_header())
            .add_header(AUTHORIZATION, bearer(token))
            .await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> TestResponse {
        self.server
            .post(path)
            .add_header(X_TENANT_ID, self.tenant_header())
            .add_header(AUTHORIZATION, bearer(token))
            .json(&body)
            .await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> TestResponse {
        self.server
            .put(path)
            .add_header(X_TENANT_ID, self.tenant_header())
            .add_header(AUTHORIZATION, bearer(token))
            .json(&body)
            .await
    }

    pub async fn delete(&self, path: &str, token: &str) -> TestResponse {
        self.server
            .delete(path)
            .add_header(X_TENANT_ID, self.tenant_header())
            .add_header(AUTHORIZATION, bearer(token))
            .await
    }

    /// Header value for the default test tenant.
    pub fn tenant_header(&self) -> HeaderValue {
        HeaderValue::from_str(&self.config.default_tenant).expect("tenant header")
    }
}

/// Formats a bearer `Authorization` header value.
pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).expect("bearer header")
}

/// First error detail of an error response body.
pub fn first_error(body: &Value) -> &Value {
    &body["errors"][0]
}
