//! # lectern-rest - Scholarly metadata repository REST API
//!
//! This crate exposes the Lectern repository over HTTP: record CRUD and
//! listings, bulk import/export, identifier sequences, login, and the
//! public client configuration view.
//!
//! ## API Endpoints
//!
//! | Operation | HTTP Method | URL Pattern |
//! |-----------|-------------|-------------|
//! | list | GET | `/api/v1/[kind]/records` |
//! | list (alias) | GET | `/api/v1/[kind]/search` |
//! | create | POST | `/api/v1/[kind]/records` |
//! | read | GET | `/api/v1/[kind]/records/[id]` |
//! | update | PUT | `/api/v1/[kind]/records/[id]` |
//! | delete | DELETE | `/api/v1/[kind]/records/[id]` |
//! | bulk import | POST | `/api/v1/[kind]/bulk` |
//! | bulk export | GET | `/api/v1/[kind]/bulk` |
//! | sequence state | GET | `/api/v1/[kind]/ids` |
//! | mint id | POST | `/api/v1/[kind]/ids` |
//! | set next id | PUT | `/api/v1/[kind]/ids` |
//! | login | POST | `/api/v1/auth/login` |
//! | client config | GET | `/api/v1/client` |
//! | health | GET | `/health` |
//!
//! `kind` is one of `group`, `person`, `work`, `membership`, `user`.
//!
//! ## HTTP Headers
//!
//! - `Authorization: Bearer <token>` - Session token from the login endpoint
//! - `X-Tenant-ID` - Tenant selection; absent means the default tenant
//!
//! ## Error Handling
//!
//! Every error response carries the same body shape:
//!
//! ```json
//! {"status": "error", "errors": [{"name": "...", "location": "...", "description": "..."}]}
//! ```
//!
//! | HTTP Status | Description |
//! |-------------|-------------|
//! | 400 | Malformed field or validation failure |
//! | 401 | Missing, invalid, or expired token |
//! | 403 | The principal may not perform the operation |
//! | 404 | Unknown record kind or id |
//! | 500 | Internal server error |
//!
//! ## Architecture
//!
//! - [`error`] - HTTP error mapping and the error body shape
//! - [`config`] - Server configuration
//! - [`auth`] - Session tokens and credential verification
//! - [`tenant`] - Tenant registry
//! - [`state`] - Application state
//! - [`extractors`] - Axum extractors (request context, pagination)
//! - [`handlers`] - HTTP request handlers
//! - [`routing`] - Route configuration

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routing;
pub mod state;
pub mod tenant;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::RestError;
pub use state::AppState;
pub use tenant::TenantRegistry;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use lectern_persistence::RecordService;
use lectern_persistence::core::Store;
use lectern_persistence::services::ServiceRegistry;
use lectern_persistence::tenant::TenantId;

use crate::auth::TokenService;

/// Creates the Axum application with custom configuration.
///
/// Wires the storage backend, the capability registry, the token service,
/// and the tenant registry into a complete router. Fails when the
/// configuration is unusable: a missing or short signing secret, an
/// unresolvable capability URI, or a malformed default tenant id.
///
/// # Example
///
/// ```rust,ignore
/// use lectern_rest::{ServerConfig, create_app_with_config};
/// use lectern_persistence::backends::sqlite::SqliteBackend;
///
/// let backend = SqliteBackend::in_memory()?;
/// let config = ServerConfig::for_testing();
/// let app = create_app_with_config(backend, config)?;
/// ```
pub fn create_app_with_config<S: Store>(
    storage: S,
    config: ServerConfig,
) -> anyhow::Result<Router> {
    info!(backend = storage.backend_name(), "creating REST API server");

    let registry = ServiceRegistry::with_defaults();
    let cache = registry
        .resolve_cache(&config.cache_uri)
        .with_context(|| format!("resolving cache capability {}", config.cache_uri))?;
    let audit = registry
        .resolve_audit(&config.audit_uri)
        .with_context(|| format!("resolving audit capability {}", config.audit_uri))?;

    let secret = config
        .jwt_secret
        .as_deref()
        .context("LECTERN_JWT_SECRET is required")?;
    let tokens = TokenService::new(secret, config.token_ttl).context("creating token service")?;

    let default_tenant = TenantId::new(&config.default_tenant)
        .map_err(|e| anyhow::anyhow!("invalid default tenant: {e}"))?;
    let tenants = Arc::new(TenantRegistry::new(default_tenant));

    let service = Arc::new(RecordService::new(Arc::new(storage), audit));
    let state = AppState::new(service, tenants, Arc::new(tokens), cache, config.clone());

    Ok(build_router(state, &config))
}

/// Creates the router from already-constructed state.
///
/// Used by tests that need to pre-register tenants or hold a handle on the
/// token service before the router takes ownership of the state.
pub fn build_router<S: Store>(state: AppState<S>, config: &ServerConfig) -> Router {
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "lectern={level},lectern_rest={level},lectern_persistence={level},tower_http=debug"
            ))
        });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
