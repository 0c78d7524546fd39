//! Route configuration.

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use lectern_persistence::core::Store;

use crate::handlers;
use crate::state::AppState;

/// Creates all REST API routes.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /api/v1/client` - Client configuration view
/// - `POST /api/v1/auth/login` - Login, returns a session token
///
/// ## Records (bearer token required)
/// - `GET /api/v1/{kind}/records` - List
/// - `GET /api/v1/{kind}/search` - List (alias)
/// - `POST /api/v1/{kind}/records` - Create
/// - `GET /api/v1/{kind}/records/{id}` - Read
/// - `PUT /api/v1/{kind}/records/{id}` - Update (partial)
/// - `DELETE /api/v1/{kind}/records/{id}` - Delete
///
/// ## Bulk and identifiers (bearer token required)
/// - `POST /api/v1/{kind}/bulk` - Atomic batch upsert
/// - `GET /api/v1/{kind}/bulk` - Cursor-paged export
/// - `GET /api/v1/{kind}/ids` - Sequence state
/// - `POST /api/v1/{kind}/ids` - Mint one id
/// - `PUT /api/v1/{kind}/ids` - Move the sequence forward
pub fn create_routes<S: Store>(state: AppState<S>) -> Router {
    Router::new()
        // Public routes
        .route("/health", get(handlers::health::health::<S>))
        .route("/api/v1/client", get(handlers::client::client_config::<S>))
        .route("/api/v1/auth/login", post(handlers::login::login::<S>))
        // Record routes
        .route(
            "/api/v1/{kind}/records",
            get(handlers::records::list_records::<S>),
        )
        .route(
            "/api/v1/{kind}/records",
            post(handlers::records::create_record::<S>),
        )
        .route(
            "/api/v1/{kind}/search",
            get(handlers::records::list_records::<S>),
        )
        .route(
            "/api/v1/{kind}/records/{id}",
            get(handlers::records::get_record::<S>),
        )
        .route(
            "/api/v1/{kind}/records/{id}",
            put(handlers::records::update_record::<S>),
        )
        .route(
            "/api/v1/{kind}/records/{id}",
            delete(handlers::records::delete_record::<S>),
        )
        // Bulk routes
        .route("/api/v1/{kind}/bulk", post(handlers::bulk::bulk_import::<S>))
        .route("/api/v1/{kind}/bulk", get(handlers::bulk::bulk_export::<S>))
        // Identifier sequence routes
        .route("/api/v1/{kind}/ids", get(handlers::ids::get_sequence::<S>))
        .route("/api/v1/{kind}/ids", post(handlers::ids::mint_id::<S>))
        .route("/api/v1/{kind}/ids", put(handlers::ids::set_next_id::<S>))
        // State
        .with_state(state)
}
