//! Client configuration handler.
//!
//! Exports the tenant's display settings, vocabularies, and the available
//! user group levels. The view is public: user interfaces need it to render
//! the login screen before any session exists.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::{Value, json};

use lectern_persistence::auth::Role;
use lectern_persistence::core::Store;

use crate::error::RestError;
use crate::extractors::resolve_tenant;
use crate::state::AppState;

/// `GET /api/v1/client`
///
/// The view is cached per tenant; registering new settings through
/// [`AppState::register_tenant`](crate::state::AppState::register_tenant)
/// invalidates it.
pub async fn client_config<S: Store>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<Value>, RestError> {
    let (tenant_id, settings) = resolve_tenant(&headers, &state)?;

    let cache_key = format!("client:{tenant_id}");
    if let Some(cached) = state.cache().get(&cache_key) {
        if let Ok(view) = serde_json::from_str::<Value>(&cached) {
            return Ok(Json(view));
        }
    }

    let user_groups: Vec<Value> = Role::ALL
        .iter()
        .map(|role| json!({"id": role.level(), "label": role.as_str()}))
        .collect();

    let view = json!({
        "status": "ok",
        "repository": {
            "title": settings.title,
            "theme": settings.theme,
        },
        "vocabularies": settings.vocabularies,
        "user_groups": user_groups,
    });

    if let Ok(serialized) = serde_json::to_string(&view) {
        state.cache().set(&cache_key, serialized);
    }
    Ok(Json(view))
}
