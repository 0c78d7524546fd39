//! Health check handler.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use lectern_persistence::core::Store;

use crate::error::RestError;
use crate::state::AppState;

/// `GET /health`
///
/// Round-trips the storage backend. No tenant, no authentication: load
/// balancers call this.
pub async fn health<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<Value>, RestError> {
    let storage = state.service().storage();
    storage.ping().await?;
    Ok(Json(json!({
        "status": "ok",
        "backend": storage.backend_name(),
    })))
}
