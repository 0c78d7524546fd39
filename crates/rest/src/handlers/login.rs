//! Login handler.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};

use lectern_persistence::core::Store;

use crate::auth::verify_credentials;
use crate::error::RestError;
use crate::extractors::resolve_tenant;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    user: String,
    password: String,
}

/// `POST /api/v1/auth/login`
///
/// Verifies the credentials and issues a session token carrying the
/// principal tokens computed at this moment. Unknown users and wrong
/// passwords are indistinguishable in the response.
pub async fn login<S: Store>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, RestError> {
    let (tenant_id, _settings) = resolve_tenant(&headers, &state)?;

    let user = state
        .service()
        .find_user(&tenant_id, &body.user)
        .await?
        .ok_or_else(|| RestError::unauthorized("invalid credentials"))?;

    let stored = user.field("credentials").unwrap_or_default();
    if !verify_credentials(&body.password, stored) {
        return Err(RestError::unauthorized("invalid credentials"));
    }

    let principal = state.service().assemble_principal(&tenant_id, &user).await?;
    let token = state.tokens().issue(&principal)?;

    tracing::info!(user = %principal.userid, tenant = %tenant_id, "login");
    Ok(Json(json!({"status": "ok", "token": token})))
}
