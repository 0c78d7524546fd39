//! Request context extractor: tenant plus authenticated principal.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use lectern_persistence::core::Store;
use lectern_persistence::tenant::{TenantContext, TenantId, TenantSettings};

use crate::error::RestError;
use crate::state::AppState;

/// Header selecting the tenant partition.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Extracts the [`TenantContext`] for a protected route.
///
/// Resolves the tenant from the `X-Tenant-ID` header (falling back to the
/// configured default tenant) and the principal from the bearer token.
/// Requests without a valid token are rejected with 401 before any handler
/// code runs.
pub struct RequestContext(pub TenantContext);

/// Resolves the tenant id and settings from the request headers.
///
/// Shared with the public routes (login, client config) that need a tenant
/// but no principal.
pub fn resolve_tenant<S: Store>(
    headers: &HeaderMap,
    state: &AppState<S>,
) -> Result<(TenantId, Arc<TenantSettings>), RestError> {
    let tenant_id = match headers.get(TENANT_HEADER) {
        Some(raw) => {
            let raw = raw
                .to_str()
                .map_err(|_| RestError::bad_request(TENANT_HEADER, "header", "invalid header"))?;
            TenantId::new(raw).map_err(|e| {
                RestError::bad_request(TENANT_HEADER, "header", e.to_string())
            })?
        }
        None => state.tenants().default_tenant().clone(),
    };

    let settings = state.tenants().get(&tenant_id).ok_or_else(|| {
        RestError::bad_request(
            TENANT_HEADER,
            "header",
            format!("unknown tenant: {tenant_id}"),
        )
    })?;
    Ok((tenant_id, settings))
}

impl<S: Store> FromRequestParts<AppState<S>> for RequestContext {
    type Rejection = RestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let (tenant_id, settings) = resolve_tenant(&parts.headers, state)?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| RestError::unauthorized("missing bearer token"))?;
        let principal = state.tokens().verify(token)?;

        Ok(RequestContext(TenantContext::new(
            tenant_id, principal, settings,
        )))
    }
}
