//! Bulk import and export handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use lectern_persistence::core::Store;

use crate::error::RestError;
use crate::extractors::RequestContext;
use crate::state::AppState;

use super::parse_kind;

/// Body of a bulk import.
#[derive(Debug, Deserialize)]
pub struct ImportBody {
    records: Vec<Value>,
}

/// Query parameters of a bulk export page.
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    cursor: Option<String>,
    limit: Option<usize>,
}

/// `POST /api/v1/{kind}/bulk`
///
/// Upserts the batch atomically: one invalid record aborts the lot.
pub async fn bulk_import<S: Store>(
    State(state): State<AppState<S>>,
    Path(kind): Path<String>,
    RequestContext(ctx): RequestContext,
    Json(body): Json<ImportBody>,
) -> Result<(StatusCode, Json<Value>), RestError> {
    let kind = parse_kind(&kind)?;
    let outcome = state.service().bulk_import(&ctx, kind, body.records).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "ok",
            "inserted": outcome.inserted,
            "updated": outcome.updated,
        })),
    ))
}

/// `GET /api/v1/{kind}/bulk`
///
/// Returns one page of the cursor-ordered export. A null `cursor` in the
/// response marks the terminal page; `remaining` counts records after this
/// page at the time of the call.
pub async fn bulk_export<S: Store>(
    State(state): State<AppState<S>>,
    Path(kind): Path<String>,
    RequestContext(ctx): RequestContext,
    Query(params): Query<ExportParams>,
) -> Result<Json<Value>, RestError> {
    let kind = parse_kind(&kind)?;
    let limit = params
        .limit
        .unwrap_or_else(|| state.default_page_size())
        .clamp(1, state.max_page_size());

    let page = state
        .service()
        .bulk_export(&ctx, kind, params.cursor.as_deref(), limit)
        .await?;

    let records: Vec<Value> = page.records.into_iter().map(|r| r.content).collect();
    Ok(Json(json!({
        "status": "ok",
        "records": records,
        "remaining": page.remaining,
        "limit": page.limit,
        "cursor": page.cursor.map(|c| c.encode()),
    })))
}
