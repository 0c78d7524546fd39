//! Record CRUD and listing handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use lectern_persistence::core::Store;
use lectern_persistence::types::SearchQuery;

use crate::error::RestError;
use crate::extractors::{Pagination, RequestContext};
use crate::state::AppState;

use super::parse_kind;

/// Listing parameters beyond pagination.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Substring match against record names.
    query: Option<String>,
    /// Restrict to records under this parent group.
    filter_parent: Option<i64>,
    /// `snippet` for the compact projection, otherwise full records.
    format: Option<String>,
}

/// `GET /api/v1/{kind}/records`, also served as `GET /api/v1/{kind}/search`.
pub async fn list_records<S: Store>(
    State(state): State<AppState<S>>,
    Path(kind): Path<String>,
    RequestContext(ctx): RequestContext,
    pagination: Pagination,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, RestError> {
    let kind = parse_kind(&kind)?;
    let query = SearchQuery {
        query: params.query.filter(|q| !q.is_empty()),
        filter_parent: params.filter_parent,
        offset: pagination.offset(),
        limit: pagination.limit().min(state.max_page_size()),
    };

    let listing = state.service().search(&ctx, kind, &query).await?;
    let mut body = json!({
        "status": "ok",
        "total": listing.total,
        "offset": query.offset,
        "limit": query.limit,
    });
    // The projection selects the response key: full records under
    // `records`, the compact projection under `snippets`.
    if params.format.as_deref() == Some("snippet") {
        let snippets = state.service().snippets(&ctx, kind, &listing.records).await?;
        body["snippets"] = Value::from(snippets);
    } else {
        let records: Vec<Value> = listing.records.into_iter().map(|r| r.content).collect();
        body["records"] = Value::from(records);
    }
    Ok(Json(body))
}

/// `GET /api/v1/{kind}/records/{id}`
pub async fn get_record<S: Store>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    RequestContext(ctx): RequestContext,
) -> Result<Json<Value>, RestError> {
    let kind = parse_kind(&kind)?;
    let record = state.service().read(&ctx, kind, id).await?;
    Ok(Json(record.content))
}

/// `POST /api/v1/{kind}/records`
pub async fn create_record<S: Store>(
    State(state): State<AppState<S>>,
    Path(kind): Path<String>,
    RequestContext(ctx): RequestContext,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), RestError> {
    let kind = parse_kind(&kind)?;
    let record = state.service().create(&ctx, kind, body).await?;
    Ok((StatusCode::CREATED, Json(record.content)))
}

/// `PUT /api/v1/{kind}/records/{id}`
///
/// Partial update: keys absent from the body keep their stored value.
pub async fn update_record<S: Store>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    RequestContext(ctx): RequestContext,
    Json(body): Json<Value>,
) -> Result<Json<Value>, RestError> {
    let kind = parse_kind(&kind)?;
    let record = state.service().update(&ctx, kind, id, body).await?;
    Ok(Json(record.content))
}

/// `DELETE /api/v1/{kind}/records/{id}`
pub async fn delete_record<S: Store>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(String, i64)>,
    RequestContext(ctx): RequestContext,
) -> Result<Json<Value>, RestError> {
    let kind = parse_kind(&kind)?;
    state.service().delete(&ctx, kind, id).await?;
    Ok(Json(json!({"status": "ok"})))
}
