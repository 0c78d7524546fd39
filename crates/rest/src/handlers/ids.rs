//! Identifier sequence handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use lectern_persistence::core::Store;
use lectern_persistence::sequence::IdSequence;

use crate::error::RestError;
use crate::extractors::RequestContext;
use crate::state::AppState;

use super::parse_kind;

/// Body of an administrative sequence reset.
#[derive(Debug, Deserialize)]
pub struct SetNextBody {
    next_id: Option<i64>,
}

/// `GET /api/v1/{kind}/ids`
///
/// Reads the sequence state without minting.
pub async fn get_sequence<S: Store>(
    State(state): State<AppState<S>>,
    Path(kind): Path<String>,
    RequestContext(ctx): RequestContext,
) -> Result<Json<IdSequence>, RestError> {
    let kind = parse_kind(&kind)?;
    let sequence = state.service().sequence(&ctx, kind).await?;
    Ok(Json(sequence))
}

/// `POST /api/v1/{kind}/ids`
///
/// Mints one id and returns the state after minting; the minted id is the
/// returned `highest_observed_id`.
pub async fn mint_id<S: Store>(
    State(state): State<AppState<S>>,
    Path(kind): Path<String>,
    RequestContext(ctx): RequestContext,
) -> Result<(StatusCode, Json<IdSequence>), RestError> {
    let kind = parse_kind(&kind)?;
    let sequence = state.service().mint_id(&ctx, kind).await?;
    Ok((StatusCode::CREATED, Json(sequence)))
}

/// `PUT /api/v1/{kind}/ids`
///
/// Moves the sequence forward. Moving it at or below the high-water mark
/// is refused, because that could re-issue an existing id.
pub async fn set_next_id<S: Store>(
    State(state): State<AppState<S>>,
    Path(kind): Path<String>,
    RequestContext(ctx): RequestContext,
    Json(body): Json<SetNextBody>,
) -> Result<Json<IdSequence>, RestError> {
    let kind = parse_kind(&kind)?;
    let next_id = body
        .next_id
        .ok_or_else(|| RestError::bad_request("next_id", "body", "next_id is required"))?;
    let sequence = state.service().set_next_id(&ctx, kind, next_id).await?;
    Ok(Json(sequence))
}
