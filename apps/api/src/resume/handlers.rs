//! Axum route handlers for the resume collections.
//!
//! Every collection shares the same handlers, instantiated per record type
//! in `routes::build_router`. Positions come from the `index` query
//! parameter and are interpreted by the record's addressing scheme.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::records::Record;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub index: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: u64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /resume/{collection}[?index=N]
///
/// Without `index`, returns the whole collection in order.
pub async fn handle_get<R: Record>(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Response, AppError> {
    match query.index {
        Some(token) => {
            let record = state.store.get::<R>(&token).await?;
            Ok(Json(record).into_response())
        }
        None => Ok(Json(state.store.list::<R>().await).into_response()),
    }
}

/// POST /resume/{collection}
pub async fn handle_create<R: Record>(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let payload = parse_payload(&body)?;
    let id = state.store.append::<R>(payload).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /resume/{collection}?index=N
///
/// Replaces the entry at `index`; the stored id becomes `index`.
pub async fn handle_replace<R: Record>(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
    body: Bytes,
) -> Result<Json<R>, AppError> {
    let token = require_index(query)?;
    let payload = parse_payload(&body)?;
    let stored = state.store.replace::<R>(&token, payload).await?;
    Ok(Json(stored))
}

/// DELETE /resume/{collection}?index=N
pub async fn handle_delete<R: Record>(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let token = require_index(query)?;
    state.store.delete::<R>(&token).await?;
    Ok(Json(MessageResponse {
        message: "Successfully deleted".to_string(),
    }))
}

fn require_index(query: IndexQuery) -> Result<String, AppError> {
    query
        .index
        .ok_or_else(|| AppError::InvalidArgument("Index not provided".to_string()))
}

/// Body must be a non-empty JSON object, for PUT as well as POST. An empty
/// object never reaches the store, so it cannot blank out a record.
fn parse_payload(body: &Bytes) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        _ => Err(AppError::Validation("No data provided".to_string())),
    }
}
