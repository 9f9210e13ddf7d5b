// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet record endpoints.
//!
//! These endpoints save, load and edit the per-wallet document. They take
//! the caller-supplied public key as the record identity and do not require
//! a signature; `/verify` is the only signature check.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};

use super::required;
use crate::{
    error::ApiError,
    models::{
        Bookkeeping, DeleteItemRequest, Item, LoadRequest, RecordPatch, SaveItemRequest,
        SaveRequest, SuccessResponse,
    },
    state::AppState,
};

/// Record returned by `/load` for a key that has never been seen.
pub fn empty_record() -> Value {
    json!({ "items": [] })
}

/// Save open fields for a wallet.
///
/// Every top-level key besides `publicKey` is merged into the record,
/// replacing any previous value for that key. An `items` array replaces the
/// whole item list.
#[utoipa::path(
    post,
    path = "/save",
    tag = "Records",
    responses(
        (status = 200, description = "Fields saved", body = SuccessResponse),
        (status = 400, description = "Missing publicKey, reserved or oversized fields"),
        (status = 500, description = "Storage unavailable")
    )
)]
pub async fn save(
    State(state): State<AppState>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    let Some(public_key) = required(request.public_key) else {
        return Err(ApiError::missing_fields().with_details("publicKey"));
    };

    let patch = RecordPatch::from_fields(request.fields, &state.field_limits)?;
    let field_count = patch.extra.len() + usize::from(patch.items.is_some());
    state
        .db
        .upsert_fields(&public_key, patch, Bookkeeping::LastUpdated)?;

    tracing::debug!(public_key = %public_key, fields = field_count, "Wallet record saved");
    Ok(Json(SuccessResponse::ok()))
}

/// Insert or replace one item by `objectId`.
#[utoipa::path(
    post,
    path = "/save-item",
    request_body = SaveItemRequest,
    tag = "Records",
    responses(
        (status = 200, description = "Item saved", body = SuccessResponse),
        (status = 400, description = "Missing publicKey or objectId"),
        (status = 500, description = "Storage unavailable")
    )
)]
pub async fn save_item(
    State(state): State<AppState>,
    payload: Result<Json<SaveItemRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    let (Some(public_key), Some(item)) = (required(request.public_key), request.item) else {
        return Err(ApiError::missing_fields());
    };

    let item = Item::from_object(item)?;
    state.db.upsert_item(&public_key, item)?;

    Ok(Json(SuccessResponse::ok()))
}

/// Load the stored record for a wallet.
///
/// Unknown keys return `{"items": []}` rather than an error.
#[utoipa::path(
    post,
    path = "/load",
    request_body = LoadRequest,
    tag = "Records",
    responses(
        (status = 200, description = "Stored wallet record, or {\"items\": []} if none"),
        (status = 400, description = "Missing publicKey"),
        (status = 500, description = "Storage unavailable")
    )
)]
pub async fn load(
    State(state): State<AppState>,
    payload: Result<Json<LoadRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let Some(public_key) = required(request.public_key) else {
        return Err(ApiError::missing_fields().with_details("publicKey"));
    };

    let Some(record) = state.db.get(&public_key)? else {
        return Ok(Json(empty_record()));
    };

    let body = serde_json::to_value(record)
        .map_err(|e| ApiError::internal("Failed to encode record").with_details(e.to_string()))?;
    Ok(Json(body))
}

/// Remove one item from a wallet's item list.
///
/// Removing an unknown `objectId` is a successful no-op; a missing record
/// is a 404.
#[utoipa::path(
    post,
    path = "/delete",
    request_body = DeleteItemRequest,
    tag = "Records",
    responses(
        (status = 200, description = "Item removed (or was not present)", body = SuccessResponse),
        (status = 400, description = "Missing publicKey or objectId"),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Storage unavailable")
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    payload: Result<Json<DeleteItemRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    let (Some(public_key), Some(object_id)) =
        (required(request.public_key), required(request.object_id))
    else {
        return Err(ApiError::missing_fields());
    };

    state.db.delete_item(&public_key, &object_id)?;
    Ok(Json(SuccessResponse::ok()))
}
