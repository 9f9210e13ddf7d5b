// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User listing endpoint.

use axum::{extract::State, Json};

use crate::{error::ApiError, state::AppState};

/// List the public key of every stored wallet record.
///
/// Keys come back in store order. No pagination.
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "Public keys of all stored wallets", body = Vec<String>),
        (status = 500, description = "Storage unavailable")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let keys = state.db.list_keys()?;
    tracing::debug!(count = keys.len(), "Listed wallet users");
    Ok(Json(keys))
}
