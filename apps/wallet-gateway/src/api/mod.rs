// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        DeleteItemRequest, LoadRequest, SaveItemRequest, SuccessResponse, VerifyRequest,
        VerifyResponse,
    },
    state::AppState,
};

pub mod health;
pub mod records;
pub mod users;
pub mod verify;

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    let routes = Router::new()
        .route("/verify", post(verify::verify))
        .route("/save", post(records::save))
        .route("/save-item", post(records::save_item))
        .route("/load", post(records::load))
        .route("/delete", post(records::delete_item))
        .route("/users", get(users::list_users))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Treat absent, `null` and empty strings alike as a missing field.
pub(crate) fn required(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        verify::verify,
        records::save,
        records::save_item,
        records::load,
        records::delete_item,
        users::list_users,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            VerifyRequest,
            SaveItemRequest,
            LoadRequest,
            DeleteItemRequest,
            VerifyResponse,
            SuccessResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Verify", description = "Wallet signature verification"),
        (name = "Records", description = "Per-wallet record storage"),
        (name = "Users", description = "Known wallet enumeration"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
