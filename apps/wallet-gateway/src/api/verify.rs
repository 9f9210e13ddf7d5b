// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet signature verification endpoint.
//!
//! A valid signature upserts the wallet record with the signed message, a
//! fresh `lastVerified` timestamp and any extra `data` fields. An invalid
//! signature is reported as `{"verified": false}` and changes nothing.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::required;
use crate::{
    error::ApiError,
    models::{Bookkeeping, RecordPatch, VerifyRequest, VerifyResponse},
    signature,
    state::AppState,
};

/// Verify a detached Ed25519 signature and record the verification.
#[utoipa::path(
    post,
    path = "/verify",
    request_body = VerifyRequest,
    tag = "Verify",
    responses(
        (status = 200, description = "Verification result", body = VerifyResponse),
        (status = 400, description = "Missing fields or invalid data"),
        (status = 500, description = "Undecodable key or signature, or storage unavailable")
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let Json(request) = payload?;

    let (Some(public_key), Some(message), Some(signature)) = (
        required(request.public_key),
        required(request.message),
        required(request.signature),
    ) else {
        return Err(ApiError::missing_fields());
    };

    if !signature::verify_detached(&public_key, &message, &signature)? {
        tracing::info!(public_key = %public_key, "Wallet signature rejected");
        return Ok(Json(VerifyResponse { verified: false }));
    }

    let patch = RecordPatch::from_fields(request.data.unwrap_or_default(), &state.field_limits)?
        .with_message(message);
    state
        .db
        .upsert_fields(&public_key, patch, Bookkeeping::LastVerified)?;

    tracing::info!(public_key = %public_key, "Wallet verified");
    Ok(Json(VerifyResponse { verified: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::test_support::{off_curve_key_b58, public_key_b58, sign_b58, wallet};
    use crate::state::test_support::temp_state;
    use axum::http::StatusCode;
    use serde_json::json;

    fn request(pk: &str, message: &str, signature: &str) -> VerifyRequest {
        VerifyRequest {
            public_key: Some(pk.to_string()),
            message: Some(message.to_string()),
            signature: Some(signature.to_string()),
            data: None,
        }
    }

    #[tokio::test]
    async fn valid_signature_upserts_record_with_data() {
        let (state, _dir) = temp_state();
        let key = wallet(1);
        let pk = public_key_b58(&key);

        let mut req = request(&pk, "login", &sign_b58(&key, "login"));
        let serde_json::Value::Object(data) = json!({ "nickname": "ada" }) else {
            unreachable!()
        };
        req.data = Some(data);

        let Json(response) = verify(State(state.clone()), Ok(Json(req)))
            .await
            .expect("verify succeeds");
        assert!(response.verified);

        let record = state.db.get(&pk).unwrap().expect("record created");
        assert_eq!(record.message.as_deref(), Some("login"));
        assert_eq!(record.extra["nickname"], json!("ada"));
        assert!(record.last_verified.is_some());
    }

    #[tokio::test]
    async fn invalid_signature_leaves_store_untouched() {
        let (state, _dir) = temp_state();
        let key = wallet(1);
        let pk = public_key_b58(&key);

        let Json(response) = verify(
            State(state.clone()),
            Ok(Json(request(&pk, "login", &sign_b58(&key, "logout")))),
        )
        .await
        .expect("verify succeeds");

        assert!(!response.verified);
        assert!(state.db.get(&pk).unwrap().is_none());
    }

    #[tokio::test]
    async fn reserved_data_field_is_rejected() {
        let (state, _dir) = temp_state();
        let key = wallet(1);
        let pk = public_key_b58(&key);

        let mut req = request(&pk, "login", &sign_b58(&key, "login"));
        let serde_json::Value::Object(data) = json!({ "publicKey": "someone-else" }) else {
            unreachable!()
        };
        req.data = Some(data);

        let err = verify(State(state.clone()), Ok(Json(req)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(state.db.get(&pk).unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_message_counts_as_missing() {
        let (state, _dir) = temp_state();
        let key = wallet(1);
        let pk = public_key_b58(&key);

        let err = verify(State(state), Ok(Json(request(&pk, "", &sign_b58(&key, "")))))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing required fields");
    }

    #[tokio::test]
    async fn wrong_length_signature_is_server_error() {
        let (state, _dir) = temp_state();
        let pk = public_key_b58(&wallet(1));
        let short_sig = bs58::encode([9u8; 10]).into_string();

        let err = verify(State(state), Ok(Json(request(&pk, "login", &short_sig))))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Malformed signature");
    }

    #[tokio::test]
    async fn off_curve_key_reports_unverified() {
        let (state, _dir) = temp_state();
        let pk = off_curve_key_b58();

        let Json(response) = verify(
            State(state.clone()),
            Ok(Json(request(&pk, "login", &sign_b58(&wallet(1), "login")))),
        )
        .await
        .expect("verify succeeds");

        assert!(!response.verified);
        assert!(state.db.get(&pk).unwrap().is_none());
    }
}
