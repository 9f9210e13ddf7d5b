// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Record Models
//!
//! This module defines the stored wallet document and the request/response
//! structures used by the REST API.
//!
//! ## Wallet Records
//!
//! A [`WalletRecord`] is keyed by the wallet's base-58 public key. Besides a
//! few bookkeeping fields it carries an open set of caller-controlled fields
//! (game state, inventory, preferences) that are merged shallowly: a new
//! value for a field name replaces the old one wholesale.
//!
//! ## Items
//!
//! The `items` list holds [`Item`]s identified by `objectId`. Ids are unique
//! within one record; upserting an existing id replaces that item in place.
//!
//! ## Field Bounds
//!
//! Open fields arriving from clients go through [`RecordPatch::from_fields`],
//! which rejects reserved names and enforces the configured size bounds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Open JSON object as received from or returned to clients.
pub type JsonObject = Map<String, Value>;

/// Field names managed by the gateway itself.
///
/// Clients may not write these through open fields; `message` is only set
/// by a successful verification.
pub const RESERVED_FIELDS: [&str; 4] = ["publicKey", "message", "lastVerified", "lastUpdated"];

/// Field name of the item list inside a record.
pub const ITEMS_FIELD: &str = "items";

/// Longest accepted open field name, in bytes.
pub const MAX_FIELD_NAME_LEN: usize = 128;

// =============================================================================
// Stored Documents
// =============================================================================

/// One entry of a wallet's item list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Identity of the item within its record.
    #[serde(rename = "objectId")]
    pub object_id: String,
    /// Opaque item payload.
    #[serde(flatten)]
    pub fields: JsonObject,
}

impl Item {
    /// Build an item from a JSON object carrying a non-empty string `objectId`.
    pub fn from_object(mut object: JsonObject) -> Result<Self, PatchError> {
        match object.remove("objectId") {
            Some(Value::String(object_id)) if !object_id.is_empty() => Ok(Self {
                object_id,
                fields: object,
            }),
            Some(Value::String(_)) | None | Some(Value::Null) => Err(PatchError::MissingObjectId),
            Some(_) => Err(PatchError::InvalidItems(
                "objectId must be a string".to_string(),
            )),
        }
    }
}

/// Timestamp written on every mutation, depending on the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bookkeeping {
    /// Successful signature verification.
    LastVerified,
    /// Save, save-item and delete-item.
    LastUpdated,
}

/// The per-wallet document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    /// Base-58 Ed25519 public key; never changes once the record exists.
    pub public_key: String,
    /// Last message whose signature verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Item>>,
    /// Caller-controlled fields, merged shallowly.
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl WalletRecord {
    /// Create an empty record for `public_key`.
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            message: None,
            last_verified: None,
            last_updated: None,
            items: None,
            extra: JsonObject::new(),
        }
    }

    /// Shallow-merge a patch into the record.
    pub fn apply(&mut self, patch: RecordPatch) {
        if let Some(message) = patch.message {
            self.message = Some(message);
        }
        if let Some(items) = patch.items {
            self.items = Some(items);
        }
        for (key, value) in patch.extra {
            self.extra.insert(key, value);
        }
    }

    pub fn stamp(&mut self, field: Bookkeeping, at: DateTime<Utc>) {
        match field {
            Bookkeeping::LastVerified => self.last_verified = Some(at),
            Bookkeeping::LastUpdated => self.last_updated = Some(at),
        }
    }

    /// Replace the item with the same `objectId`, or append it.
    ///
    /// Returns `true` if an existing item was replaced.
    pub fn upsert_item(&mut self, item: Item) -> bool {
        upsert_by_id(self.items.get_or_insert_with(Vec::new), item)
    }

    /// Drop the item with `object_id`, if present.
    ///
    /// Returns `true` if an item was removed.
    pub fn remove_item(&mut self, object_id: &str) -> bool {
        let Some(items) = self.items.as_mut() else {
            return false;
        };
        let before = items.len();
        items.retain(|item| item.object_id != object_id);
        items.len() != before
    }

    pub fn item(&self, object_id: &str) -> Option<&Item> {
        self.items
            .as_deref()
            .and_then(|items| items.iter().find(|item| item.object_id == object_id))
    }
}

fn upsert_by_id(items: &mut Vec<Item>, item: Item) -> bool {
    match items
        .iter_mut()
        .find(|existing| existing.object_id == item.object_id)
    {
        Some(existing) => {
            *existing = item;
            true
        }
        None => {
            items.push(item);
            false
        }
    }
}

// =============================================================================
// Patches
// =============================================================================

/// Rejected open-field payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("field '{0}' is reserved")]
    ReservedField(String),

    #[error("too many fields: {count} (max {max})")]
    TooManyFields { count: usize, max: usize },

    #[error("invalid field name '{0}'")]
    InvalidFieldName(String),

    #[error("invalid items: {0}")]
    InvalidItems(String),

    #[error("item is missing objectId")]
    MissingObjectId,
}

/// Bounds applied to open fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    pub max_extra_fields: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            max_extra_fields: 64,
        }
    }
}

/// A validated set of field updates for one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub message: Option<String>,
    pub items: Option<Vec<Item>>,
    pub extra: JsonObject,
}

impl RecordPatch {
    /// Validate caller-supplied open fields.
    ///
    /// `items`, when present, must be an array of objects with a string
    /// `objectId`; duplicate ids collapse onto the first position with the
    /// last payload.
    pub fn from_fields(fields: JsonObject, limits: &FieldLimits) -> Result<Self, PatchError> {
        if fields.len() > limits.max_extra_fields {
            return Err(PatchError::TooManyFields {
                count: fields.len(),
                max: limits.max_extra_fields,
            });
        }

        let mut patch = Self::default();
        for (key, value) in fields {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                return Err(PatchError::ReservedField(key));
            }
            if key.is_empty() || key.len() > MAX_FIELD_NAME_LEN {
                return Err(PatchError::InvalidFieldName(key));
            }
            if key == ITEMS_FIELD {
                patch.items = Some(parse_items(value)?);
            } else {
                patch.extra.insert(key, value);
            }
        }
        Ok(patch)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

fn parse_items(value: Value) -> Result<Vec<Item>, PatchError> {
    let Value::Array(values) = value else {
        return Err(PatchError::InvalidItems("items must be an array".to_string()));
    };

    let mut items = Vec::with_capacity(values.len());
    for value in values {
        let Value::Object(object) = value else {
            return Err(PatchError::InvalidItems(
                "every item must be an object".to_string(),
            ));
        };
        upsert_by_id(&mut items, Item::from_object(object)?);
    }
    Ok(items)
}

// =============================================================================
// API Requests
// =============================================================================
//
// Required fields are `Option` so a missing field surfaces as a uniform
// 400 from the handler instead of a deserializer rejection.

/// Request to verify a wallet signature.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// Base-58 Ed25519 public key.
    pub public_key: Option<String>,
    /// Signed message text.
    pub message: Option<String>,
    /// Base-58 detached signature over the UTF-8 message bytes.
    pub signature: Option<String>,
    /// Extra fields merged into the record on success.
    #[schema(value_type = Option<Object>)]
    pub data: Option<JsonObject>,
}

/// Request to save open fields for a wallet.
///
/// Every key besides `publicKey` is an open field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub public_key: Option<String>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub fields: JsonObject,
}

/// Request to upsert one item by `objectId`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveItemRequest {
    pub public_key: Option<String>,
    /// Item payload; must carry a string `objectId`.
    #[schema(value_type = Option<Object>)]
    pub item: Option<JsonObject>,
}

/// Request to load a wallet record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    pub public_key: Option<String>,
}

/// Request to delete one item from a wallet record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemRequest {
    pub public_key: Option<String>,
    pub object_id: Option<String>,
}

// =============================================================================
// API Responses
// =============================================================================

/// Outcome of a signature check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub verified: bool,
}

/// Acknowledgement of a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
