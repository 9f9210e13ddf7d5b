// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet Gateway - Signature-Verified Wallet Record Service
//!
//! This crate verifies Ed25519 wallet signatures and keeps a free-form JSON
//! record per wallet public key in an embedded redb database.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `signature` - Base58 decoding and detached Ed25519 verification
//! - `models` - Wallet records, items and request/response types
//! - `storage` - Durable wallet record store (redb)
//! - `config` - Environment configuration

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod signature;
pub mod state;
pub mod storage;
