// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Record Storage
//!
//! Persistent storage for wallet records using an embedded redb database.
//! The database file lives at `WALLET_DB_PATH` and is opened once at startup.
//!
//! ## Storage Layout
//!
//! ```text
//! wallet_records
//!   {public_key} -> {"publicKey": ..., "message": ..., "lastVerified": ...,
//!                    "lastUpdated": ..., "items": [...], ...open fields}
//! ```

pub mod wallet_db;

pub use wallet_db::{WalletDatabase, WalletDbError, WalletDbResult};
