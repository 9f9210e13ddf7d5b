// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded wallet record database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `wallet_records`: base-58 public key → serialized WalletRecord (JSON bytes)
//!
//! Every mutation is a single write transaction that reads the current
//! document, merges, and writes it back. redb admits one writer at a time,
//! so concurrent item upserts on the same key cannot lose each other.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::models::{Bookkeeping, Item, RecordPatch, WalletRecord};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: public key → serialized WalletRecord (JSON bytes).
const WALLET_RECORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("wallet_records");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WalletDbError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

impl WalletDbError {
    /// Whether this is a missing record rather than a storage failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WalletDbError::NotFound(_))
    }
}

pub type WalletDbResult<T> = Result<T, WalletDbError>;

// =============================================================================
// WalletDatabase
// =============================================================================

/// Persistent wallet record collection.
pub struct WalletDatabase {
    db: Database,
}

impl WalletDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> WalletDbResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(WALLET_RECORDS)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Wallet database opened");
        Ok(Self { db })
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Create the record if absent, shallow-merge `patch`, stamp `bookkeeping`.
    pub fn upsert_fields(
        &self,
        public_key: &str,
        patch: RecordPatch,
        bookkeeping: Bookkeeping,
    ) -> WalletDbResult<WalletRecord> {
        self.mutate(public_key, true, |record| {
            record.apply(patch);
            record.stamp(bookkeeping, Utc::now());
        })
    }

    /// Replace the item with the same `objectId` or append it.
    pub fn upsert_item(&self, public_key: &str, item: Item) -> WalletDbResult<WalletRecord> {
        self.mutate(public_key, true, |record| {
            let object_id = item.object_id.clone();
            let replaced = record.upsert_item(item);
            record.stamp(Bookkeeping::LastUpdated, Utc::now());
            tracing::debug!(public_key, object_id = %object_id, replaced, "Item upserted");
        })
    }

    /// Remove the item with `object_id`.
    ///
    /// Fails with `NotFound` if no record exists for `public_key`; removing an
    /// id that is not in the list still succeeds.
    pub fn delete_item(&self, public_key: &str, object_id: &str) -> WalletDbResult<WalletRecord> {
        self.mutate(public_key, false, |record| {
            let removed = record.remove_item(object_id);
            record.stamp(Bookkeeping::LastUpdated, Utc::now());
            tracing::debug!(public_key, object_id, removed, "Item delete applied");
        })
    }

    /// Look up a single record.
    pub fn get(&self, public_key: &str) -> WalletDbResult<Option<WalletRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLET_RECORDS)?;
        let record = match table.get(public_key)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(record)
    }

    /// Every stored public key, in key order.
    pub fn list_keys(&self) -> WalletDbResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLET_RECORDS)?;

        let mut keys = Vec::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }

    /// Confirm the table can be opened for reading.
    pub fn check(&self) -> WalletDbResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(WALLET_RECORDS)?;
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Read-modify-write one record inside a single write transaction.
    fn mutate<F>(&self, public_key: &str, create: bool, change: F) -> WalletDbResult<WalletRecord>
    where
        F: FnOnce(&mut WalletRecord),
    {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut table = write_txn.open_table(WALLET_RECORDS)?;

            // Read existing value and deserialize before mutating
            let existing: Option<WalletRecord> = match table.get(public_key)? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };

            let mut record = match existing {
                Some(record) => record,
                None if create => WalletRecord::new(public_key),
                None => return Err(WalletDbError::NotFound(format!("Wallet {public_key}"))),
            };
            change(&mut record);

            let json = serde_json::to_vec(&record)?;
            table.insert(public_key, json.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{FieldLimits, JsonObject};
    use serde_json::{json, Value};

    fn temp_db() -> (WalletDatabase, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = WalletDatabase::open(&dir.path().join("wallets.redb")).unwrap();
        (db, dir)
    }

    fn patch(value: Value) -> RecordPatch {
        let Value::Object(fields) = value else {
            panic!("patch must be an object");
        };
        RecordPatch::from_fields(fields, &FieldLimits::default()).unwrap()
    }

    fn item(value: Value) -> Item {
        let Value::Object(object) = value else {
            panic!("item must be an object");
        };
        Item::from_object(object).unwrap()
    }

    #[test]
    fn upsert_fields_creates_then_merges() {
        let (db, _dir) = temp_db();

        let created = db
            .upsert_fields("pk1", patch(json!({ "gold": 1, "level": 2 })), Bookkeeping::LastUpdated)
            .unwrap();
        assert!(created.last_updated.is_some());
        assert!(created.last_verified.is_none());

        db.upsert_fields("pk1", patch(json!({ "gold": 9 })), Bookkeeping::LastUpdated)
            .unwrap();

        let record = db.get("pk1").unwrap().unwrap();
        assert_eq!(record.public_key, "pk1");
        assert_eq!(record.extra["gold"], json!(9));
        assert_eq!(record.extra["level"], json!(2));
        assert_eq!(db.list_keys().unwrap(), vec!["pk1".to_string()]);
    }

    #[test]
    fn verify_bookkeeping_sets_message_and_timestamp() {
        let (db, _dir) = temp_db();

        db.upsert_fields(
            "pk1",
            RecordPatch::default().with_message("hello"),
            Bookkeeping::LastVerified,
        )
        .unwrap();

        let record = db.get("pk1").unwrap().unwrap();
        assert_eq!(record.message.as_deref(), Some("hello"));
        assert!(record.last_verified.is_some());
        assert!(record.last_updated.is_none());
    }

    #[test]
    fn repeated_save_is_idempotent_apart_from_timestamp() {
        let (db, _dir) = temp_db();
        let payload = json!({ "items": [{ "objectId": "a", "v": 1 }], "base": { "x": 1 } });

        let mut first = db
            .upsert_fields("pk1", patch(payload.clone()), Bookkeeping::LastUpdated)
            .unwrap();
        let mut second = db
            .upsert_fields("pk1", patch(payload), Bookkeeping::LastUpdated)
            .unwrap();

        first.last_updated = None;
        second.last_updated = None;
        assert_eq!(first, second);
    }

    #[test]
    fn upsert_item_replaces_by_object_id() {
        let (db, _dir) = temp_db();

        db.upsert_item("pk1", item(json!({ "objectId": "sword1", "durability": 10 })))
            .unwrap();
        db.upsert_item("pk1", item(json!({ "objectId": "shield", "durability": 3 })))
            .unwrap();
        db.upsert_item("pk1", item(json!({ "objectId": "sword1", "durability": 5 })))
            .unwrap();

        let record = db.get("pk1").unwrap().unwrap();
        let items = record.items.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].object_id, "sword1");
        assert_eq!(items[0].fields["durability"], json!(5));
        assert_eq!(items[1].object_id, "shield");
    }

    #[test]
    fn upsert_item_keeps_other_fields() {
        let (db, _dir) = temp_db();
        db.upsert_fields("pk1", patch(json!({ "gold": 3 })), Bookkeeping::LastUpdated)
            .unwrap();

        db.upsert_item("pk1", item(json!({ "objectId": "a" }))).unwrap();

        let record = db.get("pk1").unwrap().unwrap();
        assert_eq!(record.extra["gold"], json!(3));
        assert_eq!(record.items.unwrap().len(), 1);
    }

    #[test]
    fn delete_item_requires_record() {
        let (db, _dir) = temp_db();
        let err = db.delete_item("missing", "a").unwrap_err();
        assert!(err.is_not_found());
        assert!(db.get("missing").unwrap().is_none());
    }

    #[test]
    fn delete_item_filters_list_and_ignores_unknown_ids() {
        let (db, _dir) = temp_db();
        db.upsert_item("pk1", item(json!({ "objectId": "a" }))).unwrap();
        db.upsert_item("pk1", item(json!({ "objectId": "b" }))).unwrap();

        let record = db.delete_item("pk1", "nope").unwrap();
        assert_eq!(record.items.as_ref().unwrap().len(), 2);

        let record = db.delete_item("pk1", "a").unwrap();
        let ids: Vec<_> = record
            .items
            .unwrap()
            .into_iter()
            .map(|item| item.object_id)
            .collect();
        assert_eq!(ids, vec!["b".to_string()]);
    }

    #[test]
    fn delete_item_on_record_without_items_succeeds() {
        let (db, _dir) = temp_db();
        db.upsert_fields("pk1", patch(json!({ "gold": 1 })), Bookkeeping::LastUpdated)
            .unwrap();

        let record = db.delete_item("pk1", "a").unwrap();
        assert!(record.items.is_none());
    }

    #[test]
    fn get_missing_record_is_none() {
        let (db, _dir) = temp_db();
        assert!(db.get("nobody").unwrap().is_none());
        assert!(db.list_keys().unwrap().is_empty());
        db.check().unwrap();
    }

    #[test]
    fn list_keys_returns_every_record() {
        let (db, _dir) = temp_db();
        for key in ["pkC", "pkA", "pkB"] {
            db.upsert_fields(key, RecordPatch::default(), Bookkeeping::LastUpdated)
                .unwrap();
        }
        // upserting again never duplicates
        db.upsert_fields("pkA", RecordPatch::default(), Bookkeeping::LastUpdated)
            .unwrap();

        let mut keys = db.list_keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["pkA", "pkB", "pkC"]);
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wallets.redb");
        {
            let db = WalletDatabase::open(&path).unwrap();
            db.upsert_item("pk1", item(json!({ "objectId": "a", "v": 1 })))
                .unwrap();
        }

        let db = WalletDatabase::open(&path).unwrap();
        let record = db.get("pk1").unwrap().unwrap();
        assert_eq!(record.item("a").unwrap().fields["v"], json!(1));
    }

    #[test]
    fn concurrent_item_upserts_are_not_lost() {
        let (db, _dir) = temp_db();
        let db = Arc::new(db);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = Arc::clone(&db);
                std::thread::spawn(move || {
                    let mut object = JsonObject::new();
                    object.insert("objectId".into(), json!(format!("item-{i}")));
                    db.upsert_item("pk1", Item::from_object(object).unwrap())
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let record = db.get("pk1").unwrap().unwrap();
        assert_eq!(record.items.unwrap().len(), 8);
    }
}
