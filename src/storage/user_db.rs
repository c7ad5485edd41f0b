// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded user document database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: identity storage key → serialized UserRecord (JSON bytes)
//! - `audit_events`: `timestamp|event_id` → serialized AuditEvent (JSON bytes)

use std::path::Path;
use std::sync::RwLock;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use tracing::{debug, info};

use super::record::{self, UserField, UserPatch, UserRecord};
use super::{AuditEvent, StoreError, StoreResult, UserStore};
use crate::identity::AnonymousIdentity;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: identity storage key → serialized UserRecord (JSON bytes).
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Audit log: sortable event key → serialized AuditEvent (JSON bytes).
const AUDIT_EVENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("audit_events");

// =============================================================================
// RedbUserStore
// =============================================================================

/// User store on an embedded redb database.
///
/// Opened explicitly with [`RedbUserStore::open`] and released with
/// [`UserStore::close`].
pub struct RedbUserStore {
    db: RwLock<Option<Database>>,
}

impl RedbUserStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(format!("cannot create data dir: {e}")))?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(AUDIT_EVENTS)?;
        }
        write_txn.commit()?;

        info!(path = %path.display(), "User database opened");
        Ok(Self {
            db: RwLock::new(Some(db)),
        })
    }

    fn with_db<T>(&self, f: impl FnOnce(&Database) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self.db.read().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(db) => f(db),
            None => Err(StoreError::Closed),
        }
    }
}

impl UserStore for RedbUserStore {
    fn find_one(&self, identity: &AnonymousIdentity) -> StoreResult<Option<UserRecord>> {
        let key = identity.storage_key();
        self.with_db(|db| {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(USERS)?;
            match table.get(key.as_str())? {
                Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
                None => Ok(None),
            }
        })
    }

    fn upsert(&self, identity: &AnonymousIdentity, patch: UserPatch) -> StoreResult<UserRecord> {
        let key = identity.storage_key();
        self.with_db(|db| {
            let now = Utc::now();
            let write_txn = db.begin_write()?;
            let record = {
                let mut table = write_txn.open_table(USERS)?;

                // Read existing value and deserialize before mutating
                let existing_bytes = table.get(key.as_str())?.map(|v| v.value().to_vec());
                let mut record = match existing_bytes {
                    Some(bytes) => serde_json::from_slice(&bytes)?,
                    None => UserRecord::new(now),
                };

                patch.apply(&mut record, now);
                let json = serde_json::to_vec(&record)?;
                table.insert(key.as_str(), json.as_slice())?;
                record
            };
            write_txn.commit()?;

            debug!(identity = %identity.fingerprint(), "User record upserted");
            Ok(record)
        })
    }

    fn remove_field(&self, identity: &AnonymousIdentity, field: UserField) -> StoreResult<()> {
        let key = identity.storage_key();
        self.with_db(|db| {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(USERS)?;
                let existing_bytes = table.get(key.as_str())?.map(|v| v.value().to_vec());

                if let Some(bytes) = existing_bytes {
                    let mut record: UserRecord = serde_json::from_slice(&bytes)?;
                    record::remove_field(&mut record, field, Utc::now());
                    let json = serde_json::to_vec(&record)?;
                    table.insert(key.as_str(), json.as_slice())?;
                }
            }
            write_txn.commit()?;

            debug!(
                identity = %identity.fingerprint(),
                field = field.name(),
                "User record field removed"
            );
            Ok(())
        })
    }

    fn log_event(&self, event: &AuditEvent) -> StoreResult<()> {
        let key = event.storage_key();
        let json = serde_json::to_vec(event)?;
        self.with_db(|db| {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(AUDIT_EVENTS)?;
                table.insert(key.as_str(), json.as_slice())?;
            }
            write_txn.commit()?;
            Ok(())
        })
    }

    fn recent_events(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        self.with_db(|db| {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(AUDIT_EVENTS)?;

            let mut events = Vec::with_capacity(limit);
            for entry in table.iter()?.rev().take(limit) {
                let (_, value) = entry?;
                events.push(serde_json::from_slice(value.value())?);
            }
            Ok(events)
        })
    }

    fn health_check(&self) -> StoreResult<()> {
        self.with_db(|db| {
            let read_txn = db.begin_read()?;
            let _ = read_txn.open_table(USERS)?;
            Ok(())
        })
    }

    fn close(&self) -> StoreResult<()> {
        let mut guard = self.db.write().unwrap_or_else(|e| e.into_inner());
        if guard.take().is_some() {
            info!("User database closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::AchievementId;
    use crate::models::{ActivityEntry, ActivityLog};
    use crate::storage::AuditEventType;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn setup() -> (TempDir, RedbUserStore) {
        let temp = TempDir::new().unwrap();
        let store = RedbUserStore::open(&temp.path().join("users.redb")).unwrap();
        (temp, store)
    }

    fn identity(seed: char) -> AnonymousIdentity {
        AnonymousIdentity::parse(&format!("{}A", seed.to_string().repeat(42))).unwrap()
    }

    #[test]
    fn missing_record_is_none() {
        let (_temp, store) = setup();
        assert!(store.find_one(&identity('A')).unwrap().is_none());
    }

    #[test]
    fn upsert_creates_then_merges() {
        let (_temp, store) = setup();
        let id = identity('A');

        let mut activity = ActivityLog::new();
        activity.insert("2024-01-01".into(), vec![ActivityEntry::default()]);
        let created = store
            .upsert(
                &id,
                UserPatch {
                    activity: Some(activity.clone()),
                    goal_story: Some("get strong".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(created.goal_story, "get strong");

        store
            .upsert(
                &id,
                UserPatch {
                    achievements_minted: Some(BTreeSet::from([AchievementId::FirstActivity])),
                    ..Default::default()
                },
            )
            .unwrap();

        let loaded = store.find_one(&id).unwrap().unwrap();
        assert_eq!(loaded.activity, activity);
        assert_eq!(loaded.goal_story, "get strong");
        assert_eq!(
            loaded.achievements_minted,
            Some(BTreeSet::from([AchievementId::FirstActivity]))
        );
        assert_eq!(loaded.created_at, created.created_at);
        assert!(loaded.updated_at >= created.updated_at);
    }

    #[test]
    fn records_are_isolated_per_identity() {
        let (_temp, store) = setup();
        store
            .upsert(
                &identity('A'),
                UserPatch {
                    wallet_address: Some("wallet-a".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(store.find_one(&identity('B')).unwrap().is_none());
    }

    #[test]
    fn remove_field_clears_wallet() {
        let (_temp, store) = setup();
        let id = identity('A');
        store
            .upsert(
                &id,
                UserPatch {
                    wallet_address: Some("wallet".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        store.remove_field(&id, UserField::WalletAddress).unwrap();
        assert!(store.find_one(&id).unwrap().unwrap().wallet_address.is_none());

        // No record: nothing to do, no record created
        store.remove_field(&identity('B'), UserField::WalletAddress).unwrap();
        assert!(store.find_one(&identity('B')).unwrap().is_none());
    }

    #[test]
    fn audit_events_come_back_newest_first() {
        let (_temp, store) = setup();
        let first = AuditEvent::new(AuditEventType::DataSaved);
        let mut second = AuditEvent::new(AuditEventType::WalletLinked);
        second.timestamp = first.timestamp + chrono::Duration::milliseconds(5);

        store.log_event(&first).unwrap();
        store.log_event(&second).unwrap();

        let events = store.recent_events(10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, AuditEventType::WalletLinked);
        assert_eq!(events[1].event_type, AuditEventType::DataSaved);

        assert_eq!(store.recent_events(1).unwrap().len(), 1);
    }

    #[test]
    fn data_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("users.redb");
        let id = identity('C');
        {
            let store = RedbUserStore::open(&path).unwrap();
            store
                .upsert(
                    &id,
                    UserPatch {
                        goal_story: Some("persist me".into()),
                        ..Default::default()
                    },
                )
                .unwrap();
            store.close().unwrap();
        }

        let reopened = RedbUserStore::open(&path).unwrap();
        assert_eq!(reopened.find_one(&id).unwrap().unwrap().goal_story, "persist me");
    }

    #[test]
    fn closed_store_rejects_operations() {
        let (_temp, store) = setup();
        store.health_check().unwrap();
        store.close().unwrap();

        assert!(matches!(store.find_one(&identity('A')), Err(StoreError::Closed)));
        assert!(matches!(store.health_check(), Err(StoreError::Closed)));
    }
}
