// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory user store for tests and local development.
//!
//! Nothing is persisted across restarts. Write counting and write failure
//! injection make the reconciliation and mint paths observable in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use chrono::Utc;

use super::record::{self, UserField, UserPatch, UserRecord};
use super::{AuditEvent, StoreError, StoreResult, UserStore};
use crate::identity::AnonymousIdentity;

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
    audit_log: RwLock<Vec<AuditEvent>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    closed: AtomicBool,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful record writes (upserts and field removals).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent record write fail with [`StoreError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    fn check_writable(&self) -> StoreResult<()> {
        self.check_open()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl UserStore for InMemoryUserStore {
    fn find_one(&self, identity: &AnonymousIdentity) -> StoreResult<Option<UserRecord>> {
        self.check_open()?;
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        Ok(users.get(&identity.storage_key()).cloned())
    }

    fn upsert(&self, identity: &AnonymousIdentity, patch: UserPatch) -> StoreResult<UserRecord> {
        self.check_writable()?;
        let now = Utc::now();
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        let record = users
            .entry(identity.storage_key())
            .or_insert_with(|| UserRecord::new(now));
        patch.apply(record, now);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(record.clone())
    }

    fn remove_field(&self, identity: &AnonymousIdentity, field: UserField) -> StoreResult<()> {
        self.check_writable()?;
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        if let Some(record) = users.get_mut(&identity.storage_key()) {
            record::remove_field(record, field, Utc::now());
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn log_event(&self, event: &AuditEvent) -> StoreResult<()> {
        self.check_open()?;
        let mut log = self.audit_log.write().unwrap_or_else(|e| e.into_inner());
        log.push(event.clone());
        Ok(())
    }

    fn recent_events(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        self.check_open()?;
        let log = self.audit_log.read().unwrap_or_else(|e| e.into_inner());
        Ok(log.iter().rev().take(limit).cloned().collect())
    }

    fn health_check(&self) -> StoreResult<()> {
        self.check_open()
    }

    fn close(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::AuditEventType;

    fn identity() -> AnonymousIdentity {
        AnonymousIdentity::parse(&"Q".repeat(43)).unwrap()
    }

    #[test]
    fn upsert_counts_writes() {
        let store = InMemoryUserStore::new();
        assert_eq!(store.write_count(), 0);

        store.upsert(&identity(), UserPatch::default()).unwrap();
        store.upsert(&identity(), UserPatch::default()).unwrap();
        assert_eq!(store.write_count(), 2);
        assert!(store.find_one(&identity()).unwrap().is_some());
    }

    #[test]
    fn failed_writes_leave_state_untouched() {
        let store = InMemoryUserStore::new();
        store.set_fail_writes(true);

        let err = store
            .upsert(
                &identity(),
                UserPatch {
                    goal_story: Some("nope".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.find_one(&identity()).unwrap().is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn remove_field_on_missing_record_is_noop() {
        let store = InMemoryUserStore::new();
        store.remove_field(&identity(), UserField::WalletAddress).unwrap();
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn recent_events_newest_first() {
        let store = InMemoryUserStore::new();
        store.log_event(&AuditEvent::new(AuditEventType::DataSaved)).unwrap();
        store.log_event(&AuditEvent::new(AuditEventType::WalletUnlinked)).unwrap();

        let events = store.recent_events(5).unwrap();
        assert_eq!(events[0].event_type, AuditEventType::WalletUnlinked);
    }

    #[test]
    fn closed_store_fails_closed() {
        let store = InMemoryUserStore::new();
        store.close().unwrap();
        assert!(matches!(store.health_check(), Err(StoreError::Closed)));
        assert!(matches!(store.find_one(&identity()), Err(StoreError::Closed)));
    }
}
