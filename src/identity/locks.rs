// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-identity serialization.
//!
//! Reconciliation (read → prune → write) and minting (check → mint → write)
//! both hold the identity's lock for their whole sequence, so a prune can
//! never interleave with a mint for the same identity. Unrelated identities
//! never contend. Entries are dropped once no task holds or awaits them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::AnonymousIdentity;

#[derive(Default)]
pub struct IdentityLocks {
    entries: Mutex<HashMap<String, LockEntry>>,
}

/// A lock plus the number of tasks holding or waiting on it.
#[derive(Default)]
struct LockEntry {
    lock: Arc<AsyncMutex<()>>,
    users: usize,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `identity`'s state.
    ///
    /// Cancelling the returned future while it waits still releases the
    /// caller's claim on the entry.
    pub async fn acquire(&self, identity: &AnonymousIdentity) -> IdentityGuard<'_> {
        let key = identity.storage_key();
        let lock = {
            let mut entries = self.entries();
            let entry = entries.entry(key.clone()).or_default();
            entry.users += 1;
            entry.lock.clone()
        };
        let claim = Claim { locks: self, key };

        let guard = lock.lock_owned().await;
        IdentityGuard {
            _guard: guard,
            _claim: claim,
        }
    }

    /// Number of identities with a live lock entry.
    pub fn active(&self) -> usize {
        self.entries().len()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, LockEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Exclusive access to one identity's state until dropped.
pub struct IdentityGuard<'a> {
    // Field order matters: the mutex is released before the claim.
    _guard: OwnedMutexGuard<()>,
    _claim: Claim<'a>,
}

/// One task's registration on a lock entry, held while waiting and while locked.
struct Claim<'a> {
    locks: &'a IdentityLocks,
    key: String,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        let mut entries = self.locks.entries();
        if let Some(entry) = entries.get_mut(&self.key) {
            entry.users -= 1;
            if entry.users == 0 {
                entries.remove(&self.key);
            }
        }
    }
}
