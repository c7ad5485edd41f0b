// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # User Storage Module
//!
//! Persistence for per-identity user documents, behind the [`UserStore`]
//! trait so that handlers receive an explicitly constructed store instead of
//! reaching for a global connection.
//!
//! ## Backends
//!
//! - [`RedbUserStore`]: embedded ACID database (redb), one JSON document per
//!   identity plus an append-only audit table. Used in production.
//! - [`InMemoryUserStore`]: process-local maps for tests and local runs.
//!
//! ## Keying
//!
//! Records are keyed by [`AnonymousIdentity::storage_key`], a SHA-256 digest
//! of the cookie token. The raw token never reaches disk.
//!
//! ## Semantics
//!
//! - `upsert` merges the named fields, stamps `updatedAt`, and creates the
//!   record when absent. There is no separate existence check.
//! - `remove_field` is a no-op for identities without a record.

use thiserror::Error;

use crate::identity::AnonymousIdentity;

pub mod audit;
pub mod memory;
pub mod record;
pub mod user_db;

pub use audit::{AuditEvent, AuditEventType};
pub use memory::InMemoryUserStore;
pub use record::{MintRecord, UserField, UserPatch, UserRecord};
pub use user_db::RedbUserStore;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
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

    /// The store was closed (or never opened).
    #[error("store is closed")]
    Closed,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Store Trait
// =============================================================================

/// Document store for user records, keyed by anonymous identity.
pub trait UserStore: Send + Sync {
    /// Load the record for `identity`, if one exists.
    fn find_one(&self, identity: &AnonymousIdentity) -> StoreResult<Option<UserRecord>>;

    /// Merge `patch` into the identity's record, creating it when absent.
    fn upsert(&self, identity: &AnonymousIdentity, patch: UserPatch) -> StoreResult<UserRecord>;

    /// Remove a single field from the identity's record.
    fn remove_field(&self, identity: &AnonymousIdentity, field: UserField) -> StoreResult<()>;

    /// Append an audit event.
    fn log_event(&self, event: &AuditEvent) -> StoreResult<()>;

    /// Most recent audit events, newest first.
    fn recent_events(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    /// Verify the backend is reachable.
    fn health_check(&self) -> StoreResult<()>;

    /// Release the backend. Later calls fail with [`StoreError::Closed`].
    fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}
