// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Earned/minted reconciliation.
//!
//! Split in two phases so the decision can be tested without storage:
//!
//! 1. [`compute_derived`] is pure and yields the view served to the client.
//! 2. [`reconcile`] compares that view with what is stored and returns a
//!    [`WriteIntent`] only when persisted state has to change.
//!
//! [`refresh`] wires both phases to a [`UserStore`]. Callers hold the
//! identity's lock around it.

use std::collections::BTreeSet;

use serde_json::json;
use tracing::info;

use super::{compute, AchievementId};
use crate::audit_log;
use crate::identity::AnonymousIdentity;
use crate::models::GoalTargets;
use crate::storage::{AuditEvent, AuditEventType, StoreResult, UserPatch, UserRecord, UserStore};

/// Earned and minted sets as they should be presented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedView {
    pub earned: BTreeSet<AchievementId>,
    /// Always a subset of `earned`.
    pub minted: BTreeSet<AchievementId>,
}

/// Why a reconciliation wants to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteReason {
    /// A snapshot field was never recorded.
    Backfill,
    /// Minted entries no longer earned were dropped.
    Pruned { removed: BTreeSet<AchievementId> },
}

/// Fields a reconciliation wants persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteIntent {
    pub achievements_earned: BTreeSet<AchievementId>,
    pub achievements_minted: BTreeSet<AchievementId>,
    pub reason: WriteReason,
}

impl From<WriteIntent> for UserPatch {
    fn from(intent: WriteIntent) -> Self {
        UserPatch {
            achievements_earned: Some(intent.achievements_earned),
            achievements_minted: Some(intent.achievements_minted),
            ..Default::default()
        }
    }
}

/// Recompute earned achievements and intersect the stored minted set.
pub fn compute_derived(record: &UserRecord) -> DerivedView {
    let goals = GoalTargets::from_goals(record.goals.as_ref());
    let earned = compute(&record.diet, &record.activity, &goals);
    let minted = record
        .achievements_minted
        .as_ref()
        .map(|stored| stored.intersection(&earned).copied().collect())
        .unwrap_or_default();

    DerivedView { earned, minted }
}

/// Decide whether `view` must be written back.
///
/// A newly earned achievement alone does not trigger a write; the snapshot
/// is refreshed by the next write that happens anyway.
pub fn reconcile(record: &UserRecord, view: &DerivedView) -> Option<WriteIntent> {
    let removed: BTreeSet<AchievementId> = record
        .achievements_minted
        .iter()
        .flatten()
        .filter(|id| !view.minted.contains(*id))
        .copied()
        .collect();

    let reason = if !removed.is_empty() {
        WriteReason::Pruned { removed }
    } else if record.achievements_earned.is_none() || record.achievements_minted.is_none() {
        WriteReason::Backfill
    } else {
        return None;
    };

    Some(WriteIntent {
        achievements_earned: view.earned.clone(),
        achievements_minted: view.minted.clone(),
        reason,
    })
}

/// Load, reconcile and persist the identity's achievement state.
///
/// Returns the stored record (after any write) and the derived view. An
/// identity without a record gets an empty view and nothing is written.
/// A failed write fails the whole call.
pub fn refresh(
    store: &dyn UserStore,
    identity: &AnonymousIdentity,
) -> StoreResult<(Option<UserRecord>, DerivedView)> {
    let Some(record) = store.find_one(identity)? else {
        return Ok((None, DerivedView::default()));
    };

    let view = compute_derived(&record);
    let Some(intent) = reconcile(&record, &view) else {
        return Ok((Some(record), view));
    };

    let removed: Vec<&'static str> = match &intent.reason {
        WriteReason::Pruned { removed } => removed.iter().map(|id| id.as_str()).collect(),
        WriteReason::Backfill => Vec::new(),
    };

    let updated = store.upsert(identity, intent.into())?;

    info!(
        identity = %identity.fingerprint(),
        earned = view.earned.len(),
        minted = view.minted.len(),
        pruned = removed.len(),
        "Reconciled achievement state"
    );
    audit_log!(
        store,
        AuditEvent::new(AuditEventType::AchievementsReconciled)
            .with_identity(identity)
            .with_details(json!({
                "earned": view.earned.len(),
                "minted": view.minted.len(),
                "pruned": removed,
            }))
    );

    Ok((Some(updated), view))
}
