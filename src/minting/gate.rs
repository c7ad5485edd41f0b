// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Precondition checks and persistence around a single mint call.

use std::collections::BTreeSet;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use super::{Minter, MinterError};
use crate::achievements::{compute_derived, AchievementId};
use crate::audit_log;
use crate::identity::AnonymousIdentity;
use crate::storage::{AuditEvent, AuditEventType, MintRecord, StoreError, UserPatch, UserStore};

#[derive(Debug, Error)]
pub enum MintError {
    #[error("no wallet linked")]
    WalletNotLinked,

    #[error("unknown achievement: {0}")]
    UnknownAchievement(String),

    #[error("achievement {0} has not been earned")]
    NotEarned(AchievementId),

    #[error("achievement {0} was already minted")]
    AlreadyMinted(AchievementId),

    #[error("minting is not configured")]
    MintingUnavailable,

    #[error(transparent)]
    Upstream(#[from] MinterError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MintError {
    pub fn error_code(&self) -> &'static str {
        match self {
            MintError::WalletNotLinked => "wallet_not_linked",
            MintError::UnknownAchievement(_) => "unknown_achievement",
            MintError::NotEarned(_) => "not_earned",
            MintError::AlreadyMinted(_) => "already_minted",
            MintError::MintingUnavailable => "minting_unavailable",
            MintError::Upstream(_) => "mint_failed",
            MintError::Store(_) => "storage_unavailable",
        }
    }
}

/// A completed mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintOutcome {
    pub achievement_id: AchievementId,
    pub transaction_reference: String,
    pub achievements_minted: BTreeSet<AchievementId>,
}

/// Runs the mint sequence for one identity.
///
/// The caller must hold the identity's lock for the duration of [`MintGate::mint`].
pub struct MintGate<'a> {
    store: &'a dyn UserStore,
    minter: Option<&'a dyn Minter>,
}

impl<'a> MintGate<'a> {
    pub fn new(store: &'a dyn UserStore, minter: Option<&'a dyn Minter>) -> Self {
        Self { store, minter }
    }

    pub async fn mint(
        &self,
        identity: &AnonymousIdentity,
        requested: &str,
    ) -> Result<MintOutcome, MintError> {
        let record = self.store.find_one(identity)?;

        let wallet = record
            .as_ref()
            .and_then(|r| r.wallet_address.clone())
            .ok_or(MintError::WalletNotLinked)?;

        let id: AchievementId = requested
            .parse()
            .map_err(|_| MintError::UnknownAchievement(requested.to_string()))?;

        // A linked wallet implies a stored record.
        let Some(record) = record else {
            return Err(MintError::WalletNotLinked);
        };

        let view = compute_derived(&record);
        if !view.earned.contains(&id) {
            return Err(MintError::NotEarned(id));
        }

        let already_minted = record
            .achievements_minted
            .as_ref()
            .is_some_and(|minted| minted.contains(&id));
        if already_minted {
            return Err(MintError::AlreadyMinted(id));
        }

        let Some(minter) = self.minter else {
            return Err(MintError::MintingUnavailable);
        };

        let receipt = match minter.mint(&wallet, id.meta()).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(
                    identity = %identity.fingerprint(),
                    achievement = %id,
                    error = %e,
                    "Mint call failed"
                );
                audit_log!(
                    self.store,
                    AuditEvent::new(AuditEventType::MintFailed)
                        .with_identity(identity)
                        .with_resource("achievement", id.as_str())
                        .failed(e.to_string())
                );
                return Err(e.into());
            }
        };

        let mut minted = view.minted;
        minted.insert(id);

        let patch = UserPatch {
            achievements_earned: Some(view.earned),
            achievements_minted: Some(minted.clone()),
            mint_receipt: Some((
                id,
                MintRecord {
                    transaction_reference: receipt.transaction_reference.clone(),
                    minted_at: Utc::now(),
                },
            )),
            ..Default::default()
        };

        if let Err(e) = self.store.upsert(identity, patch) {
            // The external mint happened; the reference is the only trace left.
            warn!(
                identity = %identity.fingerprint(),
                achievement = %id,
                transaction_reference = %receipt.transaction_reference,
                error = %e,
                "Minted but failed to persist mint state"
            );
            return Err(e.into());
        }

        info!(
            identity = %identity.fingerprint(),
            achievement = %id,
            transaction_reference = %receipt.transaction_reference,
            "Achievement minted"
        );
        audit_log!(
            self.store,
            AuditEvent::new(AuditEventType::AchievementMinted)
                .with_identity(identity)
                .with_resource("achievement", id.as_str())
                .with_details(json!({
                    "transactionReference": receipt.transaction_reference,
                }))
        );

        Ok(MintOutcome {
            achievement_id: id,
            transaction_reference: receipt.transaction_reference,
            achievements_minted: minted,
        })
    }
}
