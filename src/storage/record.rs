// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-identity user document and the partial updates applied to it.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::achievements::AchievementId;
use crate::models::{ActivityLog, DietLog, Goals};

/// Proof that an achievement was minted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MintRecord {
    /// Opaque reference returned by the minting backend.
    pub transaction_reference: String,
    /// When the mint call succeeded.
    pub minted_at: DateTime<Utc>,
}

/// User document keyed by anonymous identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub diet: DietLog,
    #[serde(default)]
    pub activity: ActivityLog,
    #[serde(default)]
    pub goals: Option<Goals>,
    #[serde(default)]
    pub goal_story: String,
    /// Base58 public key, only ever set by a verified wallet link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    /// Last reconciled earned snapshot. `None` until first recorded.
    #[serde(
        default,
        deserialize_with = "known_ids",
        skip_serializing_if = "Option::is_none"
    )]
    pub achievements_earned: Option<BTreeSet<AchievementId>>,
    /// Achievements with a completed mint. `None` until first recorded.
    #[serde(
        default,
        deserialize_with = "known_ids",
        skip_serializing_if = "Option::is_none"
    )]
    pub achievements_minted: Option<BTreeSet<AchievementId>>,
    #[serde(
        default,
        deserialize_with = "known_receipts",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub mint_receipts: BTreeMap<AchievementId, MintRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// A blank record, as created by the first upsert for an identity.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            diet: DietLog::new(),
            activity: ActivityLog::new(),
            goals: None,
            goal_story: String::new(),
            wallet_address: None,
            achievements_earned: None,
            achievements_minted: None,
            mint_receipts: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// Ids no longer in the catalog are dropped on load so a retired achievement
// cannot make the whole record unreadable.

fn known_ids<'de, D>(deserializer: D) -> Result<Option<BTreeSet<AchievementId>>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(stored.map(|ids| ids.iter().map(String::as_str).filter_map(known_id).collect()))
}

fn known_receipts<'de, D>(deserializer: D) -> Result<BTreeMap<AchievementId, MintRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = BTreeMap::<String, MintRecord>::deserialize(deserializer)?;
    Ok(stored
        .into_iter()
        .filter_map(|(id, receipt)| known_id(&id).map(|id| (id, receipt)))
        .collect())
}

fn known_id(id: &str) -> Option<AchievementId> {
    match id.parse() {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "Dropping achievement id missing from the catalog");
            None
        }
    }
}

/// Fields that can be removed from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    WalletAddress,
}

impl UserField {
    pub fn name(self) -> &'static str {
        match self {
            UserField::WalletAddress => "walletAddress",
        }
    }
}

/// Partial update merged into a record by `UserStore::upsert`.
///
/// `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub diet: Option<DietLog>,
    pub activity: Option<ActivityLog>,
    /// `Some(None)` clears stored goals.
    pub goals: Option<Option<Goals>>,
    pub goal_story: Option<String>,
    pub wallet_address: Option<String>,
    pub achievements_earned: Option<BTreeSet<AchievementId>>,
    pub achievements_minted: Option<BTreeSet<AchievementId>>,
    pub mint_receipt: Option<(AchievementId, MintRecord)>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the patch into `record` and stamp `updated_at`.
    pub fn apply(self, record: &mut UserRecord, now: DateTime<Utc>) {
        if let Some(diet) = self.diet {
            record.diet = diet;
        }
        if let Some(activity) = self.activity {
            record.activity = activity;
        }
        if let Some(goals) = self.goals {
            record.goals = goals;
        }
        if let Some(goal_story) = self.goal_story {
            record.goal_story = goal_story;
        }
        if let Some(wallet_address) = self.wallet_address {
            record.wallet_address = Some(wallet_address);
        }
        if let Some(earned) = self.achievements_earned {
            record.achievements_earned = Some(earned);
        }
        if let Some(minted) = self.achievements_minted {
            record.achievements_minted = Some(minted);
        }
        if let Some((id, receipt)) = self.mint_receipt {
            record.mint_receipts.insert(id, receipt);
        }
        record.updated_at = now;
    }
}

/// Remove `field` from `record` and stamp `updated_at`.
pub fn remove_field(record: &mut UserRecord, field: UserField, now: DateTime<Utc>) {
    match field {
        UserField::WalletAddress => record.wallet_address = None,
    }
    record.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn apply_merges_only_named_fields() {
        let created = Utc::now();
        let mut record = UserRecord::new(created);
        record.goal_story = "run a 10k".into();
        record.wallet_address = Some("old".into());

        let later = created + Duration::seconds(5);
        UserPatch {
            wallet_address: Some("new".into()),
            achievements_minted: Some(BTreeSet::from([AchievementId::FirstFood])),
            ..Default::default()
        }
        .apply(&mut record, later);

        assert_eq!(record.goal_story, "run a 10k");
        assert_eq!(record.wallet_address.as_deref(), Some("new"));
        assert_eq!(
            record.achievements_minted,
            Some(BTreeSet::from([AchievementId::FirstFood]))
        );
        assert!(record.achievements_earned.is_none());
        assert_eq!(record.created_at, created);
        assert_eq!(record.updated_at, later);
    }

    #[test]
    fn goals_patch_can_clear() {
        let mut record = UserRecord::new(Utc::now());
        record.goals = Some(Goals::default());

        UserPatch {
            goals: Some(None),
            ..Default::default()
        }
        .apply(&mut record, Utc::now());

        assert!(record.goals.is_none());
    }

    #[test]
    fn record_without_snapshot_fields_deserializes() {
        let record: UserRecord = serde_json::from_value(serde_json::json!({
            "diet": {},
            "activity": {},
            "goals": null,
            "goalStory": "",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert!(record.achievements_earned.is_none());
        assert!(record.achievements_minted.is_none());
        assert!(record.wallet_address.is_none());
    }

    #[test]
    fn unknown_stored_ids_are_dropped() {
        let record: UserRecord = serde_json::from_value(serde_json::json!({
            "achievementsEarned": ["first_food", "retired_badge"],
            "achievementsMinted": ["retired_badge"],
            "mintReceipts": {
                "retired_badge": {
                    "transactionReference": "tx-old",
                    "mintedAt": "2024-01-02T00:00:00Z"
                },
                "first_food": {
                    "transactionReference": "tx-1",
                    "mintedAt": "2024-01-02T00:00:00Z"
                }
            },
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(
            record.achievements_earned,
            Some(BTreeSet::from([AchievementId::FirstFood]))
        );
        assert_eq!(record.achievements_minted, Some(BTreeSet::new()));
        assert_eq!(record.mint_receipts.len(), 1);
        assert!(record.mint_receipts.contains_key(&AchievementId::FirstFood));
    }

    #[test]
    fn null_snapshot_stays_unrecorded() {
        let record: UserRecord = serde_json::from_value(serde_json::json!({
            "achievementsEarned": null,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(record.achievements_earned.is_none());
    }

    #[test]
    fn remove_wallet_field() {
        let mut record = UserRecord::new(Utc::now());
        record.wallet_address = Some("addr".into());
        remove_field(&mut record, UserField::WalletAddress, Utc::now());
        assert!(record.wallet_address.is_none());
        assert_eq!(UserField::WalletAddress.name(), "walletAddress");
    }
}
