// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Static achievement catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier of a catalog achievement.
///
/// Serialized as the stable snake_case ids the client knows
/// (`first_food`, `streak_3`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum AchievementId {
    #[serde(rename = "first_food")]
    FirstFood,
    #[serde(rename = "first_activity")]
    FirstActivity,
    #[serde(rename = "ten_activities")]
    TenActivities,
    #[serde(rename = "streak_3")]
    Streak3,
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "protein_goal_5")]
    ProteinGoal5,
    #[serde(rename = "calorie_goal_5")]
    CalorieGoal5,
    #[serde(rename = "activity_goal_5")]
    ActivityGoal5,
}

impl AchievementId {
    /// Every catalog id, in display order.
    pub const ALL: [AchievementId; 8] = [
        AchievementId::FirstFood,
        AchievementId::FirstActivity,
        AchievementId::TenActivities,
        AchievementId::Streak3,
        AchievementId::Streak7,
        AchievementId::ProteinGoal5,
        AchievementId::CalorieGoal5,
        AchievementId::ActivityGoal5,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AchievementId::FirstFood => "first_food",
            AchievementId::FirstActivity => "first_activity",
            AchievementId::TenActivities => "ten_activities",
            AchievementId::Streak3 => "streak_3",
            AchievementId::Streak7 => "streak_7",
            AchievementId::ProteinGoal5 => "protein_goal_5",
            AchievementId::CalorieGoal5 => "calorie_goal_5",
            AchievementId::ActivityGoal5 => "activity_goal_5",
        }
    }

    /// Catalog entry for this id.
    pub fn meta(self) -> &'static AchievementMeta {
        // CATALOG is declared in the same order as ALL.
        &CATALOG[self as usize]
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an id that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown achievement: {0}")]
pub struct UnknownAchievement(pub String);

impl FromStr for AchievementId {
    type Err = UnknownAchievement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AchievementId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownAchievement(s.to_string()))
    }
}

/// Public description of an achievement.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct AchievementMeta {
    pub id: AchievementId,
    #[schema(value_type = String)]
    pub name: &'static str,
    #[schema(value_type = String)]
    pub description: &'static str,
}

/// The fixed achievement catalog.
pub static CATALOG: [AchievementMeta; 8] = [
    AchievementMeta {
        id: AchievementId::FirstFood,
        name: "First Bite",
        description: "Log your first meal.",
    },
    AchievementMeta {
        id: AchievementId::FirstActivity,
        name: "First Move",
        description: "Log your first activity.",
    },
    AchievementMeta {
        id: AchievementId::TenActivities,
        name: "Getting Serious",
        description: "Log 10 activities.",
    },
    AchievementMeta {
        id: AchievementId::Streak3,
        name: "On a Roll",
        description: "Log food or activity 3 days in a row.",
    },
    AchievementMeta {
        id: AchievementId::Streak7,
        name: "Week Warrior",
        description: "Log food or activity 7 days in a row.",
    },
    AchievementMeta {
        id: AchievementId::ProteinGoal5,
        name: "Protein Pro",
        description: "Hit your protein goal on 5 days.",
    },
    AchievementMeta {
        id: AchievementId::CalorieGoal5,
        name: "Calorie Keeper",
        description: "Land within 10% of your calorie goal on 5 days.",
    },
    AchievementMeta {
        id: AchievementId::ActivityGoal5,
        name: "Active Habit",
        description: "Hit your activity goal on 5 days.",
    },
];
