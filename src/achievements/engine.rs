// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Achievement derivation.
//!
//! [`compute`] is a pure function of the logs and the normalized goals: the
//! same inputs always yield the same set, and nothing is read from or written
//! to storage here.

use std::collections::{BTreeMap, BTreeSet};

use super::AchievementId;
use crate::models::{ActivityLog, DietLog, GoalTargets};

/// Minimum number of activity sessions for `ten_activities`.
const TEN_ACTIVITIES: usize = 10;

/// Streak lengths for `streak_3` / `streak_7`.
const SHORT_STREAK: u32 = 3;
const LONG_STREAK: u32 = 7;

/// Days a goal must be hit for the `*_goal_5` achievements.
const GOAL_DAYS: usize = 5;

/// Counters derived from the logs, exposed for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub food_entries: usize,
    pub activity_entries: usize,
    pub current_streak: u32,
    pub protein_days: usize,
    pub calorie_days: usize,
    pub activity_minutes_days: usize,
}

impl HistoryStats {
    pub fn collect(diet: &DietLog, activity: &ActivityLog, goals: &GoalTargets) -> Self {
        Self {
            food_entries: diet.values().map(Vec::len).sum(),
            activity_entries: activity.values().map(Vec::len).sum(),
            current_streak: current_streak(diet, activity),
            protein_days: diet
                .values()
                .filter(|entries| !entries.is_empty())
                .filter(|entries| entries.iter().map(|e| e.protein).sum::<f64>() >= goals.protein)
                .count(),
            calorie_days: diet
                .values()
                .filter(|entries| !entries.is_empty())
                .filter(|entries| {
                    within_calorie_band(entries.iter().map(|e| e.calories).sum(), goals.calories)
                })
                .count(),
            activity_minutes_days: activity
                .values()
                .filter(|entries| !entries.is_empty())
                .filter(|entries| {
                    entries.iter().map(|e| e.duration).sum::<f64>() >= goals.activity_minutes
                })
                .count(),
        }
    }

    /// Achievements unlocked by these counters.
    pub fn earned(&self) -> BTreeSet<AchievementId> {
        let checks = [
            (AchievementId::FirstFood, self.food_entries > 0),
            (AchievementId::FirstActivity, self.activity_entries > 0),
            (
                AchievementId::TenActivities,
                self.activity_entries >= TEN_ACTIVITIES,
            ),
            (AchievementId::Streak3, self.current_streak >= SHORT_STREAK),
            (AchievementId::Streak7, self.current_streak >= LONG_STREAK),
            (AchievementId::ProteinGoal5, self.protein_days >= GOAL_DAYS),
            (AchievementId::CalorieGoal5, self.calorie_days >= GOAL_DAYS),
            (
                AchievementId::ActivityGoal5,
                self.activity_minutes_days >= GOAL_DAYS,
            ),
        ];

        checks
            .into_iter()
            .filter_map(|(id, unlocked)| unlocked.then_some(id))
            .collect()
    }
}

/// Compute the set of earned achievements.
pub fn compute(diet: &DietLog, activity: &ActivityLog, goals: &GoalTargets) -> BTreeSet<AchievementId> {
    HistoryStats::collect(diet, activity, goals).earned()
}

/// Inclusive ±10% band around the calorie goal.
///
/// Compared in tenths so `0.9 * goal` rounding never excludes the edge.
fn within_calorie_band(total: f64, goal: f64) -> bool {
    let scaled = total * 10.0;
    scaled >= goal * 9.0 && scaled <= goal * 11.0
}

/// Length of the unbroken run of active logged dates ending at the most recent one.
///
/// Walks every date key present in either log, newest first, and stops at the
/// first key where neither log has an entry. Missing dates are not gaps.
fn current_streak(diet: &DietLog, activity: &ActivityLog) -> u32 {
    let logged: BTreeSet<&str> = diet
        .keys()
        .chain(activity.keys())
        .map(String::as_str)
        .collect();

    let mut streak = 0;
    for key in logged.into_iter().rev() {
        if !has_entries(diet, key) && !has_entries(activity, key) {
            break;
        }
        streak += 1;
    }
    streak
}

fn has_entries<T>(log: &BTreeMap<String, Vec<T>>, key: &str) -> bool {
    log.get(key).is_some_and(|entries| !entries.is_empty())
}
