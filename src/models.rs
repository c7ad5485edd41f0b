// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Diet & Activity Data Models
//!
//! Log entries, goals and the normalized goal targets consumed by the
//! achievement engine. All types derive `Serialize`, `Deserialize`, and
//! `ToSchema` for JSON handling and OpenAPI documentation.
//!
//! ## Numeric Coercion
//!
//! The client stores whatever the user typed, so numeric fields accept JSON
//! numbers, numeric strings, `null`, or nothing at all. Anything that does not
//! coerce to a finite number reads as `0` (or "unset" for optional fields).
//!
//! ## Date Keys
//!
//! Logs are keyed by calendar date in `YYYY-MM-DD` form. Keys are kept as
//! strings so that writes persist verbatim; parsing happens where dates matter.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Default daily calorie goal (kcal).
pub const DEFAULT_CALORIE_GOAL: f64 = 2000.0;

/// Default daily protein goal (grams).
pub const DEFAULT_PROTEIN_GOAL: f64 = 50.0;

/// Default daily activity goal (minutes).
pub const DEFAULT_ACTIVITY_GOAL: f64 = 30.0;

/// Food log: date key → entries logged that day, in order.
pub type DietLog = BTreeMap<String, Vec<FoodEntry>>;

/// Activity log: date key → sessions logged that day, in order.
pub type ActivityLog = BTreeMap<String, Vec<ActivityEntry>>;

// =============================================================================
// Log Entries
// =============================================================================

/// A single food log entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FoodEntry {
    /// What was eaten.
    #[serde(default)]
    pub name: String,
    /// Energy in kcal.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub calories: f64,
    /// Protein in grams.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub protein: f64,
    /// Carbohydrates in grams.
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub carbs: Option<f64>,
    /// Fat in grams.
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub fat: Option<f64>,
}

/// A single activity session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ActivityEntry {
    /// Kind of activity (e.g. "running").
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Duration in minutes.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration: f64,
    /// Free-form intensity label (e.g. "moderate").
    #[serde(default)]
    pub intensity: String,
}

// =============================================================================
// Goals
// =============================================================================

/// User-chosen daily goals, as stored.
///
/// Every field is optional; null or missing values fall back to the defaults
/// when normalized into [`GoalTargets`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goals {
    /// Daily calorie target (kcal).
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub calorie_goal: Option<f64>,
    /// Daily protein target (grams).
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub protein_goal: Option<f64>,
    /// Daily activity target (minutes).
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_goal: Option<f64>,
}

/// Fully-defaulted goals, the only goal shape the achievement engine sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalTargets {
    pub calories: f64,
    pub protein: f64,
    pub activity_minutes: f64,
}

impl Default for GoalTargets {
    fn default() -> Self {
        Self {
            calories: DEFAULT_CALORIE_GOAL,
            protein: DEFAULT_PROTEIN_GOAL,
            activity_minutes: DEFAULT_ACTIVITY_GOAL,
        }
    }
}

impl GoalTargets {
    /// Normalize stored goals, filling every unset field.
    pub fn from_goals(goals: Option<&Goals>) -> Self {
        let defaults = Self::default();
        let Some(goals) = goals else {
            return defaults;
        };

        Self {
            calories: goals.calorie_goal.unwrap_or(defaults.calories),
            protein: goals.protein_goal.unwrap_or(defaults.protein),
            activity_minutes: goals.activity_goal.unwrap_or(defaults.activity_minutes),
        }
    }
}

// =============================================================================
// Lenient Numeric Deserialization
// =============================================================================

/// Coerce a JSON value into a finite number, if it looks like one.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_number).unwrap_or(0.0))
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_number))
}
