// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Achievements Module
//!
//! - [`catalog`]: the fixed list of achievements and their ids
//! - [`engine`]: pure derivation of earned achievements from the logs
//! - [`reconcile`]: keeps the persisted minted set a subset of earned

pub mod catalog;
pub mod engine;
pub mod reconcile;

pub use catalog::{AchievementId, AchievementMeta, UnknownAchievement, CATALOG};
pub use engine::{compute, HistoryStats};
pub use reconcile::{compute_derived, reconcile, refresh, DerivedView, WriteIntent, WriteReason};
