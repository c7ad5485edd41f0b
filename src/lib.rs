// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! FitRelay - Achievement & Anonymous Identity Service
//!
//! Backend for the FitRelay fitness/nutrition client. Clients are known only
//! by an anonymous cookie identity; their diet and activity logs drive a
//! fixed set of achievements that can be minted to a verified wallet.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `identity` - Anonymous cookie identities and per-identity locks
//! - `achievements` - Catalog, derivation engine and reconciliation
//! - `wallet` - Ed25519 wallet link verification
//! - `minting` - Gated calls to the external mint service
//! - `storage` - User documents and audit trail (redb)

pub mod achievements;
pub mod api;
pub mod config;
pub mod error;
pub mod identity;
pub mod minting;
pub mod models;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod wallet;
