// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Minting Module
//!
//! Achievement minting is delegated to an external service behind the
//! [`Minter`] trait. The service is optional: without it the mint endpoint
//! answers 503 and every other endpoint keeps working.
//!
//! [`MintGate`] owns the ordering of precondition checks and the persistence
//! of a successful mint.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::achievements::AchievementMeta;

pub mod client;
pub mod gate;

pub use client::HttpMinter;
pub use gate::{MintError, MintGate, MintOutcome};

/// Result of a successful external mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    /// Opaque reference to the issued asset or transaction.
    pub transaction_reference: String,
}

#[derive(Debug, Error)]
pub enum MinterError {
    #[error("mint service configuration invalid: {0}")]
    Config(String),

    #[error("mint request failed: {0}")]
    Request(String),

    #[error("mint service returned {status}")]
    Rejected { status: u16 },

    #[error("mint service response was invalid: {0}")]
    InvalidResponse(String),
}

pub type MintFuture<'a> = Pin<Box<dyn Future<Output = Result<MintReceipt, MinterError>> + Send + 'a>>;

/// External collaborator that issues an achievement to a wallet.
///
/// A call is made at most once per mint request; implementations own their
/// timeout and must not retry on their own.
pub trait Minter: Send + Sync {
    fn mint<'a>(&'a self, wallet_address: &'a str, achievement: &'a AchievementMeta) -> MintFuture<'a>;
}
