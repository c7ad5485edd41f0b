// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Module
//!
//! A wallet address is attached to an identity only after the client proves
//! control of the key by signing a challenge message.

pub mod signature;

pub use signature::{verify, verify_link, WalletLinkError, SIGNATURE_LENGTH};
