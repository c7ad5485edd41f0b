// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Anonymous Identity Module
//!
//! Clients are identified without accounts or personal data.
//!
//! ## Flow
//!
//! 1. First request carries no identity cookie
//! 2. Server generates 256 random bits (OS CSPRNG), base64url-encodes them
//!    and sets `fitrelay_id` (`HttpOnly`, `SameSite=Lax`, one year)
//! 3. Later requests present the cookie; it is reused when well-formed
//!
//! ## Security
//!
//! - Tokens are bearer credentials: never logged, never stored raw
//! - Storage keys and log fingerprints are SHA-256 digests of the token
//! - Per-identity locks serialize state-changing sequences

pub mod extractor;
pub mod locks;
pub mod middleware;
pub mod token;

pub use extractor::Identity;
pub use locks::{IdentityGuard, IdentityLocks};
pub use middleware::{resolve_identity, ResolvedIdentity, IDENTITY_COOKIE};
pub use token::AnonymousIdentity;
