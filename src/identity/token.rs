// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Anonymous identity tokens.

use std::fmt;

use base64ct::{Base64UrlUnpadded, Encoding};
use ring::rand::SecureRandom;
use sha2::{Digest, Sha256};

/// Random bytes per token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Hex characters of the storage key kept in log fingerprints.
const FINGERPRINT_LEN: usize = 12;

/// Opaque, unguessable client identity carried in the identity cookie.
///
/// `Debug` prints only the fingerprint: the token itself is a bearer
/// credential and must never reach logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AnonymousIdentity(String);

#[derive(Debug, thiserror::Error)]
#[error("system random number generator failed")]
pub struct RandomnessUnavailable;

impl AnonymousIdentity {
    /// Generate a fresh identity from a cryptographically secure RNG.
    pub fn generate(rng: &dyn SecureRandom) -> Result<Self, RandomnessUnavailable> {
        let mut bytes = [0u8; TOKEN_BYTES];
        rng.fill(&mut bytes).map_err(|_| RandomnessUnavailable)?;
        Ok(Self(Base64UrlUnpadded::encode_string(&bytes)))
    }

    /// Accept a presented token only if it is well-formed.
    pub fn parse(raw: &str) -> Option<Self> {
        match Base64UrlUnpadded::decode_vec(raw) {
            Ok(bytes) if bytes.len() == TOKEN_BYTES => Some(Self(raw.to_string())),
            _ => None,
        }
    }

    /// The token as sent in the cookie.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex SHA-256 of the token, used as the persistence key.
    pub fn storage_key(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }

    /// Short prefix of the storage key, safe for logs and audit entries.
    pub fn fingerprint(&self) -> String {
        let mut key = self.storage_key();
        key.truncate(FINGERPRINT_LEN);
        key
    }
}

impl fmt::Debug for AnonymousIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnonymousIdentity")
            .field(&self.fingerprint())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring::rand::SystemRandom;

    #[test]
    fn generated_tokens_are_unique_and_parseable() {
        let rng = SystemRandom::new();
        let a = AnonymousIdentity::generate(&rng).unwrap();
        let b = AnonymousIdentity::generate(&rng).unwrap();

        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 43);
        assert_eq!(AnonymousIdentity::parse(a.as_str()), Some(a));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(AnonymousIdentity::parse("").is_none());
        assert!(AnonymousIdentity::parse("short").is_none());
        assert!(AnonymousIdentity::parse(&"A".repeat(42)).is_none());
        assert!(AnonymousIdentity::parse(&"*".repeat(43)).is_none());
        // 16-byte tokens decode but are too short
        assert!(AnonymousIdentity::parse(&"A".repeat(22)).is_none());
    }

    #[test]
    fn storage_key_and_fingerprint_hide_token() {
        let identity = AnonymousIdentity::parse(&"A".repeat(43)).unwrap();
        let key = identity.storage_key();

        assert_eq!(key.len(), 64);
        assert!(!key.contains(identity.as_str()));
        assert!(key.starts_with(&identity.fingerprint()));
        assert!(!format!("{identity:?}").contains(identity.as_str()));
    }
}
