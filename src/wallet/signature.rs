// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Detached Ed25519 signature verification for wallet linking.
//!
//! Public keys and signatures arrive base58-encoded, the way Solana wallets
//! hand them out. The message is verified over its UTF-8 bytes.

use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH};
use thiserror::Error;

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletLinkError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("public key is not a valid Ed25519 key")]
    InvalidPublicKey,

    #[error("signature is not valid base58")]
    MalformedSignature,

    #[error("signature must be {expected} bytes, got {actual}")]
    InvalidSignatureLength { expected: usize, actual: usize },

    #[error("signature does not match public key and message")]
    InvalidSignature,
}

impl WalletLinkError {
    /// Machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            WalletLinkError::MissingField(_) => "missing_field",
            WalletLinkError::InvalidPublicKey => "invalid_public_key",
            WalletLinkError::MalformedSignature => "malformed_signature",
            WalletLinkError::InvalidSignatureLength { .. } => "invalid_signature_length",
            WalletLinkError::InvalidSignature => "invalid_signature",
        }
    }
}

fn decode_public_key(public_key: &str) -> Result<VerifyingKey, WalletLinkError> {
    let bytes: [u8; PUBLIC_KEY_LENGTH] = bs58::decode(public_key)
        .into_vec()
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(WalletLinkError::InvalidPublicKey)?;

    VerifyingKey::from_bytes(&bytes).map_err(|_| WalletLinkError::InvalidPublicKey)
}

fn decode_signature(signature: &str) -> Result<Signature, WalletLinkError> {
    let bytes = bs58::decode(signature)
        .into_vec()
        .map_err(|_| WalletLinkError::MalformedSignature)?;

    let actual = bytes.len();
    let bytes: [u8; SIGNATURE_LENGTH] =
        bytes
            .try_into()
            .map_err(|_| WalletLinkError::InvalidSignatureLength {
                expected: SIGNATURE_LENGTH,
                actual,
            })?;

    Ok(Signature::from_bytes(&bytes))
}

/// Verify `signature` over `message` against `public_key`.
///
/// Returns `Ok(false)` for a well-formed signature that does not verify.
pub fn verify(public_key: &str, message: &str, signature: &str) -> Result<bool, WalletLinkError> {
    for (field, value) in [
        ("publicKey", public_key),
        ("message", message),
        ("signature", signature),
    ] {
        if value.trim().is_empty() {
            return Err(WalletLinkError::MissingField(field));
        }
    }

    let key = decode_public_key(public_key)?;
    let signature = decode_signature(signature)?;

    Ok(key.verify_strict(message.as_bytes(), &signature).is_ok())
}

/// Like [`verify`], but a non-matching signature is an error.
pub fn verify_link(public_key: &str, message: &str, signature: &str) -> Result<(), WalletLinkError> {
    if verify(public_key, message, signature)? {
        Ok(())
    } else {
        Err(WalletLinkError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    const MESSAGE: &str = "Link wallet to fitrelay: nonce 42";

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn public_key() -> String {
        bs58::encode(signing_key().verifying_key().as_bytes()).into_string()
    }

    fn sign(message: &str) -> String {
        bs58::encode(signing_key().sign(message.as_bytes()).to_bytes()).into_string()
    }

    #[test]
    fn valid_signature_verifies() {
        assert_eq!(verify(&public_key(), MESSAGE, &sign(MESSAGE)), Ok(true));
        assert!(verify_link(&public_key(), MESSAGE, &sign(MESSAGE)).is_ok());
    }

    #[test]
    fn signature_over_other_message_fails() {
        let signature = sign("something else");
        assert_eq!(verify(&public_key(), MESSAGE, &signature), Ok(false));
        assert_eq!(
            verify_link(&public_key(), MESSAGE, &signature),
            Err(WalletLinkError::InvalidSignature)
        );
    }

    #[test]
    fn short_signature_is_rejected_by_length() {
        let short = bs58::encode([1u8; 63]).into_string();
        assert_eq!(
            verify(&public_key(), MESSAGE, &short),
            Err(WalletLinkError::InvalidSignatureLength {
                expected: 64,
                actual: 63
            })
        );
    }

    #[test]
    fn non_base58_signature_is_malformed() {
        assert_eq!(
            verify(&public_key(), MESSAGE, "0OIl"),
            Err(WalletLinkError::MalformedSignature)
        );
    }

    #[test]
    fn bad_public_keys_are_rejected() {
        let too_short = bs58::encode([1u8; 31]).into_string();
        assert_eq!(
            verify(&too_short, MESSAGE, &sign(MESSAGE)),
            Err(WalletLinkError::InvalidPublicKey)
        );
        assert_eq!(
            verify("not-base58!", MESSAGE, &sign(MESSAGE)),
            Err(WalletLinkError::InvalidPublicKey)
        );
    }

    #[test]
    fn empty_fields_are_missing() {
        assert_eq!(
            verify("", MESSAGE, &sign(MESSAGE)),
            Err(WalletLinkError::MissingField("publicKey"))
        );
        assert_eq!(
            verify(&public_key(), " ", &sign(MESSAGE)),
            Err(WalletLinkError::MissingField("message"))
        );
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            WalletLinkError::InvalidSignatureLength {
                expected: 64,
                actual: 63
            }
            .error_code(),
            "invalid_signature_length"
        );
        assert_eq!(WalletLinkError::InvalidSignature.error_code(), "invalid_signature");
    }
}
