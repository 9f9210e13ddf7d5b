// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet signature verification.
//!
//! Wallet clients sign a UTF-8 message with their Ed25519 key and send the
//! public key and the detached 64-byte signature as base-58 strings (Bitcoin
//! alphabet, the encoding used by Solana-style wallets).
//!
//! Decoding problems (bad base-58, wrong byte length) are reported as
//! [`DecodeError`]. Anything that decodes cleanly but does not verify is a
//! plain `Ok(false)`, including a 32-byte key that is not a curve point.

use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Input could not be decoded into an Ed25519 key or signature.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("public key is not valid base-58: {0}")]
    PublicKeyEncoding(bs58::decode::Error),

    #[error("signature is not valid base-58: {0}")]
    SignatureEncoding(bs58::decode::Error),

    #[error("public key must be 32 bytes, got {0}")]
    PublicKeyLength(usize),

    #[error("signature must be 64 bytes, got {0}")]
    SignatureLength(usize),
}

impl DecodeError {
    /// Short client-facing summary; the `Display` text goes into `details`.
    pub fn summary(&self) -> &'static str {
        match self {
            DecodeError::PublicKeyEncoding(_) | DecodeError::PublicKeyLength(_) => {
                "Malformed public key"
            }
            DecodeError::SignatureEncoding(_) | DecodeError::SignatureLength(_) => {
                "Malformed signature"
            }
        }
    }
}

/// Verify a detached Ed25519 signature over `message`.
///
/// # Arguments
/// * `public_key` - base-58 encoded 32-byte verifying key
/// * `message` - signed text, verified over its UTF-8 bytes
/// * `signature` - base-58 encoded 64-byte signature
///
/// # Returns
/// * `Ok(true)` - signature is valid for this key and message
/// * `Ok(false)` - inputs are well formed but the signature does not match
/// * `Err(DecodeError)` - key or signature could not be decoded
pub fn verify_detached(
    public_key: &str,
    message: &str,
    signature: &str,
) -> Result<bool, DecodeError> {
    let key_bytes = decode_public_key(public_key)?;
    let signature = decode_signature(signature)?;

    // no signature verifies under a key that is not on the curve
    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
        return Ok(false);
    };

    Ok(verifying_key
        .verify_strict(message.as_bytes(), &signature)
        .is_ok())
}

fn decode_public_key(encoded: &str) -> Result<[u8; PUBLIC_KEY_LENGTH], DecodeError> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(DecodeError::PublicKeyEncoding)?;

    bytes
        .as_slice()
        .try_into()
        .map_err(|_| DecodeError::PublicKeyLength(bytes.len()))
}

fn decode_signature(encoded: &str) -> Result<Signature, DecodeError> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(DecodeError::SignatureEncoding)?;

    let bytes: [u8; SIGNATURE_LENGTH] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| DecodeError::SignatureLength(bytes.len()))?;

    Ok(Signature::from_bytes(&bytes))
}

#[cfg(test)]
pub(crate) mod test_support {
    use ed25519_dalek::{Signer, SigningKey, VerifyingKey};

    /// Deterministic wallet key for tests; `seed` picks a distinct key.
    pub fn wallet(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    pub fn public_key_b58(key: &SigningKey) -> String {
        bs58::encode(key.verifying_key().to_bytes()).into_string()
    }

    pub fn sign_b58(key: &SigningKey, message: &str) -> String {
        bs58::encode(key.sign(message.as_bytes()).to_bytes()).into_string()
    }

    /// Base-58 of 32 bytes that do not decompress to an Ed25519 point.
    pub fn off_curve_key_b58() -> String {
        (2u8..=u8::MAX)
            .map(|y| {
                let mut bytes = [0u8; 32];
                bytes[0] = y;
                bytes
            })
            .find(|bytes| VerifyingKey::from_bytes(bytes).is_err())
            .map(|bytes| bs58::encode(bytes).into_string())
            .expect("some small y has no curve point")
    }
}
