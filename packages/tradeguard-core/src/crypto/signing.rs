//! # Digital Signatures
//!
//! Ed25519 signatures over 32-byte transaction and share-record hashes.
//!
//! The signed message is the raw SHA-256 hash itself — no domain prefix is
//! added, so signatures remain verifiable by any implementation that hashes
//! the same canonical bytes.

use ed25519_dalek::{Signature as Ed25519Signature, Signer, Verifier};
use serde::{Deserialize, Serialize};

use crate::crypto::SigningKeyPair;
use crate::error::{Error, Result};

/// Size of an Ed25519 signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// An Ed25519 signature, base64 on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "b64_signature")] pub [u8; SIGNATURE_SIZE]);

impl Signature {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 64 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; SIGNATURE_SIZE] =
            slice.try_into().map_err(|_| Error::InvalidKeyEncoding {
                detail: format!(
                    "signature must be {} bytes, got {}",
                    SIGNATURE_SIZE,
                    slice.len()
                ),
            })?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Sign a message with a company's Ed25519 key.
///
/// Ed25519 is deterministic: the same message under the same key always
/// yields the same signature.
pub fn sign(keypair: &SigningKeyPair, message: &[u8]) -> Signature {
    let sig = keypair.signing_key().sign(message);
    Signature(sig.to_bytes())
}

/// Verify an Ed25519 signature against a 32-byte public key.
///
/// Returns `Ok(())` if valid, [`Error::InvalidSignature`] otherwise.
/// Verification is constant-time per the dalek contract.
pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &Signature) -> Result<()> {
    let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(public_key).map_err(|e| {
        Error::InvalidKeyEncoding {
            detail: format!("invalid public key: {e}"),
        }
    })?;

    let sig = Ed25519Signature::from_bytes(&signature.0);

    verifying_key
        .verify(message, &sig)
        .map_err(|_| Error::InvalidSignature)
}

/// Serde helper for signature bytes as base64
mod b64_signature {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 64], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("signature must be 64 bytes"))
    }
}

// ============================================================================
// TESTS
// ============================================================================
