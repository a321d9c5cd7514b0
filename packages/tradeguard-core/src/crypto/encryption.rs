//! # Authenticated Encryption
//!
//! AES-256-GCM for the encrypted transaction body, the wrapped-key
//! envelopes, and the group data-key bridges.
//!
//! Parameters are fixed: 256-bit keys, 96-bit random nonces, 128-bit tags,
//! zero-length associated data. Every encryption draws a fresh nonce from
//! the OS RNG; keys are never reused across documents, so the random-nonce
//! birthday bound is never approached.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce as AesNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of symmetric keys in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// A nonce for AES-GCM encryption.
///
/// Never reused with the same key; each encryption call draws its own.
#[derive(Clone, Copy, Debug)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a cryptographically random nonce
    pub fn random() -> Result<Self> {
        let mut bytes = [0u8; NONCE_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| Error::RngUnavailable)?;
        Ok(Self(bytes))
    }

    /// Create from a slice (must be exactly 12 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; NONCE_SIZE] = slice.try_into().map_err(|_| Error::InvalidDocument {
            detail: format!("nonce must be {} bytes, got {}", NONCE_SIZE, slice.len()),
        })?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// A 256-bit symmetric key, zeroized when dropped.
///
/// Used for the per-transaction data key, group-derived keys, and the
/// HKDF-derived wrapping keys. Instances live only inside a single
/// `protect`/`unprotect` call.
#[derive(ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_SIZE]);

impl DataKey {
    /// Draw a fresh random key from the OS RNG
    pub fn random() -> Result<Self> {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| Error::RngUnavailable)?;
        Ok(Self(bytes))
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 32 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_SIZE] = slice.try_into().map_err(|_| Error::InvalidKeyEncoding {
            detail: format!("key must be {} bytes, got {}", KEY_SIZE, slice.len()),
        })?;
        Ok(Self(bytes))
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// An AES-GCM ciphertext with its nonce, base64 on the wire.
///
/// The authentication tag rides at the end of `ciphertext`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Ciphertext including the 16-byte tag
    #[serde(with = "b64_vec")]
    pub ciphertext: Vec<u8>,
    /// The 12-byte nonce used for this encryption
    #[serde(with = "b64_vec")]
    pub nonce: Vec<u8>,
}

/// Encrypt plaintext under a symmetric key with a fresh random nonce.
pub fn encrypt(key: &DataKey, plaintext: &[u8]) -> Result<EncryptedPayload> {
    let nonce = Nonce::random()?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|e| {
        Error::InvalidKeyEncoding {
            detail: format!("invalid AES key: {e}"),
        }
    })?;

    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(nonce.as_bytes()), plaintext)
        .map_err(|_| Error::InvalidDocument {
            detail: "encryption failed".into(),
        })?;

    Ok(EncryptedPayload {
        ciphertext,
        nonce: nonce.as_bytes().to_vec(),
    })
}

/// Decrypt an [`EncryptedPayload`].
///
/// Any tag mismatch — tampering, wrong key, wrong nonce — surfaces as
/// [`Error::DecryptAuth`].
pub fn decrypt(key: &DataKey, payload: &EncryptedPayload) -> Result<Vec<u8>> {
    let nonce = Nonce::from_slice(&payload.nonce)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|e| {
        Error::InvalidKeyEncoding {
            detail: format!("invalid AES key: {e}"),
        }
    })?;

    cipher
        .decrypt(AesNonce::from_slice(nonce.as_bytes()), payload.ciphertext.as_slice())
        .map_err(|_| Error::DecryptAuth)
}

/// Serde helper for byte vectors as base64
pub(crate) mod b64_vec {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================
