//! # Key Management
//!
//! Key pairs held by a company and the public bundle it publishes.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  CompanyKeyPair                                                 │
//! │  ──────────────                                                 │
//! │                                                                 │
//! │  ┌──────────────────────┐   ┌──────────────────────┐           │
//! │  │ SigningKeyPair       │   │ EncryptionKeyPair    │           │
//! │  │ (Ed25519)            │   │ (X25519)             │           │
//! │  │                      │   │                      │           │
//! │  │ • sign tx hashes     │   │ • unwrap envelopes   │           │
//! │  │ • sign share records │   │ • ECDH with senders  │           │
//! │  └──────────────────────┘   └──────────────────────┘           │
//! │                                                                 │
//! │  public_keys() → CompanyPublicKeys (published by name in the    │
//! │  company key directory; base64 on the wire)                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Private halves are zeroized when dropped. Public halves are plain
//! values, freely copied.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// Both key pairs a company holds
#[derive(ZeroizeOnDrop)]
pub struct CompanyKeyPair {
    /// Ed25519 keypair for signing
    pub signing: SigningKeyPair,
    /// X25519 keypair for key wrapping
    pub encryption: EncryptionKeyPair,
}

impl CompanyKeyPair {
    /// Generate fresh signing and encryption pairs from the OS RNG
    pub fn generate() -> Self {
        Self {
            signing: SigningKeyPair::generate(),
            encryption: EncryptionKeyPair::generate(),
        }
    }

    /// Get the public halves for publication
    pub fn public_keys(&self) -> CompanyPublicKeys {
        CompanyPublicKeys {
            signing: self.signing.public_bytes(),
            encryption: self.encryption.public_bytes(),
        }
    }

    /// Build the registration payload a company submits to the storage
    /// service when it first publishes its keys
    pub fn registration(&self, company_name: &str) -> CompanyRegistration {
        CompanyRegistration {
            company_name: company_name.to_owned(),
            public_keys: self.public_keys(),
        }
    }
}

/// Ed25519 signing keypair
#[derive(ZeroizeOnDrop)]
pub struct SigningKeyPair {
    // ed25519_dalek::SigningKey handles its own zeroization
    #[zeroize(skip)]
    secret: SigningKey,
}

impl SigningKeyPair {
    /// Generate a new random signing keypair
    pub fn generate() -> Self {
        let secret = SigningKey::generate(&mut OsRng);
        Self { secret }
    }

    /// Create from raw secret bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            secret: SigningKey::from_bytes(bytes),
        }
    }

    /// Get the secret key bytes (for vault storage only)
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes()
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; 32] {
        self.secret.verifying_key().to_bytes()
    }

    /// Get the verifying key for signature verification
    pub fn verifying_key(&self) -> VerifyingKey {
        self.secret.verifying_key()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.secret
    }
}

/// X25519 encryption keypair for key wrapping
#[derive(ZeroizeOnDrop)]
pub struct EncryptionKeyPair {
    // x25519_dalek::StaticSecret handles its own zeroization
    #[zeroize(skip)]
    secret: StaticSecret,
    #[zeroize(skip)]
    public: X25519PublicKey,
}

impl EncryptionKeyPair {
    /// Generate a new random encryption keypair
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Create from raw secret bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let secret = StaticSecret::from(*bytes);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Get the secret key bytes (for vault storage only)
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes()
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; 32] {
        self.public.to_bytes()
    }

    /// Raw X25519 scalar multiplication against a peer public key.
    ///
    /// Callers must reject an all-zero output before using it as key
    /// material — see [`crate::crypto::wrapping`].
    pub fn diffie_hellman(&self, their_public: &[u8; 32]) -> [u8; 32] {
        let their_public = X25519PublicKey::from(*their_public);
        self.secret.diffie_hellman(&their_public).to_bytes()
    }
}

/// The public key bundle a company publishes under its name
///
/// Serializes with the wire field names of the registration endpoint,
/// keys base64-encoded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanyPublicKeys {
    /// Ed25519 public key for signature verification (32 bytes)
    #[serde(rename = "signing_public_key", with = "b64_key")]
    pub signing: [u8; 32],

    /// X25519 public key for key wrapping (32 bytes)
    #[serde(rename = "encryption_public_key", with = "b64_key")]
    pub encryption: [u8; 32],
}

impl CompanyPublicKeys {
    /// Get the verifying key for signature verification
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(&self.signing).map_err(|e| Error::InvalidKeyEncoding {
            detail: format!("invalid signing public key: {e}"),
        })
    }

    /// Short hex fingerprint of the encryption public key, for display
    /// and out-of-band comparison of directory entries
    pub fn fingerprint(&self) -> Result<String> {
        crate::crypto::kdf::key_fingerprint(&self.encryption)
    }
}

/// Body of `POST /register_company`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanyRegistration {
    /// The company's unique human-readable name
    pub company_name: String,
    /// The published key bundle
    #[serde(flatten)]
    pub public_keys: CompanyPublicKeys,
}

/// Serde helper for 32-byte keys as base64
pub(crate) mod b64_key {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("key must be 32 bytes"))
    }
}

// ============================================================================
// TESTS
// ============================================================================
