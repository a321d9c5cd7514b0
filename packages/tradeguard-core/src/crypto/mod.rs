//! # Primitive Layer
//!
//! Wrappers around the cryptographic primitives the engine composes. No
//! new constructions live here — only battle-tested algorithms behind
//! byte-level framing.
//!
//! ## Algorithm Choices
//!
//! | Algorithm | Purpose | Why Chosen |
//! |-----------|---------|------------|
//! | Ed25519 | Seller/buyer/share signatures | Fast, small keys, widely audited |
//! | X25519 | Per-recipient key agreement | Fast ECDH, same curve family |
//! | AES-256-GCM | Document + envelope encryption | Hardware acceleration, AEAD |
//! | HKDF-SHA256 | Wrapping + group key derivation | Industry standard, well-analyzed |
//! | SHA-256 | Transaction + share-record hashing | The signed message domain |
//!
//! ## Composition
//!
//! ```text
//! plaintext ──┬── SHA-256 ── Ed25519-Sign ──────────► signatures
//!             └── AES-256-GCM(K_T) ─────────────────► encrypted body
//!
//! K_T ──┬── X25519 + HKDF + AES-GCM per recipient ──► wrapped_keys
//!       └── HKDF per group ── wrap per member ──────► group_wrapped_keys
//! ```
//!
//! ## Security Notes
//!
//! 1. All secret buffers (data keys, derived keys, ECDH outputs) are
//!    zeroized when dropped
//! 2. dalek primitives provide constant-time operations
//! 3. All randomness comes from `rand::rngs::OsRng`
//! 4. Nonces are fresh per encryption; keys are fresh per document

mod encryption;
mod kdf;
mod keys;
mod signing;
mod wrapping;

pub use encryption::{
    decrypt, encrypt, DataKey, EncryptedPayload, Nonce, KEY_SIZE, NONCE_SIZE, TAG_SIZE,
};
pub use kdf::{derive_group_key, derive_wrapping_key, key_fingerprint};
pub use keys::{
    CompanyKeyPair, CompanyPublicKeys, CompanyRegistration, EncryptionKeyPair, SigningKeyPair,
};
pub use signing::{sign, verify, Signature, SIGNATURE_SIZE};
pub use wrapping::{unwrap_key, wrap_key, WrappedKey};

pub(crate) use encryption::b64_vec;

/// Size of public keys in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of the transaction hash in bytes (SHA-256)
pub const HASH_SIZE: usize = 32;
