//! # Canonical JSON Encoding
//!
//! Byte-deterministic JSON for everything that gets hashed or signed:
//! the plaintext transaction and share records.
//!
//! The canonical form is UTF-8 JSON with object keys sorted
//! lexicographically and no insignificant whitespace. Two implementations
//! that follow this rule produce identical bytes for the same value, so
//! signatures verify across implementations.
//!
//! `serde_json`'s default `Map` is ordered (BTreeMap-backed), so routing
//! every value through [`serde_json::Value`] before encoding yields sorted
//! keys at every nesting level; the default compact writer emits no
//! whitespace.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Encode a value to its canonical JSON byte form.
///
/// Keys are sorted at every nesting level. The struct's declaration order
/// is deliberately discarded by round-tripping through `serde_json::Value`.
pub fn to_canonical_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_vec(&value)?)
}

/// SHA-256 of the canonical JSON byte form of a value.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<[u8; 32]> {
    let bytes = to_canonical_vec(value)?;
    Ok(sha256(&bytes))
}

/// SHA-256 of raw bytes.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

// ============================================================================
// TESTS
// ============================================================================
