//! # Protected Document
//!
//! The self-describing envelope a `protect` call produces and the storage
//! service carries. JSON on the wire; field names are part of the contract.
//!
//! ```text
//! {
//!   "version": "1.0",
//!   "transaction_id": 123,
//!   "encrypted_transaction": { "ciphertext": b64, "nonce": b64 },
//!   "signatures": {
//!     "seller": { "company": "...", "signature": b64 },
//!     "buyer":  null | { "company": "...", "signature": b64 }
//!   },
//!   "wrapped_keys": { company: envelope, ... },
//!   "group_wrapped_keys": {
//!     group_id: { "members": { company: envelope, ... },
//!                 "data_key_bridge": { "ciphertext": b64, "nonce": b64 } }
//!   },
//!   "transaction_hash": b64
//! }
//! ```
//!
//! A document is immutable after issuance except for the buyer-signature
//! slot, which is appended exactly once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crypto::{b64_vec, EncryptedPayload, Signature, WrappedKey};
use crate::error::Result;

/// The only document version this engine emits
pub const DOCUMENT_VERSION: &str = "1.0";

/// A protected DvP transaction document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtectedDocument {
    /// Format version, `"1.0"`
    pub version: String,
    /// Mirrors the plaintext `id`
    pub transaction_id: u64,
    /// Canonical plaintext under the per-transaction data key
    pub encrypted_transaction: EncryptedPayload,
    /// Seller signature (mandatory) and buyer signature (appended later)
    pub signatures: Signatures,
    /// Per-company envelopes carrying the data key
    pub wrapped_keys: BTreeMap<String, WrappedKey>,
    /// Per-group envelopes carrying the group-derived key
    pub group_wrapped_keys: BTreeMap<String, GroupEntry>,
    /// SHA-256 of the canonical plaintext
    #[serde(with = "b64_vec")]
    pub transaction_hash: Vec<u8>,
}

/// The dual-signer slots of a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Signatures {
    /// Set at issuance
    #[serde(default)]
    pub seller: Option<SignatureEntry>,
    /// Absent until the buyer countersigns; serialized as `null`
    #[serde(default)]
    pub buyer: Option<SignatureEntry>,
}

/// One signature over the transaction hash
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignatureEntry {
    /// The signing company's name
    pub company: String,
    /// Ed25519 signature over `transaction_hash`
    pub signature: Signature,
}

/// The disclosure record for one group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupEntry {
    /// Envelope per member at issuance time, each carrying the group key
    pub members: BTreeMap<String, WrappedKey>,
    /// AES-GCM of the data key under the group key; the bridge members
    /// cross to reach the transaction
    pub data_key_bridge: EncryptedPayload,
}

impl ProtectedDocument {
    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize for the wire.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize human-readably, for files and terminals.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// TESTS
// ============================================================================
