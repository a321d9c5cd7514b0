//! # Transaction Model
//!
//! The plaintext Delivery-versus-Payment record. Seven fields are
//! required; anything else the parties put in the document is preserved
//! verbatim through protection and recovery.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::canonical;
use crate::error::{Error, Result};

/// Field names every transaction must carry
pub const REQUIRED_FIELDS: [&str; 7] = [
    "id",
    "timestamp",
    "seller",
    "buyer",
    "product",
    "units",
    "amount",
];

/// A plaintext DvP transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: u64,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    /// Seller company name
    pub seller: String,
    /// Buyer company name
    pub buyer: String,
    /// What is being delivered
    pub product: String,
    /// Quantity delivered
    pub units: u64,
    /// Price in minor currency units
    pub amount: u64,
    /// Any additional fields, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    /// Parse a transaction from loose JSON, reporting the first absent
    /// required field by name.
    pub fn from_value(value: Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| Error::InvalidDocument {
            detail: "transaction must be a JSON object".into(),
        })?;

        for field in REQUIRED_FIELDS {
            if !object.contains_key(field) {
                return Err(Error::MissingField { name: field.into() });
            }
        }

        serde_json::from_value(value).map_err(|e| Error::InvalidDocument {
            detail: format!("malformed transaction: {e}"),
        })
    }

    /// Canonical JSON byte form — what gets hashed, signed, and encrypted.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        canonical::to_canonical_vec(self)
    }

    /// SHA-256 of the canonical byte form.
    pub fn hash(&self) -> Result<[u8; 32]> {
        Ok(canonical::sha256(&self.canonical_bytes()?))
    }

    /// Check the declared parties against the plaintext.
    pub fn check_parties(&self, seller: &str, buyer: &str) -> Result<()> {
        if self.seller != seller {
            return Err(Error::FieldMismatch {
                field: "seller",
                expected: seller.into(),
                found: self.seller.clone(),
            });
        }
        if self.buyer != buyer {
            return Err(Error::FieldMismatch {
                field: "buyer",
                expected: buyer.into(),
                found: self.buyer.clone(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
