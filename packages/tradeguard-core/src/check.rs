//! # Document Verification
//!
//! Structural and signature checks over a protected document. `check`
//! requires no key material beyond the public directory and is callable by
//! any party holding the document — including the storage operator, who
//! never sees plaintext.
//!
//! `check` never fails: it walks every finding it can reach, records
//! errors and warnings, and returns a report. A single-signed document is
//! legal (the buyer countersigns later), so a missing buyer signature is a
//! warning; a *present but wrong* signature from either party is fatal to
//! validity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::{verify, HASH_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::directory::CompanyKeyDirectory;
use crate::document::{ProtectedDocument, SignatureEntry, DOCUMENT_VERSION};

/// Outcome of verifying one signature slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureStatus {
    /// Present and verified against the published key
    Valid,
    /// Present but failed verification
    Invalid,
    /// Slot not yet filled
    Missing,
    /// Present, but the signer's public key is not in the directory
    CannotVerify,
}

impl fmt::Display for SignatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Missing => "missing",
            Self::CannotVerify => "cannot_verify",
        };
        f.write_str(s)
    }
}

/// Per-aspect findings of a verification pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationDetails {
    /// Seller signature status
    pub seller_signature: SignatureStatus,
    /// Buyer signature status
    pub buyer_signature: SignatureStatus,
    /// Number of individual wrapped-key envelopes
    pub individual_recipients: usize,
    /// Number of group disclosure entries
    pub groups: usize,
}

/// The full result of a verification pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True when no fatal finding was recorded
    pub valid: bool,
    /// Per-aspect findings
    pub details: VerificationDetails,
    /// Non-fatal observations
    pub warnings: Vec<String>,
    /// Fatal findings
    pub errors: Vec<String>,
}

/// Verify a protected document's structure and signatures.
pub fn check<D: CompanyKeyDirectory>(
    document: &ProtectedDocument,
    directory: &D,
) -> VerificationReport {
    let mut valid = true;
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    if document.version != DOCUMENT_VERSION {
        warnings.push(format!("unknown version: {}", document.version));
    }

    let body = &document.encrypted_transaction;
    if body.nonce.len() != NONCE_SIZE || body.ciphertext.len() < TAG_SIZE {
        valid = false;
        errors.push("encrypted transaction malformed".into());
    }

    if document.transaction_hash.len() != HASH_SIZE {
        valid = false;
        errors.push(format!(
            "transaction hash must be {HASH_SIZE} bytes, got {}",
            document.transaction_hash.len()
        ));
    }

    let seller_signature = match &document.signatures.seller {
        Some(entry) => {
            let status = verify_entry(entry, &document.transaction_hash, directory);
            match status {
                SignatureStatus::Invalid => {
                    valid = false;
                    errors.push("seller signature verification failed".into());
                }
                SignatureStatus::CannotVerify => {
                    warnings.push(format!(
                        "cannot verify seller signature: public key not found for {}",
                        entry.company
                    ));
                }
                _ => {}
            }
            status
        }
        None => {
            valid = false;
            errors.push("seller signature missing".into());
            SignatureStatus::Missing
        }
    };

    let buyer_signature = match &document.signatures.buyer {
        Some(entry) => {
            let status = verify_entry(entry, &document.transaction_hash, directory);
            match status {
                SignatureStatus::Invalid => {
                    valid = false;
                    errors.push("buyer signature verification failed".into());
                }
                SignatureStatus::CannotVerify => {
                    warnings.push(format!(
                        "cannot verify buyer signature: public key not found for {}",
                        entry.company
                    ));
                }
                _ => {}
            }
            status
        }
        None => {
            warnings.push("buyer signature not yet added".into());
            SignatureStatus::Missing
        }
    };

    VerificationReport {
        valid,
        details: VerificationDetails {
            seller_signature,
            buyer_signature,
            individual_recipients: document.wrapped_keys.len(),
            groups: document.group_wrapped_keys.len(),
        },
        warnings,
        errors,
    }
}

fn verify_entry<D: CompanyKeyDirectory>(
    entry: &SignatureEntry,
    message: &[u8],
    directory: &D,
) -> SignatureStatus {
    let keys = match directory.lookup(&entry.company) {
        Ok(keys) => keys,
        // A directory failure means the signature cannot be checked, not
        // that it is wrong.
        Err(_) => return SignatureStatus::CannotVerify,
    };

    match verify(&keys.signing, message, &entry.signature) {
        Ok(()) => SignatureStatus::Valid,
        Err(_) => SignatureStatus::Invalid,
    }
}

// ============================================================================
// TESTS
// ============================================================================
