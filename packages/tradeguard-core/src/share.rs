//! # Share Records
//!
//! Signed, canonical audit records for disclosures. When a party hands a
//! protected document to someone new — an individual or a group — it
//! publishes a record of having done so, signed with its own key. Any
//! auditor (the seller in particular) can later verify who disclosed what
//! to whom without being able to forge or repudiate a record.
//!
//! The signed message is the SHA-256 of the canonical JSON of exactly the
//! identifying fields; the storage service attaches its own timestamp on
//! receipt, outside the signature.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::canonical;
use crate::crypto::{sign, verify, Signature};
use crate::directory::{CompanyKeyDirectory, PrivateKeyVault};
use crate::error::Result;

/// A signed disclosure to a named individual
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShareRecord {
    /// The disclosed transaction
    pub transaction_id: u64,
    /// Who performed the disclosure (and signed this record)
    pub shared_by: String,
    /// Who received access
    pub shared_with: String,
    /// Ed25519 signature by `shared_by` over the canonical record hash
    pub signature: Signature,
}

/// A signed disclosure to a group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupShareRecord {
    /// The disclosed transaction
    pub transaction_id: u64,
    /// Who performed the disclosure (and signed this record)
    pub shared_by: String,
    /// The group that received access
    pub group_id: String,
    /// Ed25519 signature by `shared_by` over the canonical record hash
    pub signature: Signature,
}

fn individual_record_hash(
    transaction_id: u64,
    shared_by: &str,
    shared_with: &str,
) -> Result<[u8; 32]> {
    canonical::canonical_hash(&json!({
        "transaction_id": transaction_id,
        "shared_by": shared_by,
        "shared_with": shared_with,
    }))
}

fn group_record_hash(transaction_id: u64, shared_by: &str, group_id: &str) -> Result<[u8; 32]> {
    canonical::canonical_hash(&json!({
        "transaction_id": transaction_id,
        "shared_by": shared_by,
        "group_id": group_id,
    }))
}

/// Issue a signed record of disclosing a transaction to an individual.
pub fn share_individual<V: PrivateKeyVault>(
    transaction_id: u64,
    shared_by: &str,
    shared_with: &str,
    vault: &V,
) -> Result<ShareRecord> {
    let hash = individual_record_hash(transaction_id, shared_by, shared_with)?;
    let signing_key = vault.signing(shared_by)?;

    Ok(ShareRecord {
        transaction_id,
        shared_by: shared_by.to_owned(),
        shared_with: shared_with.to_owned(),
        signature: sign(&signing_key, &hash),
    })
}

/// Issue a signed record of disclosing a transaction to a group.
pub fn share_group<V: PrivateKeyVault>(
    transaction_id: u64,
    shared_by: &str,
    group_id: &str,
    vault: &V,
) -> Result<GroupShareRecord> {
    let hash = group_record_hash(transaction_id, shared_by, group_id)?;
    let signing_key = vault.signing(shared_by)?;

    Ok(GroupShareRecord {
        transaction_id,
        shared_by: shared_by.to_owned(),
        group_id: group_id.to_owned(),
        signature: sign(&signing_key, &hash),
    })
}

/// Audit an individual share record: recompute the canonical hash and
/// verify the issuer's signature against the directory.
pub fn verify_share_record<D: CompanyKeyDirectory>(
    record: &ShareRecord,
    directory: &D,
) -> Result<()> {
    let hash =
        individual_record_hash(record.transaction_id, &record.shared_by, &record.shared_with)?;
    let keys = directory.lookup(&record.shared_by)?;
    verify(&keys.signing, &hash, &record.signature)
}

/// Audit a group share record.
pub fn verify_group_share_record<D: CompanyKeyDirectory>(
    record: &GroupShareRecord,
    directory: &D,
) -> Result<()> {
    let hash = group_record_hash(record.transaction_id, &record.shared_by, &record.group_id)?;
    let keys = directory.lookup(&record.shared_by)?;
    verify(&keys.signing, &hash, &record.signature)
}

// ============================================================================
// TESTS
// ============================================================================
