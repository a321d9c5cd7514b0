//! # Protection
//!
//! Assembly of a protected document from a plaintext transaction.
//!
//! ## Flow
//!
//! ```text
//! plaintext ── canonicalize ──► M
//!                               ├── SHA-256 ──► h ── Ed25519(seller) ──► σ_s
//!                               └── AES-GCM(K_T) ──► encrypted_transaction
//!
//! K_T (fresh, 32 random bytes)
//!   ├── wrap for seller, buyer, each recipient ──► wrapped_keys
//!   └── per requested group:
//!         members ◄── GroupDirectory (snapshot at this instant)
//!         K_G = HKDF(K_T, "group:{id}:tx:{tx}")
//!         wrap K_G per member, bridge = AES-GCM(K_G, K_T)
//!                                              ──► group_wrapped_keys
//! ```
//!
//! Seller and buyer failures are fatal. An extra recipient or group that
//! cannot be resolved is skipped and reported as a structured warning; the
//! document is still emitted. All key material is scrubbed before return.

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;
use zeroize::Zeroizing;

use crate::canonical;
use crate::crypto::{
    derive_group_key, encrypt, sign, wrap_key, DataKey, Signature, HASH_SIZE,
};
use crate::directory::{CompanyKeyDirectory, GroupDirectory, PrivateKeyVault};
use crate::document::{
    GroupEntry, ProtectedDocument, SignatureEntry, Signatures, DOCUMENT_VERSION,
};
use crate::error::{Error, Result};
use crate::transaction::Transaction;

/// A successful protection plus everything the caller should know about
/// what was skipped
#[derive(Debug)]
pub struct ProtectOutcome {
    /// The assembled document
    pub document: ProtectedDocument,
    /// Optional-path conditions that degraded instead of aborting
    pub warnings: Vec<ProtectWarning>,
}

/// Non-fatal conditions recorded during protection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectWarning {
    /// An extra recipient has no published keys; no envelope was made
    UnknownRecipient {
        /// The unresolvable recipient
        name: String,
    },
    /// A requested group does not exist; it was skipped entirely
    UnknownGroup {
        /// The unresolvable group
        id: String,
    },
    /// A group member has no published keys; the rest of the group still
    /// received envelopes
    UnknownGroupMember {
        /// The group being processed
        group_id: String,
        /// The unresolvable member
        member: String,
    },
}

impl fmt::Display for ProtectWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRecipient { name } => {
                write!(f, "public keys not found for recipient {name}, skipping")
            }
            Self::UnknownGroup { id } => {
                write!(f, "group {id} not found, skipping")
            }
            Self::UnknownGroupMember { group_id, member } => {
                write!(f, "public keys not found for member {member} of group {group_id}")
            }
        }
    }
}

/// Protect a plaintext transaction for a dynamic recipient set.
///
/// Preconditions: the plaintext parties match `seller`/`buyer`, the vault
/// holds the seller's signing key, and the directory resolves both
/// mandatory parties. Each call draws a fresh data key and pulls fresh
/// group snapshots; nothing is cached or persisted.
pub fn protect<D, V, G>(
    transaction: &Transaction,
    seller: &str,
    buyer: &str,
    recipients: &[String],
    groups: &[String],
    directory: &D,
    vault: &V,
    group_directory: &G,
) -> Result<ProtectOutcome>
where
    D: CompanyKeyDirectory,
    V: PrivateKeyVault,
    G: GroupDirectory,
{
    transaction.check_parties(seller, buyer)?;

    let plaintext = Zeroizing::new(transaction.canonical_bytes()?);
    let transaction_hash = canonical::sha256(&plaintext);

    let seller_signing = vault.signing(seller)?;
    let seller_signature = sign(&seller_signing, &transaction_hash);

    let data_key = DataKey::random()?;
    let encrypted_transaction = encrypt(&data_key, &plaintext)?;

    let mut warnings = Vec::new();

    // Mandatory envelopes: a document the seller or buyer cannot open is
    // not a document worth emitting.
    let mut wrapped_keys = BTreeMap::new();
    wrapped_keys.insert(
        seller.to_owned(),
        wrap_key(&directory.lookup(seller)?.encryption, &data_key)?,
    );
    wrapped_keys.insert(
        buyer.to_owned(),
        wrap_key(&directory.lookup(buyer)?.encryption, &data_key)?,
    );

    for recipient in recipients {
        match directory.lookup(recipient) {
            Ok(keys) => {
                wrapped_keys.insert(recipient.clone(), wrap_key(&keys.encryption, &data_key)?);
            }
            Err(Error::UnknownCompany { .. }) => {
                warn!(recipient = %recipient, "skipping recipient without published keys");
                warnings.push(ProtectWarning::UnknownRecipient {
                    name: recipient.clone(),
                });
            }
            Err(other) => return Err(other),
        }
    }

    let mut group_wrapped_keys = BTreeMap::new();
    for group_id in groups {
        let members = match group_directory.members(group_id) {
            Ok(members) => members,
            Err(Error::UnknownGroup { .. }) => {
                warn!(group = %group_id, "skipping unknown group");
                warnings.push(ProtectWarning::UnknownGroup {
                    id: group_id.clone(),
                });
                continue;
            }
            Err(other) => return Err(other),
        };

        let group_key = derive_group_key(&data_key, group_id, transaction.id)?;

        let mut group_members = BTreeMap::new();
        for member in members {
            match directory.lookup(&member) {
                Ok(keys) => {
                    group_members.insert(member, wrap_key(&keys.encryption, &group_key)?);
                }
                Err(Error::UnknownCompany { .. }) => {
                    warn!(group = %group_id, member = %member, "skipping member without published keys");
                    warnings.push(ProtectWarning::UnknownGroupMember {
                        group_id: group_id.clone(),
                        member,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        let data_key_bridge = encrypt(&group_key, data_key.as_bytes())?;
        group_wrapped_keys.insert(
            group_id.clone(),
            GroupEntry {
                members: group_members,
                data_key_bridge,
            },
        );
    }

    let document = ProtectedDocument {
        version: DOCUMENT_VERSION.into(),
        transaction_id: transaction.id,
        encrypted_transaction,
        signatures: Signatures {
            seller: Some(SignatureEntry {
                company: seller.to_owned(),
                signature: seller_signature,
            }),
            buyer: None,
        },
        wrapped_keys,
        group_wrapped_keys,
        transaction_hash: transaction_hash.to_vec(),
    };

    Ok(ProtectOutcome { document, warnings })
}

/// Countersign a document as the buyer.
///
/// A pure builder: it signs the stored transaction hash and fills the
/// buyer slot. It refuses a document whose buyer slot is already occupied;
/// single-assignment across replicas remains the storage boundary's
/// contract.
pub fn buyer_sign<V>(
    mut document: ProtectedDocument,
    buyer: &str,
    vault: &V,
) -> Result<ProtectedDocument>
where
    V: PrivateKeyVault,
{
    if document.signatures.buyer.is_some() {
        return Err(Error::InvalidDocument {
            detail: "buyer signature already present".into(),
        });
    }
    if document.transaction_hash.len() != HASH_SIZE {
        return Err(Error::InvalidDocument {
            detail: format!(
                "transaction hash must be {HASH_SIZE} bytes, got {}",
                document.transaction_hash.len()
            ),
        });
    }

    let buyer_signing = vault.signing(buyer)?;
    let signature: Signature = sign(&buyer_signing, &document.transaction_hash);

    document.signatures.buyer = Some(SignatureEntry {
        company: buyer.to_owned(),
        signature,
    });

    Ok(document)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{verify, CompanyKeyPair};
    use crate::directory::{MemoryDirectory, MemoryGroups, MemoryVault};
    use serde_json::json;

    struct Fixture {
        directory: MemoryDirectory,
        vault: MemoryVault,
        groups: MemoryGroups,
    }

    fn fixture(companies: &[&str]) -> Fixture {
        let mut directory = MemoryDirectory::new();
        let mut vault = MemoryVault::new();
        for company in companies {
            let kp = CompanyKeyPair::generate();
            directory.register(company, kp.public_keys());
            vault.insert(company, &kp);
        }
        Fixture {
            directory,
            vault,
            groups: MemoryGroups::new(),
        }
    }

    fn sample_transaction() -> Transaction {
        Transaction::from_value(json!({
            "id": 123,
            "timestamp": 1766336340i64,
            "seller": "ChingChongExtractions",
            "buyer": "LaysChips",
            "product": "Indium",
            "units": 40000,
            "amount": 90000000,
        }))
        .unwrap()
    }

    #[test]
    fn test_protect_basic_document() {
        let fx = fixture(&["ChingChongExtractions", "LaysChips"]);
        let tx = sample_transaction();

        let outcome = protect(
            &tx,
            "ChingChongExtractions",
            "LaysChips",
            &[],
            &[],
            &fx.directory,
            &fx.vault,
            &fx.groups,
        )
        .unwrap();

        let doc = &outcome.document;
        assert!(outcome.warnings.is_empty());
        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.transaction_id, 123);
        assert_eq!(doc.wrapped_keys.len(), 2);
        assert!(doc.wrapped_keys.contains_key("ChingChongExtractions"));
        assert!(doc.wrapped_keys.contains_key("LaysChips"));
        assert!(doc.signatures.buyer.is_none());
        assert_eq!(doc.transaction_hash, tx.hash().unwrap().to_vec());
    }

    #[test]
    fn test_seller_signature_verifies() {
        let fx = fixture(&["ChingChongExtractions", "LaysChips"]);
        let tx = sample_transaction();

        let outcome = protect(
            &tx,
            "ChingChongExtractions",
            "LaysChips",
            &[],
            &[],
            &fx.directory,
            &fx.vault,
            &fx.groups,
        )
        .unwrap();

        let entry = outcome.document.signatures.seller.as_ref().unwrap();
        let keys = fx.directory.lookup("ChingChongExtractions").unwrap();
        assert!(verify(
            &keys.signing,
            &outcome.document.transaction_hash,
            &entry.signature
        )
        .is_ok());
    }

    #[test]
    fn test_party_mismatch_is_fatal() {
        let fx = fixture(&["ChingChongExtractions", "LaysChips"]);
        let tx = sample_transaction();

        let result = protect(
            &tx,
            "LaysChips",
            "ChingChongExtractions",
            &[],
            &[],
            &fx.directory,
            &fx.vault,
            &fx.groups,
        );
        assert!(matches!(result, Err(Error::FieldMismatch { .. })));
    }

    #[test]
    fn test_unknown_buyer_is_fatal() {
        // Seller can sign, but the buyer never registered keys.
        let fx = fixture(&["ChingChongExtractions"]);

        let result = protect(
            &sample_transaction(),
            "ChingChongExtractions",
            "LaysChips",
            &[],
            &[],
            &fx.directory,
            &fx.vault,
            &fx.groups,
        );
        assert!(matches!(result, Err(Error::UnknownCompany { name }) if name == "LaysChips"));
    }

    #[test]
    fn test_unknown_recipient_degrades_to_warning() {
        let fx = fixture(&["ChingChongExtractions", "LaysChips", "AuditorCorp"]);

        let outcome = protect(
            &sample_transaction(),
            "ChingChongExtractions",
            "LaysChips",
            &["AuditorCorp".into(), "GhostCo".into()],
            &[],
            &fx.directory,
            &fx.vault,
            &fx.groups,
        )
        .unwrap();

        assert!(outcome.document.wrapped_keys.contains_key("AuditorCorp"));
        assert!(!outcome.document.wrapped_keys.contains_key("GhostCo"));
        assert_eq!(
            outcome.warnings,
            vec![ProtectWarning::UnknownRecipient {
                name: "GhostCo".into()
            }]
        );
    }

    #[test]
    fn test_unknown_group_degrades_to_warning() {
        let fx = fixture(&["ChingChongExtractions", "LaysChips"]);

        let outcome = protect(
            &sample_transaction(),
            "ChingChongExtractions",
            "LaysChips",
            &[],
            &["no_such_group".into()],
            &fx.directory,
            &fx.vault,
            &fx.groups,
        )
        .unwrap();

        assert!(outcome.document.group_wrapped_keys.is_empty());
        assert_eq!(
            outcome.warnings,
            vec![ProtectWarning::UnknownGroup {
                id: "no_such_group".into()
            }]
        );
    }

    #[test]
    fn test_group_members_get_envelopes_and_bridge() {
        let mut fx = fixture(&["ChingChongExtractions", "LaysChips", "AuditorCorp"]);
        fx.groups.add_member("tech_partners", "AuditorCorp");
        fx.groups.add_member("tech_partners", "Unregistered");

        let outcome = protect(
            &sample_transaction(),
            "ChingChongExtractions",
            "LaysChips",
            &[],
            &["tech_partners".into()],
            &fx.directory,
            &fx.vault,
            &fx.groups,
        )
        .unwrap();

        let entry = &outcome.document.group_wrapped_keys["tech_partners"];
        assert!(entry.members.contains_key("AuditorCorp"));
        assert!(!entry.members.contains_key("Unregistered"));
        assert!(!entry.data_key_bridge.ciphertext.is_empty());
        assert_eq!(
            outcome.warnings,
            vec![ProtectWarning::UnknownGroupMember {
                group_id: "tech_partners".into(),
                member: "Unregistered".into()
            }]
        );
    }

    #[test]
    fn test_membership_snapshot_is_frozen() {
        let mut fx = fixture(&[
            "ChingChongExtractions",
            "LaysChips",
            "AuditorCorp",
            "LateJoiner",
        ]);
        fx.groups.add_member("tech_partners", "AuditorCorp");

        let outcome = protect(
            &sample_transaction(),
            "ChingChongExtractions",
            "LaysChips",
            &[],
            &["tech_partners".into()],
            &fx.directory,
            &fx.vault,
            &fx.groups,
        )
        .unwrap();

        // Joining after issuance must not create an envelope.
        fx.groups.add_member("tech_partners", "LateJoiner");

        let entry = &outcome.document.group_wrapped_keys["tech_partners"];
        assert!(entry.members.contains_key("AuditorCorp"));
        assert!(!entry.members.contains_key("LateJoiner"));
    }

    #[test]
    fn test_no_plaintext_leaks_into_document() {
        let fx = fixture(&["ChingChongExtractions", "LaysChips"]);
        let tx = sample_transaction();

        let outcome = protect(
            &tx,
            "ChingChongExtractions",
            "LaysChips",
            &[],
            &[],
            &fx.directory,
            &fx.vault,
            &fx.groups,
        )
        .unwrap();

        let serialized = outcome.document.to_json().unwrap();
        // The company names appear in signature slots and key maps by
        // design; the traded product and quantities must not.
        assert!(!serialized.contains("Indium"));
        assert!(!serialized.contains("40000"));
        assert!(!serialized.contains("90000000"));
    }

    #[test]
    fn test_buyer_sign_fills_slot_once() {
        let fx = fixture(&["ChingChongExtractions", "LaysChips"]);

        let outcome = protect(
            &sample_transaction(),
            "ChingChongExtractions",
            "LaysChips",
            &[],
            &[],
            &fx.directory,
            &fx.vault,
            &fx.groups,
        )
        .unwrap();

        let signed = buyer_sign(outcome.document, "LaysChips", &fx.vault).unwrap();
        let entry = signed.signatures.buyer.as_ref().unwrap();
        assert_eq!(entry.company, "LaysChips");

        let keys = fx.directory.lookup("LaysChips").unwrap();
        assert!(verify(&keys.signing, &signed.transaction_hash, &entry.signature).is_ok());

        // Second countersign refused.
        let result = buyer_sign(signed, "LaysChips", &fx.vault);
        assert!(matches!(result, Err(Error::InvalidDocument { .. })));
    }
}
