//! # Unprotection
//!
//! Access-path selection and decryption for an authorized caller.
//!
//! ## Access Paths
//!
//! ```text
//! 1. Individual   wrapped_keys[caller] ── unwrap ──────────────► K_T
//!
//! 2. Group        group.members[caller] ── unwrap ──► K_G
//!                 group.data_key_bridge ── AES-GCM⁻¹(K_G) ─────► K_T
//! ```
//!
//! The first matching path wins; the individual path is tried first. A
//! matched envelope or bridge that fails tag authentication is surfaced as
//! [`Error::DecryptAuth`] — it indicates tampering and never silently
//! falls through to another path. A caller with no envelope anywhere gets
//! [`Error::NoAccess`].

use std::fmt;

use tracing::debug;

use crate::crypto::{decrypt, unwrap_key, DataKey};
use crate::directory::PrivateKeyVault;
use crate::document::ProtectedDocument;
use crate::error::{Error, Result};
use crate::transaction::Transaction;

/// How the caller reached the data key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessMethod {
    /// Through the caller's own wrapped-key envelope
    Individual,
    /// Through membership in the named group at issuance time
    Group(String),
}

impl fmt::Display for AccessMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual => f.write_str("individual"),
            Self::Group(id) => write!(f, "group:{id}"),
        }
    }
}

/// A recovered plaintext and the path that yielded it
#[derive(Debug)]
pub struct UnprotectedTransaction {
    /// The decrypted, parsed plaintext
    pub transaction: Transaction,
    /// Which access path succeeded
    pub access_method: AccessMethod,
}

/// Decrypt a protected document as `company`.
///
/// The vault must hold `company`'s encryption private key; the document
/// must carry an envelope for it, individually or through a group
/// membership snapshot.
pub fn unprotect<V: PrivateKeyVault>(
    document: &ProtectedDocument,
    company: &str,
    vault: &V,
) -> Result<UnprotectedTransaction> {
    let (data_key, access_method) = locate_data_key(document, company, vault)?;

    let plaintext = decrypt(&data_key, &document.encrypted_transaction)?;
    let transaction: Transaction = serde_json::from_slice(&plaintext)?;

    debug!(company = %company, method = %access_method, "document unprotected");

    Ok(UnprotectedTransaction {
        transaction,
        access_method,
    })
}

fn locate_data_key<V: PrivateKeyVault>(
    document: &ProtectedDocument,
    company: &str,
    vault: &V,
) -> Result<(DataKey, AccessMethod)> {
    if let Some(envelope) = document.wrapped_keys.get(company) {
        let encryption_key = vault.encryption(company)?;
        let data_key = unwrap_key(&encryption_key, envelope)?;
        return Ok((data_key, AccessMethod::Individual));
    }

    for (group_id, entry) in &document.group_wrapped_keys {
        if let Some(envelope) = entry.members.get(company) {
            let encryption_key = vault.encryption(company)?;
            let group_key = unwrap_key(&encryption_key, envelope)?;

            let data_key_bytes = decrypt(&group_key, &entry.data_key_bridge)?;
            let data_key = DataKey::from_slice(&data_key_bytes)?;

            return Ok((data_key, AccessMethod::Group(group_id.clone())));
        }
    }

    Err(Error::NoAccess {
        company: company.into(),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CompanyKeyPair;
    use crate::directory::{MemoryDirectory, MemoryGroups, MemoryVault};
    use crate::protect::protect;
    use serde_json::json;

    struct Fixture {
        directory: MemoryDirectory,
        vault: MemoryVault,
        groups: MemoryGroups,
        transaction: Transaction,
    }

    fn fixture(companies: &[&str]) -> Fixture {
        let mut directory = MemoryDirectory::new();
        let mut vault = MemoryVault::new();
        for company in companies {
            let kp = CompanyKeyPair::generate();
            directory.register(company, kp.public_keys());
            vault.insert(company, &kp);
        }

        let transaction = Transaction::from_value(json!({
            "id": 123,
            "timestamp": 1766336340i64,
            "seller": "ChingChongExtractions",
            "buyer": "LaysChips",
            "product": "Indium",
            "units": 40000,
            "amount": 90000000,
        }))
        .unwrap();

        Fixture {
            directory,
            vault,
            groups: MemoryGroups::new(),
            transaction,
        }
    }

    fn run_protect(fx: &Fixture, recipients: &[String], groups: &[String]) -> ProtectedDocument {
        protect(
            &fx.transaction,
            "ChingChongExtractions",
            "LaysChips",
            recipients,
            groups,
            &fx.directory,
            &fx.vault,
            &fx.groups,
        )
        .unwrap()
        .document
    }

    #[test]
    fn test_buyer_recovers_plaintext_individually() {
        let fx = fixture(&["ChingChongExtractions", "LaysChips"]);
        let document = run_protect(&fx, &[], &[]);

        let result = unprotect(&document, "LaysChips", &fx.vault).unwrap();

        assert_eq!(result.transaction, fx.transaction);
        assert_eq!(result.access_method, AccessMethod::Individual);
    }

    #[test]
    fn test_seller_recovers_plaintext_individually() {
        let fx = fixture(&["ChingChongExtractions", "LaysChips"]);
        let document = run_protect(&fx, &[], &[]);

        let result = unprotect(&document, "ChingChongExtractions", &fx.vault).unwrap();
        assert_eq!(result.transaction, fx.transaction);
    }

    #[test]
    fn test_extra_recipient_has_access_stranger_does_not() {
        let fx = fixture(&[
            "ChingChongExtractions",
            "LaysChips",
            "AuditorCorp",
            "RandomCo",
        ]);
        let document = run_protect(&fx, &["AuditorCorp".into()], &[]);

        let result = unprotect(&document, "AuditorCorp", &fx.vault).unwrap();
        assert_eq!(result.access_method, AccessMethod::Individual);

        // RandomCo holds keys but no envelope.
        let denied = unprotect(&document, "RandomCo", &fx.vault);
        assert!(matches!(denied, Err(Error::NoAccess { company }) if company == "RandomCo"));
    }

    #[test]
    fn test_group_member_crosses_the_bridge() {
        let mut fx = fixture(&["ChingChongExtractions", "LaysChips", "AuditorCorp"]);
        fx.groups.add_member("tech_partners", "AuditorCorp");
        let document = run_protect(&fx, &[], &["tech_partners".into()]);

        let result = unprotect(&document, "AuditorCorp", &fx.vault).unwrap();

        assert_eq!(result.transaction, fx.transaction);
        assert_eq!(
            result.access_method,
            AccessMethod::Group("tech_partners".into())
        );
        assert_eq!(result.access_method.to_string(), "group:tech_partners");
    }

    #[test]
    fn test_late_joiner_stays_locked_out() {
        let mut fx = fixture(&[
            "ChingChongExtractions",
            "LaysChips",
            "AuditorCorp",
            "LateJoiner",
        ]);
        fx.groups.add_member("tech_partners", "AuditorCorp");
        let document = run_protect(&fx, &[], &["tech_partners".into()]);

        // Membership changes after issuance grant nothing.
        fx.groups.add_member("tech_partners", "LateJoiner");

        let denied = unprotect(&document, "LateJoiner", &fx.vault);
        assert!(matches!(denied, Err(Error::NoAccess { .. })));
    }

    #[test]
    fn test_individual_path_preferred_over_group() {
        let mut fx = fixture(&["ChingChongExtractions", "LaysChips", "AuditorCorp"]);
        fx.groups.add_member("tech_partners", "AuditorCorp");
        let document = run_protect(
            &fx,
            &["AuditorCorp".into()],
            &["tech_partners".into()],
        );

        let result = unprotect(&document, "AuditorCorp", &fx.vault).unwrap();
        assert_eq!(result.access_method, AccessMethod::Individual);
    }

    #[test]
    fn test_corrupted_body_fails_auth_for_authorized_caller() {
        let fx = fixture(&["ChingChongExtractions", "LaysChips"]);
        let mut document = run_protect(&fx, &[], &[]);
        document.encrypted_transaction.ciphertext[0] ^= 0x01;

        let result = unprotect(&document, "LaysChips", &fx.vault);
        assert!(matches!(result, Err(Error::DecryptAuth)));
    }

    #[test]
    fn test_corrupted_envelope_surfaces_not_falls_through() {
        let mut fx = fixture(&["ChingChongExtractions", "LaysChips", "AuditorCorp"]);
        fx.groups.add_member("tech_partners", "AuditorCorp");
        let mut document = run_protect(
            &fx,
            &["AuditorCorp".into()],
            &["tech_partners".into()],
        );

        // Tamper with the individual envelope; the caller is also a group
        // member, but a matched envelope that fails authentication must
        // surface rather than quietly trying the group path.
        document
            .wrapped_keys
            .get_mut("AuditorCorp")
            .unwrap()
            .encrypted_key
            .ciphertext[0] ^= 0x01;

        let result = unprotect(&document, "AuditorCorp", &fx.vault);
        assert!(matches!(result, Err(Error::DecryptAuth)));
    }

    #[test]
    fn test_corrupted_bridge_fails_auth() {
        let mut fx = fixture(&["ChingChongExtractions", "LaysChips", "AuditorCorp"]);
        fx.groups.add_member("tech_partners", "AuditorCorp");
        let mut document = run_protect(&fx, &[], &["tech_partners".into()]);

        document
            .group_wrapped_keys
            .get_mut("tech_partners")
            .unwrap()
            .data_key_bridge
            .ciphertext[0] ^= 0x01;

        let result = unprotect(&document, "AuditorCorp", &fx.vault);
        assert!(matches!(result, Err(Error::DecryptAuth)));
    }

    #[test]
    fn test_caller_without_vault_keys_errors() {
        let fx = fixture(&["ChingChongExtractions", "LaysChips"]);
        let document = run_protect(&fx, &[], &[]);

        let empty_vault = MemoryVault::new();
        let result = unprotect(&document, "LaysChips", &empty_vault);
        assert!(matches!(result, Err(Error::UnknownCompany { .. })));
    }
}
