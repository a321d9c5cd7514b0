//! # Key and Group Directories
//!
//! The three narrow interfaces the engine consumes. Concrete
//! implementations may be in-process maps (tests, demos) or network-backed
//! services; the engine never references a concrete variant and performs no
//! caching — every `protect` call pulls fresh snapshots, so later
//! membership changes cannot retroactively grant or withhold access to
//! documents already issued.

use std::collections::HashMap;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{CompanyKeyPair, CompanyPublicKeys, EncryptionKeyPair, SigningKeyPair};
use crate::error::{Error, Result};

/// Public-key lookup by company name
pub trait CompanyKeyDirectory {
    /// Resolve a company's published key bundle, or
    /// [`Error::UnknownCompany`].
    fn lookup(&self, name: &str) -> Result<CompanyPublicKeys>;
}

/// Private-key retrieval for companies the local principal controls.
///
/// Implementations return owned key material that zeroizes on drop.
pub trait PrivateKeyVault {
    /// The company's Ed25519 signing keypair, or [`Error::UnknownCompany`].
    fn signing(&self, name: &str) -> Result<SigningKeyPair>;

    /// The company's X25519 encryption keypair, or
    /// [`Error::UnknownCompany`].
    fn encryption(&self, name: &str) -> Result<EncryptionKeyPair>;
}

/// Group-membership snapshots.
pub trait GroupDirectory {
    /// The authoritative member list at the instant of the call, or
    /// [`Error::UnknownGroup`].
    fn members(&self, group_id: &str) -> Result<Vec<String>>;
}

// ============================================================================
// IN-MEMORY IMPLEMENTATIONS
// ============================================================================

/// In-process company key directory backed by a map.
#[derive(Debug, Default, Clone)]
pub struct MemoryDirectory {
    companies: HashMap<String, CompanyPublicKeys>,
}

impl MemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish (or replace) a company's key bundle
    pub fn register(&mut self, name: &str, keys: CompanyPublicKeys) {
        self.companies.insert(name.to_owned(), keys);
    }
}

impl CompanyKeyDirectory for MemoryDirectory {
    fn lookup(&self, name: &str) -> Result<CompanyPublicKeys> {
        self.companies
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownCompany { name: name.into() })
    }
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct VaultEntry {
    signing: [u8; 32],
    encryption: [u8; 32],
}

/// In-process private-key vault backed by a map.
///
/// Secret bytes are zeroized when the vault is dropped.
#[derive(Default)]
pub struct MemoryVault {
    keys: HashMap<String, VaultEntry>,
}

impl MemoryVault {
    /// Create an empty vault
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a company's private key material
    pub fn insert(&mut self, name: &str, keypair: &CompanyKeyPair) {
        self.keys.insert(
            name.to_owned(),
            VaultEntry {
                signing: keypair.signing.secret_bytes(),
                encryption: keypair.encryption.secret_bytes(),
            },
        );
    }

    fn entry(&self, name: &str) -> Result<&VaultEntry> {
        self.keys
            .get(name)
            .ok_or_else(|| Error::UnknownCompany { name: name.into() })
    }
}

impl PrivateKeyVault for MemoryVault {
    fn signing(&self, name: &str) -> Result<SigningKeyPair> {
        Ok(SigningKeyPair::from_bytes(&self.entry(name)?.signing))
    }

    fn encryption(&self, name: &str) -> Result<EncryptionKeyPair> {
        Ok(EncryptionKeyPair::from_bytes(&self.entry(name)?.encryption))
    }
}

/// In-process group registry backed by a map.
#[derive(Debug, Default, Clone)]
pub struct MemoryGroups {
    groups: HashMap<String, Vec<String>>,
}

impl MemoryGroups {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group (or reset its membership)
    pub fn create(&mut self, group_id: &str) {
        self.groups.insert(group_id.to_owned(), Vec::new());
    }

    /// Add a member; creates the group if absent
    pub fn add_member(&mut self, group_id: &str, member: &str) {
        let members = self.groups.entry(group_id.to_owned()).or_default();
        if !members.iter().any(|m| m == member) {
            members.push(member.to_owned());
        }
    }

    /// Remove a member if present
    pub fn remove_member(&mut self, group_id: &str, member: &str) {
        if let Some(members) = self.groups.get_mut(group_id) {
            members.retain(|m| m != member);
        }
    }
}

impl GroupDirectory for MemoryGroups {
    fn members(&self, group_id: &str) -> Result<Vec<String>> {
        self.groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| Error::UnknownGroup { id: group_id.into() })
    }
}

// ============================================================================
// TESTS
// ============================================================================
