//! On-disk stands-ins for the engine's external collaborators.
//!
//! Three file-backed stores, one per injected interface:
//!
//! - [`FsKeyStore`] — private keys under `keys/<company>/`, one raw
//!   32-byte file per key, readable only by the local principal.
//! - [`PublicKeyFile`] — the public-key directory, a single JSON map from
//!   company name to its registration payload.
//! - [`FileGroupRegistry`] — group membership, a JSON map from group id
//!   to member list. Read on every lookup so `protect` snapshots whatever
//!   is on disk at that instant.
//!
//! A production deployment swaps these for network-backed clients behind
//! the same traits; the engine never knows the difference.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tradeguard_core::crypto::{
    CompanyKeyPair, CompanyPublicKeys, CompanyRegistration, EncryptionKeyPair, SigningKeyPair,
};
use tradeguard_core::{
    CompanyKeyDirectory, Error, GroupDirectory, PrivateKeyVault, Result,
};

const SIGNING_KEY_FILE: &str = "signing_private.key";
const ENCRYPTION_KEY_FILE: &str = "encryption_private.key";

/// Private-key files under a root directory, one subdirectory per company
pub struct FsKeyStore {
    root: PathBuf,
}

impl FsKeyStore {
    /// Open a key store rooted at `root`; the directory is created lazily
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Generate both key pairs for a company, persist the private halves,
    /// and return the registration payload for the public directory.
    pub fn generate(&self, company: &str) -> Result<CompanyRegistration> {
        let keypair = CompanyKeyPair::generate();

        let dir = self.root.join(company);
        fs::create_dir_all(&dir)
            .map_err(|e| Error::KeyStore(format!("cannot create {}: {e}", dir.display())))?;

        write_key(&dir.join(SIGNING_KEY_FILE), &keypair.signing.secret_bytes())?;
        write_key(
            &dir.join(ENCRYPTION_KEY_FILE),
            &keypair.encryption.secret_bytes(),
        )?;

        Ok(keypair.registration(company))
    }

    fn read_key(&self, company: &str, file: &str) -> Result<[u8; 32]> {
        let path = self.root.join(company).join(file);
        if !path.exists() {
            return Err(Error::UnknownCompany {
                name: company.into(),
            });
        }
        let bytes = fs::read(&path)
            .map_err(|e| Error::KeyStore(format!("cannot read {}: {e}", path.display())))?;
        bytes.as_slice().try_into().map_err(|_| {
            Error::KeyStore(format!(
                "{} must hold exactly 32 bytes, found {}",
                path.display(),
                bytes.len()
            ))
        })
    }
}

fn write_key(path: &Path, bytes: &[u8; 32]) -> Result<()> {
    fs::write(path, bytes)
        .map_err(|e| Error::KeyStore(format!("cannot write {}: {e}", path.display())))?;
    // Private keys are for the local principal only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms)
            .map_err(|e| Error::KeyStore(format!("cannot restrict {}: {e}", path.display())))?;
    }
    Ok(())
}

impl PrivateKeyVault for FsKeyStore {
    fn signing(&self, name: &str) -> Result<SigningKeyPair> {
        Ok(SigningKeyPair::from_bytes(
            &self.read_key(name, SIGNING_KEY_FILE)?,
        ))
    }

    fn encryption(&self, name: &str) -> Result<EncryptionKeyPair> {
        Ok(EncryptionKeyPair::from_bytes(
            &self.read_key(name, ENCRYPTION_KEY_FILE)?,
        ))
    }
}

/// The public-key directory as a single JSON file
pub struct PublicKeyFile {
    path: PathBuf,
    companies: HashMap<String, CompanyPublicKeys>,
}

impl PublicKeyFile {
    /// Load the directory, or start empty if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let companies = if path.exists() {
            let text = fs::read_to_string(&path)
                .map_err(|e| Error::KeyStore(format!("cannot read {}: {e}", path.display())))?;
            serde_json::from_str(&text)?
        } else {
            HashMap::new()
        };
        Ok(Self { path, companies })
    }

    /// Add or replace a company's registration and persist the file
    pub fn register(&mut self, registration: &CompanyRegistration) -> Result<()> {
        self.companies.insert(
            registration.company_name.clone(),
            registration.public_keys,
        );
        let text = serde_json::to_string_pretty(&self.companies)?;
        fs::write(&self.path, text)
            .map_err(|e| Error::KeyStore(format!("cannot write {}: {e}", self.path.display())))?;
        Ok(())
    }
}

impl CompanyKeyDirectory for PublicKeyFile {
    fn lookup(&self, name: &str) -> Result<CompanyPublicKeys> {
        self.companies
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownCompany { name: name.into() })
    }
}

/// Group membership as a JSON file, `{ group_id: [member, ...] }`.
///
/// The file is re-read on every lookup: `protect` sees whatever the
/// registry holds at the instant of the call, and nothing later.
pub struct FileGroupRegistry {
    path: PathBuf,
}

impl FileGroupRegistry {
    /// Point the registry at a JSON file (which may not exist yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GroupDirectory for FileGroupRegistry {
    fn members(&self, group_id: &str) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Err(Error::UnknownGroup {
                id: group_id.into(),
            });
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|e| Error::KeyStore(format!("cannot read {}: {e}", self.path.display())))?;
        let mut groups: HashMap<String, Vec<String>> = serde_json::from_str(&text)?;
        groups.remove(group_id).ok_or_else(|| Error::UnknownGroup {
            id: group_id.into(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
