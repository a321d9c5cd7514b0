//! # Key Derivation
//!
//! HKDF-SHA256 derivations used by the engine. Salt is always empty; the
//! `info` string carries the binding context.
//!
//! ```text
//! ECDH shared secret ──HKDF("key_wrapping")──────────────► wrapping key
//!
//! data key K_T ──HKDF("group:{group_id}:tx:{tx_id}")─────► group key K_G
//! ```
//!
//! The group derivation binds `K_G` to both the group and the transaction:
//! the same group over a different transaction, or a different group over
//! the same transaction, yields an unrelated key.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::crypto::encryption::{DataKey, KEY_SIZE};
use crate::error::{Error, Result};

/// Domain strings for HKDF `info` parameters.
///
/// These are part of the wire contract: both sides of a wrap or a group
/// disclosure must derive with identical context bytes.
pub mod domain {
    /// Context for deriving an envelope wrapping key from an ECDH secret
    pub const KEY_WRAPPING: &[u8] = b"key_wrapping";

    /// Context for the short public-key fingerprint (display only)
    pub const KEY_FINGERPRINT: &[u8] = b"tradeguard-key-fingerprint-v1";
}

/// Derive the AES key that encrypts a wrapped-key envelope.
///
/// `shared_secret` is the raw X25519 output; the caller has already
/// rejected the all-zero point.
pub fn derive_wrapping_key(shared_secret: &[u8; 32]) -> Result<DataKey> {
    let hkdf = Hkdf::<Sha256>::new(None, shared_secret);

    let mut key = [0u8; KEY_SIZE];
    hkdf.expand(domain::KEY_WRAPPING, &mut key)
        .map_err(|_| Error::KeyDerivation("wrapping key expansion failed".into()))?;

    Ok(DataKey::from_bytes(key))
}

/// Derive the group key `K_G` for one `(group, transaction)` pair.
///
/// `info = "group:{group_id}:tx:{transaction_id}"`, matching what every
/// member must derive to open the data-key bridge.
pub fn derive_group_key(data_key: &DataKey, group_id: &str, transaction_id: u64) -> Result<DataKey> {
    let info = format!("group:{group_id}:tx:{transaction_id}");
    let hkdf = Hkdf::<Sha256>::new(None, data_key.as_bytes());

    let mut key = [0u8; KEY_SIZE];
    hkdf.expand(info.as_bytes(), &mut key)
        .map_err(|_| Error::KeyDerivation(format!("group key expansion failed for {group_id}")))?;

    Ok(DataKey::from_bytes(key))
}

/// Short hex fingerprint of a public key for human comparison.
///
/// 8 bytes is plenty for eyeballing directory entries; this is a display
/// aid, not a security boundary.
pub fn key_fingerprint(key: &[u8; 32]) -> Result<String> {
    let hkdf = Hkdf::<Sha256>::new(None, key);

    let mut fingerprint = [0u8; 8];
    hkdf.expand(domain::KEY_FINGERPRINT, &mut fingerprint)
        .map_err(|_| Error::KeyDerivation("fingerprint expansion failed".into()))?;

    Ok(hex::encode(fingerprint))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapping_key_deterministic() {
        let shared = [42u8; 32];

        let k1 = derive_wrapping_key(&shared).unwrap();
        let k2 = derive_wrapping_key(&shared).unwrap();

        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_wrapping_key_differs_from_input() {
        let shared = [42u8; 32];
        let key = derive_wrapping_key(&shared).unwrap();
        assert_ne!(key.as_bytes(), &shared);
    }

    #[test]
    fn test_group_key_deterministic() {
        let data_key = DataKey::from_bytes([7u8; 32]);

        let k1 = derive_group_key(&data_key, "tech_partners", 123).unwrap();
        let k2 = derive_group_key(&data_key, "tech_partners", 123).unwrap();

        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_group_key_binds_group_id() {
        let data_key = DataKey::from_bytes([7u8; 32]);

        let k1 = derive_group_key(&data_key, "tech_partners", 123).unwrap();
        let k2 = derive_group_key(&data_key, "logistics", 123).unwrap();

        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_group_key_binds_transaction_id() {
        let data_key = DataKey::from_bytes([7u8; 32]);

        let k1 = derive_group_key(&data_key, "tech_partners", 123).unwrap();
        let k2 = derive_group_key(&data_key, "tech_partners", 124).unwrap();

        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_group_key_binds_data_key() {
        let k1 = derive_group_key(&DataKey::from_bytes([1u8; 32]), "g", 1).unwrap();
        let k2 = derive_group_key(&DataKey::from_bytes([2u8; 32]), "g", 1).unwrap();

        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_fingerprint_is_hex_16_chars() {
        let fp = key_fingerprint(&[42u8; 32]).unwrap();

        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_tracks_key() {
        let fp1 = key_fingerprint(&[1u8; 32]).unwrap();
        let fp2 = key_fingerprint(&[2u8; 32]).unwrap();

        assert_ne!(fp1, fp2);
        assert_eq!(fp1, key_fingerprint(&[1u8; 32]).unwrap());
    }
}
