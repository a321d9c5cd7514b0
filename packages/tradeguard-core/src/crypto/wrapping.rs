//! # Wrapped-Key Envelopes
//!
//! Delivery of a 32-byte secret to a named recipient's X25519 public key.
//!
//! ## Construction
//!
//! ```text
//! Wrap(P_R, k):
//!   e          ← fresh ephemeral X25519 scalar
//!   E          = e·G
//!   s          = e·P_R              (reject all-zero)
//!   wk         = HKDF(s, "key_wrapping")
//!   (n, c)     = AES-256-GCM(wk, k)
//!   envelope   = (E, n, c)          e, s, wk scrubbed before return
//!
//! Unwrap(r, (E, n, c)):
//!   s  = r·E                        (reject all-zero)
//!   wk = HKDF(s, "key_wrapping")
//!   k  = AES-256-GCM⁻¹(wk, n, c)    tag failure → DecryptAuth
//! ```
//!
//! The envelope is self-contained: holding the recipient's private key and
//! the envelope is sufficient to recover the payload, and nothing else is.

use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey};
use zeroize::Zeroizing;

use crate::crypto::encryption::{decrypt, encrypt, DataKey, EncryptedPayload, KEY_SIZE};
use crate::crypto::kdf::derive_wrapping_key;
use crate::crypto::keys::{b64_key, EncryptionKeyPair};
use crate::error::{Error, Result};

/// A wrapped-key envelope: the recipient-specific encryption of a 32-byte
/// payload. Wire shape is fixed by the document format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WrappedKey {
    /// Ephemeral X25519 public key `E` for this envelope
    #[serde(with = "b64_key")]
    pub ephemeral_public_key: [u8; 32],
    /// AES-GCM encryption of the payload under the derived wrapping key
    pub encrypted_key: EncryptedPayload,
}

/// Wrap a 32-byte payload for a recipient's encryption public key.
///
/// A fresh ephemeral scalar is drawn per call and consumed by the exchange,
/// so it cannot outlive this function; the shared secret and wrapping key
/// are zeroized on drop.
pub fn wrap_key(recipient_public: &[u8; 32], payload: &DataKey) -> Result<WrappedKey> {
    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = X25519PublicKey::from(&ephemeral);

    let shared = Zeroizing::new(
        ephemeral
            .diffie_hellman(&X25519PublicKey::from(*recipient_public))
            .to_bytes(),
    );
    reject_zero_secret(&shared)?;

    let wrapping_key = derive_wrapping_key(&shared)?;
    let encrypted_key = encrypt(&wrapping_key, payload.as_bytes())?;

    Ok(WrappedKey {
        ephemeral_public_key: ephemeral_public.to_bytes(),
        encrypted_key,
    })
}

/// Open a wrapped-key envelope with the recipient's private key.
///
/// Produces [`Error::DecryptAuth`] for any envelope not wrapped to this
/// key pair, and a structural error if the recovered payload is not
/// exactly 32 bytes.
pub fn unwrap_key(recipient: &EncryptionKeyPair, envelope: &WrappedKey) -> Result<DataKey> {
    let shared = Zeroizing::new(recipient.diffie_hellman(&envelope.ephemeral_public_key));
    reject_zero_secret(&shared)?;

    let wrapping_key = derive_wrapping_key(&shared)?;
    let payload = Zeroizing::new(decrypt(&wrapping_key, &envelope.encrypted_key)?);

    if payload.len() != KEY_SIZE {
        return Err(Error::InvalidKeyEncoding {
            detail: format!("wrapped payload must be {KEY_SIZE} bytes, got {}", payload.len()),
        });
    }
    DataKey::from_slice(&payload)
}

/// An all-zero ECDH output means the peer key was a low-order point.
fn reject_zero_secret(shared: &[u8; 32]) -> Result<()> {
    if shared.iter().all(|&b| b == 0) {
        return Err(Error::InvalidKeyEncoding {
            detail: "peer public key produced an all-zero shared secret".into(),
        });
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_unwrap_round_trip() {
        let recipient = EncryptionKeyPair::generate();
        let payload = DataKey::from_bytes([9u8; 32]);

        let envelope = wrap_key(&recipient.public_bytes(), &payload).unwrap();
        let recovered = unwrap_key(&recipient, &envelope).unwrap();

        assert_eq!(recovered.as_bytes(), payload.as_bytes());
    }

    #[test]
    fn test_wrong_recipient_fails_auth() {
        let recipient = EncryptionKeyPair::generate();
        let intruder = EncryptionKeyPair::generate();
        let payload = DataKey::from_bytes([9u8; 32]);

        let envelope = wrap_key(&recipient.public_bytes(), &payload).unwrap();

        assert!(matches!(
            unwrap_key(&intruder, &envelope),
            Err(Error::DecryptAuth)
        ));
    }

    #[test]
    fn test_tampered_envelope_fails_auth() {
        let recipient = EncryptionKeyPair::generate();
        let payload = DataKey::from_bytes([9u8; 32]);

        let mut envelope = wrap_key(&recipient.public_bytes(), &payload).unwrap();
        envelope.encrypted_key.ciphertext[0] ^= 0xFF;

        assert!(matches!(
            unwrap_key(&recipient, &envelope),
            Err(Error::DecryptAuth)
        ));
    }

    #[test]
    fn test_tampered_ephemeral_key_fails_auth() {
        let recipient = EncryptionKeyPair::generate();
        let payload = DataKey::from_bytes([9u8; 32]);

        let mut envelope = wrap_key(&recipient.public_bytes(), &payload).unwrap();
        envelope.ephemeral_public_key[0] ^= 0x01;

        // A different ephemeral point derives a different wrapping key.
        assert!(unwrap_key(&recipient, &envelope).is_err());
    }

    #[test]
    fn test_zero_peer_key_rejected() {
        let payload = DataKey::from_bytes([9u8; 32]);

        // The identity point yields an all-zero shared secret.
        let result = wrap_key(&[0u8; 32], &payload);
        assert!(matches!(result, Err(Error::InvalidKeyEncoding { .. })));
    }

    #[test]
    fn test_envelopes_are_unique_per_wrap() {
        let recipient = EncryptionKeyPair::generate();
        let payload = DataKey::from_bytes([9u8; 32]);

        let e1 = wrap_key(&recipient.public_bytes(), &payload).unwrap();
        let e2 = wrap_key(&recipient.public_bytes(), &payload).unwrap();

        // Fresh ephemeral scalar and nonce each time.
        assert_ne!(e1.ephemeral_public_key, e2.ephemeral_public_key);
        assert_ne!(e1.encrypted_key.ciphertext, e2.encrypted_key.ciphertext);
    }

    #[test]
    fn test_envelope_wire_shape() {
        let recipient = EncryptionKeyPair::generate();
        let payload = DataKey::from_bytes([9u8; 32]);

        let envelope = wrap_key(&recipient.public_bytes(), &payload).unwrap();
        let json = serde_json::to_value(&envelope).unwrap();

        assert!(json["ephemeral_public_key"].is_string());
        assert!(json["encrypted_key"]["ciphertext"].is_string());
        assert!(json["encrypted_key"]["nonce"].is_string());

        let restored: WrappedKey = serde_json::from_value(json).unwrap();
        assert_eq!(restored, envelope);
    }
}
