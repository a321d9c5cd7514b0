//! # Error Handling
//!
//! Error types for the protection engine.
//!
//! Failures are reported structurally and never silently coerced. Fatal
//! conditions (a mandatory company that cannot be resolved, a failed
//! authentication tag) surface as `Err`; optional-path conditions (an extra
//! recipient with no published key, an unknown group) degrade to warnings
//! carried in the successful return value — see [`crate::protect`].

use thiserror::Error;

/// Result type alias for protection-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the protection engine
///
/// Errors are grouped by the stage of the pipeline that produces them.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Plaintext preconditions
    // ========================================================================

    /// A required transaction field is absent
    #[error("missing required field: {name}")]
    MissingField {
        /// Name of the absent field
        name: String,
    },

    /// A transaction field does not match the declared party
    #[error("{field} mismatch: expected {expected}, found {found}")]
    FieldMismatch {
        /// Which field disagreed
        field: &'static str,
        /// The value the caller declared
        expected: String,
        /// The value found in the plaintext
        found: String,
    },

    // ========================================================================
    // Directory lookups
    // ========================================================================

    /// A company has no entry in the key directory or vault
    #[error("unknown company: {name}")]
    UnknownCompany {
        /// The company name that failed to resolve
        name: String,
    },

    /// A group has no entry in the group directory
    #[error("unknown group: {id}")]
    UnknownGroup {
        /// The group identifier that failed to resolve
        id: String,
    },

    // ========================================================================
    // Access and verification
    // ========================================================================

    /// No wrapped-key envelope exists for the caller
    #[error("no access granted for {company}")]
    NoAccess {
        /// The company that attempted to decrypt
        company: String,
    },

    /// AEAD tag authentication failed (tampering or wrong key)
    #[error("decryption failed: authentication tag mismatch")]
    DecryptAuth,

    /// Ed25519 signature verification failed
    #[error("signature verification failed")]
    InvalidSignature,

    // ========================================================================
    // Document structure
    // ========================================================================

    /// A protected document violates its structural contract
    #[error("invalid document: {detail}")]
    InvalidDocument {
        /// What was wrong
        detail: String,
    },

    // ========================================================================
    // Primitive failures
    // ========================================================================

    /// A key could not be decoded (wrong length, malformed point)
    #[error("invalid key encoding: {detail}")]
    InvalidKeyEncoding {
        /// What was wrong
        detail: String,
    },

    /// HKDF expansion failed
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// The operating system RNG could not produce bytes
    #[error("random number generator unavailable")]
    RngUnavailable,

    /// JSON encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A private-key store could not be read
    #[error("key store error: {0}")]
    KeyStore(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
