//! # Tradeguard Core
//!
//! Cryptographic protection engine for bilateral Delivery-versus-Payment
//! transaction documents. A seller and a buyer exchange a transaction
//! record; the engine seals it so that a central storage service never
//! observes plaintext, while the two parties — and any individuals or
//! group members the seller discloses to — can open it, and every
//! disclosure leaves a signed audit trail.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        PROTECTION ENGINE                            │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────────┐   │
//! │  │  Protect  │  │   Check   │  │  Unprotect  │  │    Share     │   │
//! │  │           │  │           │  │             │  │              │   │
//! │  │ - seal    │  │ - verify  │  │ - find path │  │ - issue      │   │
//! │  │ - sign    │  │ - report  │  │ - unwrap    │  │ - audit      │   │
//! │  │ - wrap    │  │           │  │ - decrypt   │  │              │   │
//! │  └─────┬─────┘  └─────┬─────┘  └──────┬──────┘  └──────┬───────┘   │
//! │        └──────────────┴───────┬───────┴────────────────┘           │
//! │                               │                                    │
//! │  ┌─────────────┐  ┌───────────┴────────┐  ┌─────────────────────┐  │
//! │  │   Crypto    │  │     Document       │  │    Directories      │  │
//! │  │             │  │                    │  │    (injected)       │  │
//! │  │ - Ed25519   │  │ - wire format      │  │ - public keys       │  │
//! │  │ - X25519    │  │ - envelopes        │  │ - private vault     │  │
//! │  │ - AES-GCM   │  │ - canonical JSON   │  │ - group snapshots   │  │
//! │  │ - HKDF      │  │                    │  │                     │  │
//! │  └─────────────┘  └────────────────────┘  └─────────────────────┘  │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`crypto`] - Primitive layer (keys, AEAD, signatures, KDF, wrapping)
//! - [`canonical`] - Byte-deterministic JSON for hashing and signing
//! - [`transaction`] - The plaintext DvP record
//! - [`directory`] - Injected key/group directory interfaces
//! - [`document`] - The protected document and its wire format
//! - [`protect`] - Document assembly and buyer countersigning
//! - [`check`] - Structure and signature verification
//! - [`unprotect`] - Access-path selection and decryption
//! - [`share`] - Signed disclosure audit records
//!
//! ## Trust Model
//!
//! The engine is a library of synchronous, stateless functions over three
//! injected interfaces. Nothing is cached between calls; group membership
//! is snapshotted at the instant of each `protect`, so later changes never
//! retroactively grant or withhold access. Secret buffers (data keys,
//! derived keys, ECDH outputs, ephemeral scalars) live only inside a
//! single call and are zeroized before return. Multiple threads may call
//! into the engine concurrently as long as the injected interfaces are
//! thread-safe; the engine itself holds no shared mutable state.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod canonical;
pub mod check;
pub mod crypto;
pub mod directory;
pub mod document;
pub mod error;
pub mod protect;
pub mod share;
pub mod transaction;
pub mod unprotect;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use check::{check, SignatureStatus, VerificationDetails, VerificationReport};
pub use crypto::{CompanyKeyPair, CompanyPublicKeys, CompanyRegistration};
pub use directory::{CompanyKeyDirectory, GroupDirectory, PrivateKeyVault};
pub use document::{ProtectedDocument, DOCUMENT_VERSION};
pub use error::{Error, Result};
pub use protect::{buyer_sign, protect, ProtectOutcome, ProtectWarning};
pub use share::{
    share_group, share_individual, verify_group_share_record, verify_share_record,
    GroupShareRecord, ShareRecord,
};
pub use transaction::Transaction;
pub use unprotect::{unprotect, AccessMethod, UnprotectedTransaction};
