//! # Shared Crypto - Credential Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signatures` | Ed25519 | Root, delegated-session and extension keys |
//! | `hashing` | SHA-256 | Request ids, delegation digests |
//! | `symmetric` | XChaCha20-Poly1305 | Sealing persisted session keys |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **XChaCha20**: 192-bit random nonce, safe to generate per seal
//! - Secret material is zeroized on drop and redacted from `Debug`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;
pub mod symmetric;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{domain_separated, sha256, DomainSeparator, Hash};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, ED25519_DER_PREFIX};
pub use symmetric::{decrypt, encrypt, Nonce, SealedBox, SecretKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
