//! # SHA-2 Hashing
//!
//! Request ids and delegation signing digests are SHA-256; principal
//! derivation uses SHA-224 (see `shared_types::Principal`).

use crate::errors::CryptoError;
use sha2::{Digest, Sha256};

/// SHA-256 output (256-bit).
pub type Hash = [u8; 32];

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Domain separator whose length fits the one-byte prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomainSeparator {
    bytes: &'static [u8],
    len: u8,
}

impl DomainSeparator {
    /// Separator for a constant domain.
    ///
    /// # Panics
    /// If `bytes` is longer than 255. In a `const` item this is a compile
    /// error; use [`DomainSeparator::try_new`] for runtime input.
    pub const fn new(bytes: &'static [u8]) -> Self {
        assert!(bytes.len() <= u8::MAX as usize, "domain separator longer than 255 bytes");
        Self {
            bytes,
            len: bytes.len() as u8,
        }
    }

    /// Separator for `bytes`, rejecting anything longer than 255.
    pub fn try_new(bytes: &'static [u8]) -> Result<Self, CryptoError> {
        let len = u8::try_from(bytes.len()).map_err(|_| CryptoError::DomainTooLong(bytes.len()))?;
        Ok(Self { bytes, len })
    }

    /// Raw domain bytes.
    pub fn as_bytes(&self) -> &'static [u8] {
        self.bytes
    }
}

/// Message to sign for `payload` under a domain separator.
///
/// Layout: `len(domain) as u8 ‖ domain ‖ payload`. The length prefix keeps
/// signatures for one domain from verifying in another.
pub fn domain_separated(domain: DomainSeparator, payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(1 + domain.bytes.len() + payload.len());
    message.push(domain.len);
    message.extend_from_slice(domain.bytes);
    message.extend_from_slice(payload);
    message
}
