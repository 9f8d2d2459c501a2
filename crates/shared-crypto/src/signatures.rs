//! # Ed25519 Signatures
//!
//! Signing material behind every authenticated credential: the user's root key
//! (held by the identity provider), the per-session delegated key, and the
//! extension wallet's key.
//!
//! Public keys travel in DER form (`SubjectPublicKeyInfo`), which is what the
//! principal is derived from.

use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::{Zeroize, Zeroizing};

/// DER `SubjectPublicKeyInfo` prefix for an Ed25519 key (OID 1.3.101.112).
pub const ED25519_DER_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        // Validate it's a valid point
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Parse from DER `SubjectPublicKeyInfo`.
    pub fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        let raw = der
            .strip_prefix(ED25519_DER_PREFIX.as_slice())
            .ok_or(CryptoError::InvalidPublicKey)?;
        let bytes: [u8; 32] = raw.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: raw.len(),
        })?;
        Self::from_bytes(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encode as DER `SubjectPublicKeyInfo`.
    pub fn to_der(&self) -> Vec<u8> {
        let mut der = Vec::with_capacity(ED25519_DER_PREFIX.len() + 32);
        der.extend_from_slice(&ED25519_DER_PREFIX);
        der.extend_from_slice(&self.0);
        der
    }

    /// Verify a signature.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;

        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Create from a slice of exactly 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureFormat)?;
        Ok(Self(arr))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// Ed25519 keypair.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        Self { signing_key }
    }

    /// Create from a seed slice, rejecting wrong lengths.
    pub fn from_seed_slice(seed: &[u8]) -> Result<Self, CryptoError> {
        let mut arr: [u8; 32] = seed.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: seed.len(),
        })?;
        let keypair = Self::from_seed(arr);
        arr.zeroize();
        Ok(keypair)
    }

    /// Get public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        let verifying_key = self.signing_key.verifying_key();
        Ed25519PublicKey(verifying_key.to_bytes())
    }

    /// Sign a message (deterministic - no RNG needed).
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let sig = self.signing_key.sign(message);
        Ed25519Signature(sig.to_bytes())
    }

    /// Get secret seed for sealing. Wiped when dropped.
    pub fn to_seed(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let keypair = Ed25519KeyPair::generate();
        let message = b"Hello, Ed25519!";

        let signature = keypair.sign(message);
        let result = keypair.public_key().verify(message, &signature);

        assert!(result.is_ok());
    }

    #[test]
    fn test_wrong_message_fails() {
        let keypair = Ed25519KeyPair::generate();

        let signature = keypair.sign(b"message1");
        let result = keypair.public_key().verify(b"message2", &signature);

        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_key_fails() {
        let keypair1 = Ed25519KeyPair::generate();
        let keypair2 = Ed25519KeyPair::generate();
        let message = b"test";

        let signature = keypair1.sign(message);
        let result = keypair2.public_key().verify(message, &signature);

        assert!(result.is_err());
    }

    #[test]
    fn test_roundtrip_seed() {
        let original = Ed25519KeyPair::generate();
        let seed = original.to_seed();
        let restored = Ed25519KeyPair::from_seed_slice(seed.as_slice()).unwrap();

        assert_eq!(original.public_key(), restored.public_key());
    }

    #[test]
    fn test_der_roundtrip() {
        let keypair = Ed25519KeyPair::from_seed([0x11; 32]);
        let der = keypair.public_key().to_der();
        assert_eq!(der.len(), 44);
        assert_eq!(hex::encode(&der[..12]), "302a300506032b6570032100");
        assert_eq!(Ed25519PublicKey::from_der(&der).unwrap(), keypair.public_key());
    }

    #[test]
    fn test_der_wrong_prefix_rejected() {
        let mut der = Ed25519KeyPair::generate().public_key().to_der();
        der[0] = 0x31;
        assert_eq!(
            Ed25519PublicKey::from_der(&der),
            Err(CryptoError::InvalidPublicKey)
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let keypair = Ed25519KeyPair::from_seed([0x42; 32]);
        let rendered = format!("{keypair:?}");
        assert!(rendered.contains("public_key"));
        assert!(!rendered.contains("signing_key"));
    }
}
