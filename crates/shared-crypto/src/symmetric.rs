//! # Symmetric Encryption
//!
//! XChaCha20-Poly1305 sealing for key material that has to be persisted.
//! Delegated session keys are stored only as a [`SealedBox`] under a
//! device-local [`SecretKey`].

use crate::CryptoError;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Secret key (256-bit).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Generate random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Nonce for encryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nonce([u8; 24]); // XChaCha20 uses 24-byte nonce

impl Nonce {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 24]) -> Self {
        Self(bytes)
    }

    /// Generate random nonce (safe with XChaCha20's 192-bit nonce).
    pub fn generate() -> Self {
        let mut bytes = [0u8; 24];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; 24] {
        &self.0
    }
}

/// Encrypt plaintext with XChaCha20-Poly1305.
///
/// Returns (ciphertext, nonce).
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if encryption fails.
pub fn encrypt(key: &SecretKey, plaintext: &[u8]) -> Result<(Vec<u8>, Nonce), CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = Nonce::generate();

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(nonce.as_bytes()), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok((ciphertext, nonce))
}

/// Decrypt ciphertext with XChaCha20-Poly1305.
///
/// # Errors
///
/// Returns `CryptoError::DecryptionFailed` if decryption fails.
pub fn decrypt(key: &SecretKey, ciphertext: &[u8], nonce: &Nonce) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    cipher
        .decrypt(XNonce::from_slice(nonce.as_bytes()), ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

/// Ciphertext plus nonce, in a form that can be written to storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBox {
    /// 24-byte nonce.
    pub nonce: Vec<u8>,
    /// Authenticated ciphertext.
    pub ciphertext: Vec<u8>,
}

impl SealedBox {
    /// Seal plaintext under `key`.
    pub fn seal(key: &SecretKey, plaintext: &[u8]) -> Result<Self, CryptoError> {
        let (ciphertext, nonce) = encrypt(key, plaintext)?;
        Ok(Self {
            nonce: nonce.as_bytes().to_vec(),
            ciphertext,
        })
    }

    /// Open with `key`.
    pub fn open(&self, key: &SecretKey) -> Result<Vec<u8>, CryptoError> {
        let nonce: [u8; 24] = self
            .nonce
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::DecryptionFailed("bad nonce length".to_string()))?;
        decrypt(key, &self.ciphertext, &Nonce::from_bytes(nonce))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = SecretKey::generate();
        let plaintext = b"Hello, Civitas!";

        let (ciphertext, nonce) = encrypt(&key, plaintext).unwrap();
        let decrypted = decrypt(&key, &ciphertext, &nonce).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = SecretKey::generate();
        let key2 = SecretKey::generate();

        let (ciphertext, nonce) = encrypt(&key1, b"Secret message").unwrap();
        let result = decrypt(&key2, &ciphertext, &nonce);

        assert!(result.is_err());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = SecretKey::generate();

        let (mut ciphertext, nonce) = encrypt(&key, b"Secret message").unwrap();
        ciphertext[0] ^= 0xFF; // Tamper

        let result = decrypt(&key, &ciphertext, &nonce);
        assert!(result.is_err());
    }

    #[test]
    fn test_sealed_box_json_roundtrip() {
        let key = SecretKey::from_bytes([9u8; 32]);
        let sealed = SealedBox::seal(&key, b"seed bytes").unwrap();
        let json = serde_json::to_string(&sealed).unwrap();
        assert!(!json.contains("seed bytes"));

        let back: SealedBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back.open(&key).unwrap(), b"seed bytes");
    }

    #[test]
    fn test_sealed_box_bad_nonce() {
        let key = SecretKey::generate();
        let mut sealed = SealedBox::seal(&key, b"x").unwrap();
        sealed.nonce.truncate(3);
        assert!(matches!(
            sealed.open(&key),
            Err(CryptoError::DecryptionFailed(_))
        ));
    }
}
