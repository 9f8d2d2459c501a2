//! # Credentials
//!
//! The live signing capability behind a session. A credential is never
//! persisted; see [`crate::domain::PersistedReference`] for what is.

use crate::domain::delegation::SignedDelegation;
use crate::domain::errors::ProviderError;
use async_trait::async_trait;
use shared_crypto::Ed25519KeyPair;
use shared_types::{Principal, ProviderKind, Timestamp};
use std::fmt;
use std::sync::Arc;

/// Something that can sign request ids.
#[async_trait]
pub trait RequestSigner: Send + Sync {
    /// DER public key of the signing key.
    fn public_key_der(&self) -> Vec<u8>;

    /// Sign `message`.
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, ProviderError>;
}

/// Signer over a locally held Ed25519 key.
pub struct KeyPairSigner {
    keypair: Ed25519KeyPair,
}

impl KeyPairSigner {
    /// Wrap a key pair.
    pub fn new(keypair: Ed25519KeyPair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl RequestSigner for KeyPairSigner {
    fn public_key_der(&self) -> Vec<u8> {
        self.keypair.public_key().to_der()
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, ProviderError> {
        Ok(self.keypair.sign(message).as_bytes().to_vec())
    }
}

/// Opaque signing material for one authenticated principal.
#[derive(Clone)]
pub struct Credential {
    /// Provider that issued it.
    pub provider: ProviderKind,
    /// Caller identity.
    pub principal: Principal,
    /// DER key the principal is derived from (sent as `sender_pubkey`).
    pub public_key: Vec<u8>,
    /// Links from `public_key` to the signer's key. Empty when the signer
    /// holds `public_key` itself.
    pub delegations: Vec<SignedDelegation>,
    /// Signs request ids.
    pub signer: Arc<dyn RequestSigner>,
    /// Invalid at or after this instant.
    pub expires_at: Timestamp,
}

impl Credential {
    /// Whether the credential can no longer be used at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.has_passed(now)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider)
            .field("principal", &self.principal)
            .field("delegations", &self.delegations.len())
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
