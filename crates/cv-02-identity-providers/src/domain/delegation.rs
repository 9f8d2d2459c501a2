//! # Delegation Chains
//!
//! An identity service never hands out the user's root key. It signs a
//! time-bounded [`Delegation`] to a session key the client generated; longer
//! chains are allowed, each link signed by the key the previous link
//! delegated to.
//!
//! ```text
//! root key ──signs──▶ Delegation{pubkey: K1, expiration} ──K1 signs──▶ ... ──▶ session key
//! ```
//!
//! The caller's principal is always derived from the root key.

use serde::{Deserialize, Serialize};
use shared_crypto::{
    domain_separated, sha256, DomainSeparator, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature,
};
use shared_types::{Principal, Timestamp};
use thiserror::Error;

/// Domain separator for delegation signatures.
pub const DELEGATION_DOMAIN: DomainSeparator =
    DomainSeparator::new(b"ic-request-auth-delegation");

/// Maximum links accepted in a chain.
pub const MAX_CHAIN_LENGTH: usize = 20;

/// Chain verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DelegationError {
    /// No links at all.
    #[error("delegation chain is empty")]
    Empty,

    /// More links than [`MAX_CHAIN_LENGTH`].
    #[error("delegation chain has {0} links")]
    TooLong(usize),

    /// A key in the chain is not a DER Ed25519 key.
    #[error("link {index}: malformed public key")]
    InvalidPublicKey {
        /// Link position (0 = root signer)
        index: usize,
    },

    /// A link's signature does not verify under the previous key.
    #[error("link {index}: signature does not verify")]
    BadSignature {
        /// Link position
        index: usize,
    },

    /// A link has expired.
    #[error("link {index}: expired at {expiration}")]
    Expired {
        /// Link position
        index: usize,
        /// When it expired
        expiration: Timestamp,
    },
}

/// Authorization for `pubkey` to act for the signer until `expiration`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    /// Delegate key, DER-encoded.
    pub pubkey: Vec<u8>,
    /// Absolute expiry.
    pub expiration: Timestamp,
    /// Backend ids the delegation is restricted to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
}

impl Delegation {
    /// Bytes the signer signs.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut repr = Vec::with_capacity(self.pubkey.len() + 16);
        repr.extend_from_slice(&(self.pubkey.len() as u32).to_be_bytes());
        repr.extend_from_slice(&self.pubkey);
        repr.extend_from_slice(&self.expiration.as_nanos().to_be_bytes());
        if let Some(targets) = &self.targets {
            repr.extend_from_slice(&(targets.len() as u32).to_be_bytes());
            for target in targets {
                repr.extend_from_slice(&(target.len() as u32).to_be_bytes());
                repr.extend_from_slice(target.as_bytes());
            }
        }
        domain_separated(DELEGATION_DOMAIN, &sha256(&repr))
    }
}

/// A delegation plus the signature of the key before it in the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedDelegation {
    /// The delegation.
    pub delegation: Delegation,
    /// Ed25519 signature over [`Delegation::signable_bytes`].
    pub signature: Vec<u8>,
}

impl SignedDelegation {
    /// Sign `delegation` with `signer`.
    pub fn sign(signer: &Ed25519KeyPair, delegation: Delegation) -> Self {
        let signature = signer.sign(&delegation.signable_bytes()).as_bytes().to_vec();
        Self {
            delegation,
            signature,
        }
    }
}

/// Root key plus the links that lead from it to the session key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationChain {
    /// The user's root public key, DER-encoded.
    pub public_key: Vec<u8>,
    /// Links, root first.
    pub delegations: Vec<SignedDelegation>,
}

impl DelegationChain {
    /// Principal the chain speaks for.
    pub fn principal(&self) -> Principal {
        Principal::self_authenticating(&self.public_key)
    }

    /// Earliest expiration in the chain.
    pub fn expiration(&self) -> Option<Timestamp> {
        self.delegations
            .iter()
            .map(|link| link.delegation.expiration)
            .min()
    }

    /// Key at the end of the chain.
    pub fn session_public_key(&self) -> Option<&[u8]> {
        self.delegations
            .last()
            .map(|link| link.delegation.pubkey.as_slice())
    }

    /// Check every signature and every expiration.
    pub fn verify(&self, now: Timestamp) -> Result<(), DelegationError> {
        verify_links(&self.public_key, &self.delegations, now).map(|_| ())
    }
}

/// Walk `links` from `root_der` and return the final delegate key.
///
/// An empty `links` is only valid for callers that sign with the root key
/// directly; [`DelegationChain::verify`] rejects it.
pub fn verify_links(
    root_der: &[u8],
    links: &[SignedDelegation],
    now: Timestamp,
) -> Result<Ed25519PublicKey, DelegationError> {
    if links.is_empty() {
        return Err(DelegationError::Empty);
    }
    if links.len() > MAX_CHAIN_LENGTH {
        return Err(DelegationError::TooLong(links.len()));
    }

    let mut signer = Ed25519PublicKey::from_der(root_der)
        .map_err(|_| DelegationError::InvalidPublicKey { index: 0 })?;

    for (index, link) in links.iter().enumerate() {
        let signature = Ed25519Signature::from_slice(&link.signature)
            .map_err(|_| DelegationError::BadSignature { index })?;
        signer
            .verify(&link.delegation.signable_bytes(), &signature)
            .map_err(|_| DelegationError::BadSignature { index })?;

        if link.delegation.expiration.has_passed(now) {
            return Err(DelegationError::Expired {
                index,
                expiration: link.delegation.expiration,
            });
        }

        signer = Ed25519PublicKey::from_der(&link.delegation.pubkey)
            .map_err(|_| DelegationError::InvalidPublicKey { index: index + 1 })?;
    }

    Ok(signer)
}
