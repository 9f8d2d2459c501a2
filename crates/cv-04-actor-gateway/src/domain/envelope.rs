//! # Request Envelopes
//!
//! Every remote request is a `RequestContent` wrapped in an `Envelope`.
//!
//! ```text
//! request_id = sha256(bincode(content))
//! sender_sig = sign(len("ic-request") ‖ "ic-request" ‖ request_id)
//! ```
//!
//! Anonymous envelopes carry the anonymous principal as sender and no key,
//! delegation or signature. Signed envelopes carry the caller's root key,
//! the delegation links down to the signing key (if any) and the signature.
//!
//! The sender principal must always equal `self_authenticating(sender_pubkey)`,
//! so a backend never trusts a principal the client merely claims.

use crate::domain::errors::GatewayError;
use cv_01_wire_codec::{CodecError, WireValue};
use cv_02_identity_providers::{verify_links, Credential, DelegationError, SignedDelegation};
use serde::{Deserialize, Serialize};
use shared_crypto::{
    domain_separated, sha256, DomainSeparator, Ed25519PublicKey, Ed25519Signature, Hash,
};
use shared_types::{Principal, Timestamp};
use thiserror::Error;

/// Domain separator for request signatures.
pub const REQUEST_DOMAIN: DomainSeparator = DomainSeparator::new(b"ic-request");

/// Update or read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// State-changing call.
    Call,
    /// Read-only query.
    Query,
}

/// The signed part of a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContent {
    /// Call or query.
    pub request_type: RequestType,
    /// Target backend.
    pub backend_id: String,
    /// Method on the backend.
    pub method_name: String,
    /// Encoded argument.
    pub arg: WireValue,
    /// Caller.
    pub sender: Principal,
    /// Replicas drop the request after this instant.
    pub ingress_expiry: Timestamp,
    /// Makes otherwise identical calls distinct.
    pub nonce: Option<Vec<u8>>,
}

impl RequestContent {
    /// Content hash.
    pub fn request_id(&self) -> Result<Hash, CodecError> {
        bincode::serialize(self)
            .map(|bytes| sha256(&bytes))
            .map_err(|e| CodecError::Serialization(e.to_string()))
    }
}

/// Bytes the sender signs for `request_id`.
pub fn signable_message(request_id: &Hash) -> Vec<u8> {
    domain_separated(REQUEST_DOMAIN, request_id)
}

/// Envelope rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// `ingress_expiry` has passed.
    #[error("ingress expiry {0} has passed")]
    IngressExpired(Timestamp),

    /// Anonymous sender with authentication fields, or the reverse.
    #[error("anonymous request must not carry sender authentication")]
    UnexpectedAuthentication,

    /// Non-anonymous sender without key or signature.
    #[error("request for {0} is not signed")]
    MissingSignature(Principal),

    /// Sender principal does not belong to the sender key.
    #[error("sender {0} does not match sender public key")]
    SenderMismatch(Principal),

    /// Delegation chain invalid.
    #[error("invalid delegation: {0}")]
    Delegation(#[from] DelegationError),

    /// A delegation restricts targets and this backend is not one.
    #[error("delegation does not cover backend {0}")]
    TargetNotAllowed(String),

    /// Key not decodable.
    #[error("malformed sender public key")]
    InvalidPublicKey,

    /// Signature does not verify.
    #[error("request signature does not verify")]
    BadSignature,

    /// Content could not be hashed.
    #[error(transparent)]
    Encoding(#[from] CodecError),
}

/// A request on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Signed content.
    pub content: RequestContent,
    /// Caller's root key (DER).
    pub sender_pubkey: Option<Vec<u8>>,
    /// Links from the root key to the signing key.
    pub sender_delegation: Option<Vec<SignedDelegation>>,
    /// Signature over [`signable_message`].
    pub sender_sig: Option<Vec<u8>>,
}

impl Envelope {
    /// Unsigned envelope for the anonymous principal.
    pub fn anonymous(content: RequestContent) -> Self {
        Self {
            content,
            sender_pubkey: None,
            sender_delegation: None,
            sender_sig: None,
        }
    }

    /// Sign `content` with `credential`.
    pub async fn sign(content: RequestContent, credential: &Credential) -> Result<Self, GatewayError> {
        let request_id = content.request_id()?;
        let signature = credential
            .signer
            .sign(&signable_message(&request_id))
            .await?;
        Ok(Self {
            content,
            sender_pubkey: Some(credential.public_key.clone()),
            sender_delegation: (!credential.delegations.is_empty())
                .then(|| credential.delegations.clone()),
            sender_sig: Some(signature),
        })
    }

    /// Check the envelope at `now` and return the authenticated caller.
    pub fn authenticate(&self, now: Timestamp) -> Result<Principal, EnvelopeError> {
        if self.content.ingress_expiry.has_passed(now) {
            return Err(EnvelopeError::IngressExpired(self.content.ingress_expiry));
        }

        let sender = &self.content.sender;
        if sender.is_anonymous() {
            if self.sender_pubkey.is_some()
                || self.sender_sig.is_some()
                || self.sender_delegation.is_some()
            {
                return Err(EnvelopeError::UnexpectedAuthentication);
            }
            return Ok(sender.clone());
        }

        let (Some(pubkey), Some(sig)) = (&self.sender_pubkey, &self.sender_sig) else {
            return Err(EnvelopeError::MissingSignature(sender.clone()));
        };
        if Principal::self_authenticating(pubkey) != *sender {
            return Err(EnvelopeError::SenderMismatch(sender.clone()));
        }

        let signing_key = match self.sender_delegation.as_deref() {
            Some(links) if !links.is_empty() => {
                let key = verify_links(pubkey, links, now)?;
                self.check_targets(links)?;
                key
            }
            _ => Ed25519PublicKey::from_der(pubkey).map_err(|_| EnvelopeError::InvalidPublicKey)?,
        };

        let signature =
            Ed25519Signature::from_slice(sig).map_err(|_| EnvelopeError::BadSignature)?;
        let request_id = self.content.request_id()?;
        signing_key
            .verify(&signable_message(&request_id), &signature)
            .map_err(|_| EnvelopeError::BadSignature)?;

        Ok(sender.clone())
    }

    fn check_targets(&self, links: &[SignedDelegation]) -> Result<(), EnvelopeError> {
        let backend = &self.content.backend_id;
        let allowed = links.iter().all(|link| match &link.delegation.targets {
            Some(targets) => targets.iter().any(|t| t == backend),
            None => true,
        });
        if allowed {
            Ok(())
        } else {
            Err(EnvelopeError::TargetNotAllowed(backend.clone()))
        }
    }
}
