//! # Actor Handle
//!
//! An endpoint bound to one identity. Handles are built by the gateway and
//! shared behind `Arc`; they hold no mutable state, so an abandoned call
//! leaves nothing behind.

use crate::domain::{Endpoint, Envelope, GatewayError, RequestContent, RequestType};
use crate::ports::AgentTransport;
use cv_01_wire_codec::WireValue;
use cv_02_identity_providers::Credential;
use shared_types::{Clock, Principal, Timestamp};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Remote actor bound to an identity.
pub struct ActorHandle {
    id: u64,
    endpoint: Endpoint,
    identity: Option<Credential>,
    transport: Arc<dyn AgentTransport>,
    clock: Arc<dyn Clock>,
    ingress_expiry: Duration,
}

impl ActorHandle {
    pub(crate) fn new(
        id: u64,
        endpoint: Endpoint,
        identity: Option<Credential>,
        transport: Arc<dyn AgentTransport>,
        clock: Arc<dyn Clock>,
        ingress_expiry: Duration,
    ) -> Self {
        Self {
            id,
            endpoint,
            identity,
            transport,
            clock,
            ingress_expiry,
        }
    }

    /// Construction sequence number, unique per gateway.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Target.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Caller principal (anonymous if unbound).
    pub fn principal(&self) -> Principal {
        self.identity
            .as_ref()
            .map(|c| c.principal.clone())
            .unwrap_or_else(Principal::anonymous)
    }

    /// Whether calls go out unsigned.
    pub fn is_anonymous(&self) -> bool {
        self.identity.is_none()
    }

    /// Expiry of the bound credential.
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.identity.as_ref().map(|c| c.expires_at)
    }

    /// Bound credential expired at `now`. Anonymous handles never expire.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|c| c.is_expired(now))
    }

    /// Whether this handle was built from `identity`.
    pub(crate) fn bound_to(&self, identity: Option<&Credential>) -> bool {
        match (&self.identity, identity) {
            (None, None) => true,
            (Some(ours), Some(theirs)) => {
                ours.principal == theirs.principal
                    && ours.expires_at == theirs.expires_at
                    && ours.signer.public_key_der() == theirs.signer.public_key_der()
            }
            _ => false,
        }
    }

    /// State-changing call. Never retried here.
    pub async fn call(&self, method: &str, arg: WireValue) -> Result<WireValue, GatewayError> {
        let envelope = self.envelope(RequestType::Call, method, arg).await?;
        debug!(endpoint = %self.endpoint, method, "[cv-04] call");
        Ok(self.transport.call(&self.endpoint, envelope).await?)
    }

    /// Read-only query.
    pub async fn query(&self, method: &str, arg: WireValue) -> Result<WireValue, GatewayError> {
        let envelope = self.envelope(RequestType::Query, method, arg).await?;
        debug!(endpoint = %self.endpoint, method, "[cv-04] query");
        Ok(self.transport.query(&self.endpoint, envelope).await?)
    }

    async fn envelope(
        &self,
        request_type: RequestType,
        method: &str,
        arg: WireValue,
    ) -> Result<Envelope, GatewayError> {
        let now = self.clock.now();
        let content = RequestContent {
            request_type,
            backend_id: self.endpoint.backend_id.clone(),
            method_name: method.to_string(),
            arg,
            sender: self.principal(),
            ingress_expiry: now.saturating_add(self.ingress_expiry),
            nonce: Some(rand::random::<[u8; 8]>().to_vec()),
        };
        match &self.identity {
            None => Ok(Envelope::anonymous(content)),
            Some(credential) => {
                if credential.is_expired(now) {
                    return Err(GatewayError::CredentialExpired);
                }
                Envelope::sign(content, credential).await
            }
        }
    }
}

impl fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorHandle")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("principal", &self.principal())
            .finish_non_exhaustive()
    }
}
